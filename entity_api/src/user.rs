//! Lookups over the users table.

use super::error::Error;
use entity::users::{Column, Entity, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, DatabaseConnection};

pub use entity::roles::Role;

/// Returns the user with the given primary key, if one exists.
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Option<Model>, Error> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

/// Returns the user with the given institutional id number, if one exists.
pub async fn find_by_id_number(
    db: &DatabaseConnection,
    id_number: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::IdNumber.eq(id_number))
        .one(db)
        .await?)
}

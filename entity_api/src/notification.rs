//! CRUD operations for notifications table.

use super::error::Error;
use entity::notifications::{ActiveModel, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection, TryIntoModel};

/// Persists one notification addressed to `user_id`.
pub async fn create(
    db: &DatabaseConnection,
    user_id: Id,
    booking_id: Option<Id>,
    action: &str,
    payload: serde_json::Value,
) -> Result<Model, Error> {
    debug!("Creating {action} notification for user: {user_id}");

    let active_model = ActiveModel {
        user_id: Set(user_id),
        booking_id: Set(booking_id),
        action: Set(action.to_string()),
        payload: Set(payload),
        read: Set(false),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

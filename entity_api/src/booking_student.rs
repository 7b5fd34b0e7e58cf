//! Queries over the booking_students junction table.

use super::error::Error;
use entity::booking_students::{Column, Entity};
use entity::Id;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder};

/// Returns the raw student references attached to a booking, in enrollment order.
pub async fn find_student_refs(db: &DatabaseConnection, booking_id: Id) -> Result<Vec<String>, Error> {
    let rows = Entity::find()
        .filter(Column::BookingId.eq(booking_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|row| row.student_ref).collect())
}

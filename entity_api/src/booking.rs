//! Queries over the bookings table.

use super::error::{EntityApiErrorKind, Error};
use entity::booking_status::BookingStatus;
use entity::bookings::{Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder};

/// Returns every booking currently in the `confirmed` state, oldest first.
///
/// The reminder scheduler runs this on every tick; it is a plain read and never
/// takes locks.
pub async fn find_confirmed(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    let bookings = Entity::find()
        .filter(Column::Status.eq(BookingStatus::Confirmed))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?;

    debug!("Found {} confirmed bookings", bookings.len());

    Ok(bookings)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| {
        debug!("Booking with id {id} not found");
        Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
    })
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn booking(status: BookingStatus, schedule: Option<&str>) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            status,
            schedule: schedule.map(str::to_string),
            venue: Some("Room 204".to_string()),
            summary: None,
            teacher_ref: Id::new_v4().to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_confirmed_returns_query_results() -> Result<(), Error> {
        let confirmed = booking(BookingStatus::Confirmed, Some("2025-03-01T10:00:00Z"));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![confirmed.clone()]])
            .into_connection();

        let bookings = find_confirmed(&db).await?;

        assert_eq!(bookings, vec![confirmed]);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_not_found_for_missing_booking() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let result = find_by_id(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }
}

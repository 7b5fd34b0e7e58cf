//! Bookings as seen by the reminder scheduler.

use crate::booking_status::BookingStatus;
use crate::error::Error;
use crate::user_ref::UserRef;
use crate::{bookings, Id};
use async_trait::async_trait;
use entity_api::{booking, booking_student};
use log::*;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// A booking with its people references already classified.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: Id,
    pub status: BookingStatus,
    /// Raw schedule string; see [`crate::booking_time::parse_booking_time`].
    pub schedule: Option<String>,
    pub venue: Option<String>,
    pub summary: Option<String>,
    /// `None` when the stored teacher reference is blank.
    pub teacher: Option<UserRef>,
    pub students: Vec<UserRef>,
}

impl Booking {
    pub fn from_model(model: bookings::Model, student_refs: Vec<String>) -> Self {
        let teacher = UserRef::parse(&model.teacher_ref);
        if teacher.is_none() {
            warn!("Booking {} has a blank teacher reference", model.id);
        }

        let students = student_refs
            .iter()
            .filter_map(|raw| {
                let parsed = UserRef::parse(raw);
                if parsed.is_none() {
                    warn!("Booking {} has a blank student reference", model.id);
                }
                parsed
            })
            .collect();

        Booking {
            id: model.id,
            status: model.status,
            schedule: model.schedule,
            venue: model.venue,
            summary: model.summary,
            teacher,
            students,
        }
    }
}

/// Read access to bookings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// All bookings whose status is `confirmed`.
    async fn confirmed_bookings(&self) -> Result<Vec<Booking>, Error>;
}

pub struct DatabaseBookingStore {
    db: Arc<DatabaseConnection>,
}

impl DatabaseBookingStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookingStore for DatabaseBookingStore {
    async fn confirmed_bookings(&self) -> Result<Vec<Booking>, Error> {
        let models = booking::find_confirmed(&self.db).await?;
        let mut bookings = Vec::with_capacity(models.len());

        for model in models {
            match booking_student::find_student_refs(&self.db, model.id).await {
                Ok(student_refs) => bookings.push(Booking::from_model(model, student_refs)),
                Err(e) => {
                    error!("Failed to load students for booking {}: {e}", model.id);
                }
            }
        }

        Ok(bookings)
    }
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of a consultation booking.
///
/// Bookings are created `Pending` (student request) or `Confirmed` (teacher
/// created), and end as `Cancelled` or `Completed`. Only confirmed bookings
/// carry a meaningful schedule.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_status")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(fmt, "pending"),
            BookingStatus::Confirmed => write!(fmt, "confirmed"),
            BookingStatus::Cancelled => write!(fmt, "cancelled"),
            BookingStatus::Completed => write!(fmt, "completed"),
        }
    }
}

use uuid::Uuid;

pub mod prelude;

pub mod booking_status;
pub mod booking_students;
pub mod bookings;
pub mod consultation_sessions;
pub mod notifications;
pub mod roles;
pub mod users;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;

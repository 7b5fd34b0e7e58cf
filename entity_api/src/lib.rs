//! Database access for the consultation platform.
//!
//! Each module wraps one table with the handful of queries the domain layer needs.
//! Functions take a `&DatabaseConnection` (or any `ConnectionTrait`) and return
//! `entity_api::error::Error`, which the domain layer translates into its own errors.

pub use entity::{
    booking_status, booking_students, bookings, consultation_sessions, notifications, roles,
    users, Id,
};

pub mod booking;
pub mod booking_student;
pub mod consultation_session;
pub mod error;
pub mod notification;
pub mod user;

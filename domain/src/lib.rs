//! Domain layer of the consultation platform.
//!
//! Two pieces carry real logic:
//! - [`quality`]: the sentiment-based consultation quality scorer, a pure function.
//! - [`reminder`]: the appointment-reminder scheduler that scans confirmed bookings
//!   and emits time-windowed notifications.
//!
//! Everything else adapts the storage (`entity_api`), transcription
//! (`consultation_ai`) and event (`events`) collaborators to those two.

pub use entity_api::{booking_status, bookings, consultation_sessions, users, Id};

pub mod booking;
pub mod booking_time;
pub mod cache;
pub mod consultation_session;
pub mod directory;
pub mod error;
pub mod notification;
pub mod quality;
pub mod reminder;
pub mod user_ref;

pub mod gateway;

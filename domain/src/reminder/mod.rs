//! Appointment reminders.
//!
//! Two periodic checks look ahead from "now" (24 hours and 1 hour) and notify
//! the teacher and students of every confirmed booking whose schedule falls
//! inside the check's [`ReminderWindow`]. Delivery is at-least-once: unless
//! deduplication is enabled, a booking that stays inside a window across
//! several ticks is notified on each of them.

pub mod dispatcher;
pub mod ledger;
pub mod notification;
pub mod scheduler;
pub mod window;

pub use dispatcher::{ReminderDispatcher, TickReport};
pub use notification::{NotificationSink, ReminderNotification};
pub use scheduler::ReminderScheduler;
pub use window::{ReminderKind, ReminderWindow};

pub use super::booking_students::Entity as BookingStudents;
pub use super::bookings::Entity as Bookings;
pub use super::consultation_sessions::Entity as ConsultationSessions;
pub use super::notifications::Entity as Notifications;
pub use super::users::Entity as Users;

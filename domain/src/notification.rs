//! Delivery side of reminders.
//!
//! The scheduler hands each finished reminder to a [`NotificationSink`]. In the
//! running process that sink is an [`EventNotificationSink`], which turns the
//! reminder into a `DomainEvent::ReminderDue` so any number of delivery
//! handlers (persistence, push, email) can react to it independently.

use crate::reminder::{NotificationSink, ReminderNotification};
use async_trait::async_trait;
use entity_api::notification as notification_api;
use events::{DomainEvent, EventHandler, EventPublisher};
use log::*;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Publishes every reminder as a `ReminderDue` event.
pub struct EventNotificationSink {
    publisher: EventPublisher,
}

impl EventNotificationSink {
    pub fn new(publisher: EventPublisher) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl NotificationSink for EventNotificationSink {
    async fn send_notification(&self, notification: ReminderNotification) {
        debug!(
            "Publishing {} for booking {} to {}",
            notification.action(),
            notification.booking_id(),
            notification.target_email()
        );

        self.publisher
            .publish(DomainEvent::ReminderDue {
                booking_id: notification.booking_id(),
                action: notification.action().to_string(),
                notification: notification.to_json(),
                notify_user_ids: vec![notification.recipient_id()],
            })
            .await;
    }
}

/// Stores each due reminder in the notifications table, one row per recipient.
///
/// A failed insert is logged and dropped; the reminder is not retried.
pub struct NotificationRecorder {
    db: Arc<DatabaseConnection>,
}

impl NotificationRecorder {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventHandler for NotificationRecorder {
    async fn handle(&self, event: &DomainEvent) {
        let DomainEvent::ReminderDue {
            booking_id,
            action,
            notification,
            notify_user_ids,
        } = event
        else {
            return;
        };

        for user_id in notify_user_ids {
            match notification_api::create(
                &self.db,
                *user_id,
                Some(*booking_id),
                action,
                notification.clone(),
            )
            .await
            {
                Ok(saved) => debug!("Stored {action} notification {} for user {user_id}", saved.id),
                Err(e) => error!(
                    "Failed to store {action} notification for user {user_id} (booking {booking_id}): {e}"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::notification::StudentReminder;
    use crate::Id;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Captured {
        events: Mutex<Vec<DomainEvent>>,
    }

    #[async_trait]
    impl EventHandler for Captured {
        async fn handle(&self, event: &DomainEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn student_reminder(booking_id: Id, student_id: Id) -> ReminderNotification {
        ReminderNotification::Student(StudentReminder {
            action: "reminder_24h".to_string(),
            booking_id,
            target_email: "ben.cruz@school.edu".to_string(),
            target_student_id: student_id,
            teacher_name: "Ada Reyes".to_string(),
            schedule: "2025-03-02T09:00:00Z".to_string(),
            venue: None,
            timestamp: "2025-03-01T09:00:00+00:00".to_string(),
            message: "Reminder".to_string(),
        })
    }

    #[tokio::test]
    async fn sink_publishes_reminder_due_for_the_recipient() {
        let captured = Arc::new(Captured::default());
        let sink = EventNotificationSink::new(EventPublisher::new().with_handler(captured.clone()));
        let booking_id = Id::new_v4();
        let student_id = Id::new_v4();

        sink.send_notification(student_reminder(booking_id, student_id))
            .await;

        let events = captured.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            DomainEvent::ReminderDue {
                booking_id: published_booking,
                action,
                notification,
                notify_user_ids,
            } => {
                assert_eq!(*published_booking, booking_id);
                assert_eq!(action, "reminder_24h");
                assert_eq!(notify_user_ids, &vec![student_id]);
                assert_eq!(notification["targetStudentId"], serde_json::json!(student_id));
            }
            other => panic!("unexpected event {}", other.name()),
        }
    }

    #[cfg(feature = "mock")]
    mod recorder {
        use super::*;
        use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

        #[tokio::test]
        async fn recorder_swallows_storage_errors() {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors(vec![DbErr::Custom("insert failed".to_string())])
                .into_connection();
            let recorder = NotificationRecorder::new(Arc::new(db));
            let booking_id = Id::new_v4();
            let student_id = Id::new_v4();
            let reminder = student_reminder(booking_id, student_id);

            recorder
                .handle(&DomainEvent::ReminderDue {
                    booking_id,
                    action: reminder.action().to_string(),
                    notification: reminder.to_json(),
                    notify_user_ids: vec![student_id],
                })
                .await;
        }

        #[tokio::test]
        async fn recorder_ignores_other_events() {
            let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
            let recorder = NotificationRecorder::new(Arc::new(db));

            recorder
                .handle(&DomainEvent::ConsultationScored {
                    consultation_session_id: Id::new_v4(),
                    quality_score: 0.8,
                    quality_metrics: serde_json::json!({}),
                })
                .await;
        }
    }
}

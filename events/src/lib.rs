//! Event system infrastructure for the consultation platform.
//!
//! Domain code announces that something happened (a reminder became due, a
//! consultation was scored) by publishing a [`DomainEvent`]. Delivery concerns
//! such as persisting a notification row or pushing to a socket live in
//! [`EventHandler`] implementations registered with the [`EventPublisher`].
//!
//! This crate has no dependencies on internal crates (entity, domain, etc.),
//! avoiding circular dependencies. Entity data is carried as serialized JSON values.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A type alias that represents any Entity's internal id field data type.
/// This matches the definition in the entity crate to maintain compatibility.
pub type Id = Uuid;

#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A booking entered a reminder window and a notification was built for one recipient.
    ReminderDue {
        booking_id: Id,
        /// Window tag, `reminder_24h` or `reminder_1h`.
        action: String,
        /// The serialized notification payload, exactly as the recipient should see it.
        notification: Value,
        /// Users the payload is addressed to.
        notify_user_ids: Vec<Id>,
    },
    /// A consultation session received a quality score.
    ConsultationScored {
        consultation_session_id: Id,
        quality_score: f64,
        quality_metrics: Value,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::ReminderDue { .. } => "reminder_due",
            DomainEvent::ConsultationScored { .. } => "consultation_scored",
        }
    }
}

/// Trait for handling domain events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers.
    /// Handlers own their failures; one handler failing never stops the rest.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl EventHandler for Recording {
        async fn handle(&self, event: &DomainEvent) {
            self.seen.lock().unwrap().push(event.name());
        }
    }

    #[tokio::test]
    async fn publish_reaches_every_registered_handler() {
        let first = Arc::new(Recording::default());
        let second = Arc::new(Recording::default());
        let publisher = EventPublisher::new()
            .with_handler(first.clone())
            .with_handler(second.clone());

        publisher
            .publish(DomainEvent::ReminderDue {
                booking_id: Id::new_v4(),
                action: "reminder_1h".to_string(),
                notification: json!({}),
                notify_user_ids: vec![Id::new_v4()],
            })
            .await;

        assert_eq!(publisher.handler_count(), 2);
        assert_eq!(*first.seen.lock().unwrap(), vec!["reminder_due"]);
        assert_eq!(*second.seen.lock().unwrap(), vec!["reminder_due"]);
    }

    #[tokio::test]
    async fn publish_without_handlers_is_a_no_op() {
        EventPublisher::default()
            .publish(DomainEvent::ConsultationScored {
                consultation_session_id: Id::new_v4(),
                quality_score: 0.5,
                quality_metrics: json!({}),
            })
            .await;
    }
}

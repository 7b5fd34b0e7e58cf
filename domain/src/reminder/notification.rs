use crate::Id;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// A student listed on the teacher's copy of a reminder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: Id,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherReminder {
    pub action: String,
    #[serde(rename = "bookingID")]
    pub booking_id: Id,
    pub target_email: String,
    pub target_teacher_id: Id,
    pub teacher_name: String,
    pub schedule: String,
    pub venue: Option<String>,
    /// Dispatch time, not the schedule time.
    pub timestamp: String,
    pub message: String,
    pub summary: Option<String>,
    pub students: Vec<StudentSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReminder {
    pub action: String,
    #[serde(rename = "bookingID")]
    pub booking_id: Id,
    pub target_email: String,
    pub target_student_id: Id,
    pub teacher_name: String,
    pub schedule: String,
    pub venue: Option<String>,
    pub timestamp: String,
    pub message: String,
}

/// One reminder addressed to one person.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReminderNotification {
    Teacher(TeacherReminder),
    Student(StudentReminder),
}

impl ReminderNotification {
    pub fn action(&self) -> &str {
        match self {
            ReminderNotification::Teacher(t) => &t.action,
            ReminderNotification::Student(s) => &s.action,
        }
    }

    pub fn booking_id(&self) -> Id {
        match self {
            ReminderNotification::Teacher(t) => t.booking_id,
            ReminderNotification::Student(s) => s.booking_id,
        }
    }

    pub fn recipient_id(&self) -> Id {
        match self {
            ReminderNotification::Teacher(t) => t.target_teacher_id,
            ReminderNotification::Student(s) => s.target_student_id,
        }
    }

    pub fn target_email(&self) -> &str {
        match self {
            ReminderNotification::Teacher(t) => &t.target_email,
            ReminderNotification::Student(s) => &s.target_email,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Where finished reminders go.
///
/// Fire-and-forget: implementations log their own delivery failures and never
/// report them back to the scheduler.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_notification(&self, notification: ReminderNotification);
}

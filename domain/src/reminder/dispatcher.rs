use super::ledger::SentLedger;
use super::notification::{
    NotificationSink, ReminderNotification, StudentReminder, StudentSummary, TeacherReminder,
};
use super::window::ReminderWindow;
use crate::booking::{Booking, BookingStore};
use crate::booking_time::parse_booking_time;
use crate::directory::{Contact, UserDirectory};
use crate::error::Error;
use chrono::{DateTime, Utc};
use log::*;
use std::sync::Arc;

/// Name shown to students when the booking's teacher cannot be resolved.
const UNKNOWN_TEACHER: &str = "your teacher";

/// Counters for one pass over the confirmed bookings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub scanned: usize,
    pub matched: usize,
    pub unparseable: usize,
    pub already_sent: usize,
    pub failed: usize,
    pub notifications_sent: usize,
}

/// Turns confirmed bookings that fall inside a [`ReminderWindow`] into
/// notifications for their teacher and students.
pub struct ReminderDispatcher {
    bookings: Arc<dyn BookingStore>,
    directory: Arc<dyn UserDirectory>,
    sink: Arc<dyn NotificationSink>,
    ledger: Option<SentLedger>,
}

impl ReminderDispatcher {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        directory: Arc<dyn UserDirectory>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            bookings,
            directory,
            sink,
            ledger: None,
        }
    }

    /// Skip (booking, window) pairs that were already notified.
    pub fn with_dedup(mut self) -> Self {
        self.ledger = Some(SentLedger::new());
        self
    }

    pub fn ledger(&self) -> Option<&SentLedger> {
        self.ledger.as_ref()
    }

    /// Runs one check of `window` as of `now`.
    ///
    /// Never fails: a store error ends the tick early, and a failure on one
    /// booking is logged and the next booking is processed.
    pub async fn tick(&self, window: &ReminderWindow, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::default();
        let (start, end) = window.bounds(now);
        debug!("Checking {} reminders for schedules in [{start}, {end}]", window.kind);

        let bookings = match self.bookings.confirmed_bookings().await {
            Ok(bookings) => bookings,
            Err(e) => {
                error!("Failed to query confirmed bookings for {}: {e}", window.kind);
                report.failed += 1;
                return report;
            }
        };

        if let Some(ledger) = &self.ledger {
            ledger.prune(window.kind, now, window.target_offset + window.half_width);
        }

        for booking in bookings {
            report.scanned += 1;

            let Some(schedule) = booking.schedule.as_deref().and_then(parse_booking_time) else {
                debug!(
                    "Skipping booking {} with missing or unparseable schedule {:?}",
                    booking.id, booking.schedule
                );
                report.unparseable += 1;
                continue;
            };

            if !window.contains(now, schedule) {
                continue;
            }
            report.matched += 1;

            if let Some(ledger) = &self.ledger {
                if ledger.was_sent(booking.id, window.kind) {
                    trace!("{} already sent for booking {}", window.kind, booking.id);
                    report.already_sent += 1;
                    continue;
                }
            }

            match self.remind(&booking, window, now).await {
                Ok(sent) => {
                    report.notifications_sent += sent;
                    if let Some(ledger) = &self.ledger {
                        ledger.record(booking.id, window.kind, now);
                    }
                }
                Err(e) => {
                    error!("Failed to send {} for booking {}: {e}", window.kind, booking.id);
                    report.failed += 1;
                }
            }
        }

        info!(
            "{} check: scanned={} matched={} sent={} failed={}",
            window.kind, report.scanned, report.matched, report.notifications_sent, report.failed
        );
        report
    }

    /// Resolves everyone on the booking, then sends. A lookup error aborts the
    /// booking before anything is sent; a missing person only drops their copy.
    async fn remind(
        &self,
        booking: &Booking,
        window: &ReminderWindow,
        now: DateTime<Utc>,
    ) -> Result<usize, Error> {
        let teacher = match &booking.teacher {
            Some(reference) => {
                let contact = self.directory.resolve_user(reference).await?;
                if contact.is_none() {
                    warn!("Teacher {reference} of booking {} not found", booking.id);
                }
                contact
            }
            None => None,
        };

        let mut students: Vec<Contact> = Vec::with_capacity(booking.students.len());
        for reference in &booking.students {
            match self.directory.resolve_user(reference).await? {
                Some(contact) => students.push(contact),
                None => warn!("Student {reference} of booking {} not found", booking.id),
            }
        }

        let action = window.kind.action().to_string();
        let schedule = booking.schedule.clone().unwrap_or_default();
        let timestamp = now.to_rfc3339();
        let teacher_name = teacher
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_else(|| UNKNOWN_TEACHER.to_string());

        let mut notifications = Vec::with_capacity(students.len() + 1);

        if let Some(teacher) = &teacher {
            notifications.push(ReminderNotification::Teacher(TeacherReminder {
                action: action.clone(),
                booking_id: booking.id,
                target_email: teacher.email.clone(),
                target_teacher_id: teacher.id,
                teacher_name: teacher_name.clone(),
                schedule: schedule.clone(),
                venue: booking.venue.clone(),
                timestamp: timestamp.clone(),
                message: window.kind.teacher_message(students.len(), &schedule),
                summary: booking.summary.clone(),
                students: students
                    .iter()
                    .map(|s| StudentSummary {
                        id: s.id,
                        name: s.name.clone(),
                        email: s.email.clone(),
                    })
                    .collect(),
            }));
        }

        for student in &students {
            notifications.push(ReminderNotification::Student(StudentReminder {
                action: action.clone(),
                booking_id: booking.id,
                target_email: student.email.clone(),
                target_student_id: student.id,
                teacher_name: teacher_name.clone(),
                schedule: schedule.clone(),
                venue: booking.venue.clone(),
                timestamp: timestamp.clone(),
                message: window.kind.message(&teacher_name, &schedule),
            }));
        }

        let sent = notifications.len();
        for notification in notifications {
            self.sink.send_notification(notification).await;
        }
        Ok(sent)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::booking_status::BookingStatus;
    use crate::user_ref::UserRef;
    use crate::Id;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    pub(crate) struct FakeStore {
        pub bookings: Mutex<Vec<Booking>>,
        pub fail: bool,
    }

    impl FakeStore {
        pub fn with(bookings: Vec<Booking>) -> Self {
            Self {
                bookings: Mutex::new(bookings),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl BookingStore for FakeStore {
        async fn confirmed_bookings(&self) -> Result<Vec<Booking>, Error> {
            if self.fail {
                return Err(Error::internal("store offline"));
            }
            Ok(self.bookings.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeDirectory {
        pub people: HashMap<UserRef, Contact>,
        pub broken: HashSet<UserRef>,
    }

    impl FakeDirectory {
        pub fn add(&mut self, name: &str) -> (UserRef, Contact) {
            let id = Id::new_v4();
            let contact = Contact {
                id,
                email: format!("{}@school.edu", name.to_lowercase()),
                name: name.to_string(),
            };
            self.people.insert(UserRef::Id(id), contact.clone());
            (UserRef::Id(id), contact)
        }
    }

    #[async_trait]
    impl UserDirectory for FakeDirectory {
        async fn resolve_user(&self, reference: &UserRef) -> Result<Option<Contact>, Error> {
            if self.broken.contains(reference) {
                return Err(Error::internal("lookup failed"));
            }
            Ok(self.people.get(reference).cloned())
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub sent: Mutex<Vec<ReminderNotification>>,
    }

    impl RecordingSink {
        pub fn sent(&self) -> Vec<ReminderNotification> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn send_notification(&self, notification: ReminderNotification) {
            self.sent.lock().unwrap().push(notification);
        }
    }

    pub(crate) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    pub(crate) fn booking(
        schedule: Option<String>,
        teacher: Option<UserRef>,
        students: Vec<UserRef>,
    ) -> Booking {
        Booking {
            id: Id::new_v4(),
            status: BookingStatus::Confirmed,
            schedule,
            venue: Some("Faculty Room 3".to_string()),
            summary: Some("Thesis proposal review".to_string()),
            teacher,
            students,
        }
    }

    fn dispatcher(
        store: FakeStore,
        directory: FakeDirectory,
    ) -> (ReminderDispatcher, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let dispatcher =
            ReminderDispatcher::new(Arc::new(store), Arc::new(directory), sink.clone());
        (dispatcher, sink)
    }

    fn in_an_hour() -> Option<String> {
        Some((now() + Duration::hours(1)).to_rfc3339())
    }

    #[tokio::test]
    async fn matched_booking_notifies_teacher_and_each_student() {
        let mut directory = FakeDirectory::default();
        let (teacher_ref, teacher) = directory.add("Ada");
        let (ben_ref, ben) = directory.add("Ben");
        let (cy_ref, cy) = directory.add("Cy");
        let booking = booking(in_an_hour(), Some(teacher_ref), vec![ben_ref, cy_ref]);
        let booking_id = booking.id;
        let (dispatcher, sink) = dispatcher(FakeStore::with(vec![booking]), directory);

        let report = dispatcher.tick(&ReminderWindow::hour(), now()).await;

        assert_eq!(report.matched, 1);
        assert_eq!(report.notifications_sent, 3);
        let sent = sink.sent();
        assert_eq!(sent.len(), 3);

        let ReminderNotification::Teacher(to_teacher) = &sent[0] else {
            panic!("first notification should address the teacher");
        };
        assert_eq!(to_teacher.action, "reminder_1h");
        assert_eq!(to_teacher.booking_id, booking_id);
        assert_eq!(to_teacher.target_teacher_id, teacher.id);
        assert_eq!(to_teacher.students.len(), 2);
        assert_eq!(to_teacher.timestamp, now().to_rfc3339());
        assert_eq!(to_teacher.summary.as_deref(), Some("Thesis proposal review"));

        let recipients: Vec<Id> = sent[1..].iter().map(|n| n.recipient_id()).collect();
        assert_eq!(recipients, vec![ben.id, cy.id]);
        for notification in &sent[1..] {
            let ReminderNotification::Student(to_student) = notification else {
                panic!("expected a student notification");
            };
            assert_eq!(to_student.teacher_name, "Ada");
            assert_eq!(to_student.venue.as_deref(), Some("Faculty Room 3"));
        }
    }

    #[tokio::test]
    async fn booking_an_hour_out_is_ignored_by_the_day_check() {
        let mut directory = FakeDirectory::default();
        let (teacher_ref, _) = directory.add("Ada");
        let (dispatcher, sink) = dispatcher(
            FakeStore::with(vec![booking(in_an_hour(), Some(teacher_ref), vec![])]),
            directory,
        );

        let report = dispatcher.tick(&ReminderWindow::day(), now()).await;

        assert_eq!(report.matched, 0);
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn unparseable_or_missing_schedule_is_skipped() {
        let mut directory = FakeDirectory::default();
        let (teacher_ref, _) = directory.add("Ada");
        let store = FakeStore::with(vec![
            booking(Some("not-a-date".to_string()), Some(teacher_ref.clone()), vec![]),
            booking(None, Some(teacher_ref), vec![]),
        ]);
        let (dispatcher, sink) = dispatcher(store, directory);

        for window in [ReminderWindow::hour(), ReminderWindow::day()] {
            let report = dispatcher.tick(&window, now()).await;
            assert_eq!(report.unparseable, 2);
            assert_eq!(report.failed, 0);
        }
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn failing_lookup_only_loses_that_booking() {
        let mut directory = FakeDirectory::default();
        let (good_teacher, _) = directory.add("Ada");
        let (student, _) = directory.add("Ben");
        let broken_teacher = UserRef::IdNumber("T-404".to_string());
        directory.broken.insert(broken_teacher.clone());
        let store = FakeStore::with(vec![
            booking(in_an_hour(), Some(broken_teacher), vec![student.clone()]),
            booking(in_an_hour(), Some(good_teacher), vec![student]),
        ]);
        let (dispatcher, sink) = dispatcher(store, directory);

        let report = dispatcher.tick(&ReminderWindow::hour(), now()).await;

        assert_eq!(report.matched, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.notifications_sent, 2);
        assert_eq!(sink.sent().len(), 2);
    }

    #[tokio::test]
    async fn missing_people_only_drop_their_own_notification() {
        let mut directory = FakeDirectory::default();
        let (student, ben) = directory.add("Ben");
        let ghost_teacher = UserRef::Id(Id::new_v4());
        let ghost_student = UserRef::IdNumber("2019-99999".to_string());
        let store = FakeStore::with(vec![booking(
            in_an_hour(),
            Some(ghost_teacher),
            vec![ghost_student, student],
        )]);
        let (dispatcher, sink) = dispatcher(store, directory);

        let report = dispatcher.tick(&ReminderWindow::hour(), now()).await;

        assert_eq!(report.failed, 0);
        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient_id(), ben.id);
        let ReminderNotification::Student(to_student) = &sent[0] else {
            panic!("expected a student notification");
        };
        assert_eq!(to_student.teacher_name, UNKNOWN_TEACHER);
    }

    #[tokio::test]
    async fn store_failure_ends_the_tick_quietly() {
        let store = FakeStore {
            bookings: Mutex::new(vec![]),
            fail: true,
        };
        let (dispatcher, sink) = dispatcher(store, FakeDirectory::default());

        let report = dispatcher.tick(&ReminderWindow::hour(), now()).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.scanned, 0);
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn repeated_ticks_resend_without_dedup() {
        let mut directory = FakeDirectory::default();
        let (teacher_ref, _) = directory.add("Ada");
        let (dispatcher, sink) = dispatcher(
            FakeStore::with(vec![booking(in_an_hour(), Some(teacher_ref), vec![])]),
            directory,
        );
        let window = ReminderWindow::hour();

        dispatcher.tick(&window, now()).await;
        dispatcher.tick(&window, now() + Duration::minutes(10)).await;

        assert_eq!(sink.sent().len(), 2);
    }

    #[tokio::test]
    async fn dedup_sends_once_per_booking_and_window() {
        let mut directory = FakeDirectory::default();
        let (teacher_ref, _) = directory.add("Ada");
        let booking = booking(in_an_hour(), Some(teacher_ref), vec![]);
        let booking_id = booking.id;
        let (dispatcher, sink) = dispatcher(FakeStore::with(vec![booking]), directory);
        let dispatcher = dispatcher.with_dedup();
        let window = ReminderWindow::hour();

        dispatcher.tick(&window, now()).await;
        let second = dispatcher.tick(&window, now() + Duration::minutes(10)).await;

        assert_eq!(second.already_sent, 1);
        assert_eq!(sink.sent().len(), 1);
        assert!(dispatcher
            .ledger()
            .is_some_and(|ledger| ledger.was_sent(booking_id, window.kind)));
    }

    #[tokio::test]
    async fn dedup_does_not_record_failed_bookings() {
        let mut directory = FakeDirectory::default();
        let broken = UserRef::IdNumber("T-500".to_string());
        directory.broken.insert(broken.clone());
        let booking = booking(in_an_hour(), Some(broken), vec![]);
        let booking_id = booking.id;
        let (dispatcher, _sink) = dispatcher(FakeStore::with(vec![booking]), directory);
        let dispatcher = dispatcher.with_dedup();
        let window = ReminderWindow::hour();

        dispatcher.tick(&window, now()).await;

        assert!(dispatcher
            .ledger()
            .is_some_and(|ledger| !ledger.was_sent(booking_id, window.kind)));
    }
}

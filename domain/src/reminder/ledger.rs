use super::window::ReminderKind;
use crate::Id;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Record of which bookings already received which reminder.
///
/// Only used when reminder deduplication is switched on. Without it a booking
/// is re-notified on every tick that still finds it inside the window.
#[derive(Debug, Default)]
pub struct SentLedger {
    sent: Mutex<HashMap<(Id, ReminderKind), DateTime<Utc>>>,
}

impl SentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_at(&self, booking_id: Id, kind: ReminderKind) -> Option<DateTime<Utc>> {
        self.sent
            .lock()
            .ok()
            .and_then(|sent| sent.get(&(booking_id, kind)).copied())
    }

    pub fn was_sent(&self, booking_id: Id, kind: ReminderKind) -> bool {
        self.sent_at(booking_id, kind).is_some()
    }

    pub fn record(&self, booking_id: Id, kind: ReminderKind, at: DateTime<Utc>) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.insert((booking_id, kind), at);
        }
    }

    /// Drops entries of `kind` recorded more than `retention` before `now`.
    pub fn prune(&self, kind: ReminderKind, now: DateTime<Utc>, retention: Duration) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.retain(|(_, k), at| *k != kind || now - *at <= retention);
        }
    }

    pub fn len(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn records_are_per_booking_and_window() {
        let ledger = SentLedger::new();
        let booking_id = Id::new_v4();
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();

        ledger.record(booking_id, ReminderKind::Day, now);

        assert!(ledger.was_sent(booking_id, ReminderKind::Day));
        assert!(!ledger.was_sent(booking_id, ReminderKind::Hour));
        assert!(!ledger.was_sent(Id::new_v4(), ReminderKind::Day));
    }

    #[test]
    fn prune_only_touches_old_entries_of_the_given_kind() {
        let ledger = SentLedger::new();
        let old = Id::new_v4();
        let fresh = Id::new_v4();
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();

        ledger.record(old, ReminderKind::Hour, now - Duration::hours(3));
        ledger.record(old, ReminderKind::Day, now - Duration::hours(3));
        ledger.record(fresh, ReminderKind::Hour, now - Duration::minutes(10));

        ledger.prune(ReminderKind::Hour, now, Duration::hours(2));

        assert!(!ledger.was_sent(old, ReminderKind::Hour));
        assert!(ledger.was_sent(old, ReminderKind::Day));
        assert!(ledger.was_sent(fresh, ReminderKind::Hour));
        assert_eq!(ledger.len(), 2);
    }
}

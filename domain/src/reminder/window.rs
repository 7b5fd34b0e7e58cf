use chrono::{DateTime, Duration, Utc};
use log::*;
use service::config::{Config, MAX_REMINDER_HALF_WIDTH_MINS};
use std::fmt;

/// Which look-ahead reminder a window produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderKind {
    /// Sent roughly a day before the consultation.
    Day,
    /// Sent roughly an hour before the consultation.
    Hour,
}

impl ReminderKind {
    /// Tag carried in the `action` field of every payload for this window.
    pub fn action(&self) -> &'static str {
        match self {
            ReminderKind::Day => "reminder_24h",
            ReminderKind::Hour => "reminder_1h",
        }
    }

    fn lead_time(&self) -> &'static str {
        match self {
            ReminderKind::Day => "tomorrow",
            ReminderKind::Hour => "in 1 hour",
        }
    }

    /// Human readable body of the reminder.
    pub fn message(&self, teacher_name: &str, schedule: &str) -> String {
        format!(
            "Reminder: your consultation with {teacher_name} is {} ({schedule}).",
            self.lead_time()
        )
    }

    /// Body used for the teacher's own copy of the reminder.
    pub fn teacher_message(&self, student_count: usize, schedule: &str) -> String {
        let students = if student_count == 1 {
            "1 student".to_string()
        } else {
            format!("{student_count} students")
        };
        format!(
            "Reminder: your consultation with {students} is {} ({schedule}).",
            self.lead_time()
        )
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

/// The band `[now + target_offset - half_width, now + target_offset + half_width]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    pub kind: ReminderKind,
    pub target_offset: Duration,
    pub half_width: Duration,
}

impl ReminderWindow {
    pub fn new(kind: ReminderKind, target_offset: Duration, half_width: Duration) -> Self {
        Self {
            kind,
            target_offset,
            half_width,
        }
    }

    /// 24 hours ahead, plus or minus one hour.
    pub fn day() -> Self {
        Self::new(ReminderKind::Day, Duration::hours(24), Duration::hours(1))
    }

    /// One hour ahead, plus or minus thirty minutes.
    pub fn hour() -> Self {
        Self::new(ReminderKind::Hour, Duration::hours(1), Duration::minutes(30))
    }

    pub fn day_from_config(config: &Config) -> Self {
        let default = Self::day();
        Self {
            half_width: half_width_or(default, config.reminder_24h_half_width_mins),
            ..default
        }
    }

    pub fn hour_from_config(config: &Config) -> Self {
        let default = Self::hour();
        Self {
            half_width: half_width_or(default, config.reminder_1h_half_width_mins),
            ..default
        }
    }

    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let target = now + self.target_offset;
        (target - self.half_width, target + self.half_width)
    }

    /// Inclusive on both ends.
    pub fn contains(&self, now: DateTime<Utc>, schedule: DateTime<Utc>) -> bool {
        let (start, end) = self.bounds(now);
        start <= schedule && schedule <= end
    }
}

/// A configured half width outside `1..=MAX_REMINDER_HALF_WIDTH_MINS` keeps the default.
fn half_width_or(default: ReminderWindow, minutes: i64) -> Duration {
    if (1..=MAX_REMINDER_HALF_WIDTH_MINS).contains(&minutes) {
        Duration::minutes(minutes)
    } else {
        warn!(
            "{} half width of {minutes} minutes is out of range, using {} minutes",
            default.kind,
            default.half_width.num_minutes()
        );
        default.half_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::Parser;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn booking_an_hour_out_only_matches_the_hour_window() {
        let now = now();
        let schedule = now + Duration::hours(1);

        assert!(ReminderWindow::hour().contains(now, schedule));
        assert!(!ReminderWindow::day().contains(now, schedule));
    }

    #[test]
    fn booking_a_day_out_only_matches_the_day_window() {
        let now = now();
        let schedule = now + Duration::hours(24) + Duration::minutes(20);

        assert!(ReminderWindow::day().contains(now, schedule));
        assert!(!ReminderWindow::hour().contains(now, schedule));
    }

    #[test]
    fn window_edges_are_inclusive() {
        let now = now();
        let window = ReminderWindow::hour();
        let (start, end) = window.bounds(now);

        assert_eq!(start, now + Duration::minutes(30));
        assert_eq!(end, now + Duration::minutes(90));
        assert!(window.contains(now, start));
        assert!(window.contains(now, end));
        assert!(!window.contains(now, start - Duration::seconds(1)));
        assert!(!window.contains(now, end + Duration::seconds(1)));
    }

    #[test]
    fn half_widths_come_from_config() {
        let config = Config::parse_from([
            "consultation_platform",
            "--reminder-24h-half-width-mins",
            "90",
            "--reminder-1h-half-width-mins",
            "15",
        ]);

        assert_eq!(
            ReminderWindow::day_from_config(&config).half_width,
            Duration::minutes(90)
        );
        assert_eq!(
            ReminderWindow::hour_from_config(&config).half_width,
            Duration::minutes(15)
        );
    }

    #[test]
    fn out_of_range_half_widths_keep_the_default() {
        let mut config = Config::parse_from(["consultation_platform"]);
        config.reminder_24h_half_width_mins = -15;
        config.reminder_1h_half_width_mins = i64::MAX;

        assert_eq!(ReminderWindow::day_from_config(&config), ReminderWindow::day());
        assert_eq!(ReminderWindow::hour_from_config(&config), ReminderWindow::hour());
    }

    #[test]
    fn actions_match_window_kind() {
        assert_eq!(ReminderWindow::day().kind.action(), "reminder_24h");
        assert_eq!(ReminderWindow::hour().kind.action(), "reminder_1h");
    }
}

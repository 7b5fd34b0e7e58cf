//! Parsing of booking schedule strings.
//!
//! Schedules reach the store from several clients over the years, so a single
//! column holds `Z`-suffixed ISO timestamps, ISO timestamps with explicit
//! offsets, minute-precision `datetime-local` values without any zone, and a
//! long tail of human formats. Everything without a zone is taken as UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

const ISO_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%dT%H:%M:%S%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
];

// Minute precision first, as sent by `datetime-local` inputs.
const ISO_NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];
const ABBREVIATED_ISO_LEN: usize = 16;

const FREEFORM_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S GMT%z",
    "%Y-%m-%d %H:%M:%S GMT%z",
];

const FREEFORM_NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%B %d, %Y %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%b %d, %Y %H:%M",
    "%d %B %Y %H:%M",
    "%d %b %Y %H:%M",
];

const FREEFORM_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"];

/// Parses a booking schedule into a UTC instant.
///
/// Tried in order:
/// 1. ISO-8601 with a trailing `Z` (read as `+00:00`)
/// 2. ISO-8601 with a `T` separator and explicit `±HH:MM`, `±HHMM` or `±HH` offset
/// 3. ISO-8601 without zone, at least minute precision (`YYYY-MM-DDTHH:MM`), as UTC.
///    Only `:SS[.f]` may follow the minutes; anything else, such as a zone
///    the previous steps could not read, is left to the free-form layouts
/// 4. a set of free-form layouts (RFC 2822, space separated, US and long-month
///    dates); zone-less results are UTC
///
/// Returns `None` when nothing matches. Callers treat that as "skip", never as an error.
pub fn parse_booking_time(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(without_z) = value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        if let Some(parsed) = parse_with_offset(&format!("{without_z}+00:00"), ISO_OFFSET_FORMATS)
        {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    if has_iso_offset(value) {
        if let Some(parsed) = parse_with_offset(value, ISO_OFFSET_FORMATS) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    if value.len() >= ABBREVIATED_ISO_LEN && value.contains('T') {
        if let Some(parsed) = parse_abbreviated_iso(value) {
            return Some(parsed);
        }
    }

    parse_freeform(value)
}

/// True for `…T…+HH:MM` / `…T…-HH:MM` style values.
fn has_iso_offset(value: &str) -> bool {
    value
        .split_once('T')
        .map(|(_, time)| time.contains('+') || time.contains('-'))
        .unwrap_or(false)
}

fn parse_with_offset(value: &str, formats: &[&str]) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok().or_else(|| {
        formats
            .iter()
            .find_map(|format| DateTime::parse_from_str(value, format).ok())
    })
}

/// The whole value must match; a zone-less prefix of a longer value never does.
fn parse_abbreviated_iso(value: &str) -> Option<DateTime<Utc>> {
    let naive = ISO_NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())?;
    Some(Utc.from_utc_datetime(&naive))
}

fn parse_freeform(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(parsed) = parse_with_offset(value, FREEFORM_OFFSET_FORMATS) {
        return Some(parsed.with_timezone(&Utc));
    }

    FREEFORM_NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            FREEFORM_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}

//! Teacher/student identifiers as stored on bookings.
//!
//! Booking rows reference people in three ways: by primary key, by institutional
//! id number, or by a document-style path such as `users/<uuid>`. A raw string
//! is classified once into a [`UserRef`] and resolved from there; call sites
//! never sniff strings themselves.

use crate::Id;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserRef {
    /// Primary key of the users table.
    Id(Id),
    /// Institutional id number (student/employee number).
    IdNumber(String),
}

impl UserRef {
    /// Classifies a stored reference. Path references (`users/<x>`, `/teachers/<x>`)
    /// are reduced to their last segment before classification. Returns `None`
    /// for blank references.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().trim_end_matches('/');
        let key = trimmed.rsplit('/').next().unwrap_or(trimmed).trim();
        if key.is_empty() {
            return None;
        }

        Some(match Id::parse_str(key) {
            Ok(id) => UserRef::Id(id),
            Err(_) => UserRef::IdNumber(key.to_string()),
        })
    }
}

impl From<Id> for UserRef {
    fn from(id: Id) -> Self {
        UserRef::Id(id)
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRef::Id(id) => write!(f, "{id}"),
            UserRef::IdNumber(number) => write!(f, "id_number:{number}"),
        }
    }
}

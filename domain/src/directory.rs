//! Resolution of teacher/student references into contact details.

use crate::cache::{Clock, TtlCache};
use crate::error::Error;
use crate::user_ref::UserRef;
use crate::{users, Id};
use async_trait::async_trait;
use entity_api::user;
use log::*;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

/// What a notification needs to know about a person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: Id,
    pub email: String,
    pub name: String,
}

impl From<users::Model> for Contact {
    fn from(user: users::Model) -> Self {
        Contact {
            id: user.id,
            name: user.full_name(),
            email: user.email,
        }
    }
}

/// Looks up people referenced by bookings.
///
/// `Ok(None)` means the reference points at nobody (deleted or never existed);
/// `Err` means the lookup itself failed.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve_user(&self, reference: &UserRef) -> Result<Option<Contact>, Error>;
}

/// `UserDirectory` backed by the users table, with a per-instance TTL cache.
///
/// Only successful lookups are cached so a user created after a miss is found on
/// the next tick.
pub struct DatabaseUserDirectory {
    db: Arc<DatabaseConnection>,
    cache: TtlCache<UserRef, Contact>,
}

impl DatabaseUserDirectory {
    pub fn new(
        db: Arc<DatabaseConnection>,
        ttl: Duration,
        capacity: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            db,
            cache: TtlCache::new(ttl, capacity, clock),
        }
    }
}

#[async_trait]
impl UserDirectory for DatabaseUserDirectory {
    async fn resolve_user(&self, reference: &UserRef) -> Result<Option<Contact>, Error> {
        if let Some(contact) = self.cache.get(reference) {
            trace!("User cache hit for {reference}");
            return Ok(Some(contact));
        }

        let found = match reference {
            UserRef::Id(id) => user::find_by_id(&self.db, *id).await?,
            UserRef::IdNumber(number) => user::find_by_id_number(&self.db, number).await?,
        };

        match found {
            Some(user) => {
                let contact = Contact::from(user);
                self.cache.insert(reference.clone(), contact.clone());
                Ok(Some(contact))
            }
            None => {
                debug!("No user found for reference {reference}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::cache::SystemClock;
    use entity::roles::Role;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn teacher() -> users::Model {
        let now = chrono::Utc::now();
        users::Model {
            id: Id::new_v4(),
            id_number: Some("T-0007".to_string()),
            email: "ada.reyes@school.edu".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Reyes".to_string(),
            role: Role::Teacher,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() -> Result<(), Error> {
        let teacher = teacher();
        // Only one query result is queued; a second database hit would fail.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![teacher.clone()]])
            .into_connection();
        let directory = DatabaseUserDirectory::new(
            Arc::new(db),
            Duration::from_secs(60),
            16,
            Arc::new(SystemClock),
        );
        let reference = UserRef::IdNumber("T-0007".to_string());

        let first = directory.resolve_user(&reference).await?;
        let second = directory.resolve_user(&reference).await?;

        assert_eq!(first, second);
        assert_eq!(second.map(|c| c.name), Some("Ada Reyes".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn missing_user_resolves_to_none() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<users::Model, Vec<users::Model>, _>(vec![vec![]])
            .into_connection();
        let directory = DatabaseUserDirectory::new(
            Arc::new(db),
            Duration::from_secs(60),
            16,
            Arc::new(SystemClock),
        );

        let found = directory.resolve_user(&UserRef::Id(Id::new_v4())).await?;

        assert!(found.is_none());
        Ok(())
    }
}

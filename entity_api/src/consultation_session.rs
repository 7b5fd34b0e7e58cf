//! CRUD operations for consultation_sessions table.

use super::error::{EntityApiErrorKind, Error};
use entity::consultation_sessions::{ActiveModel, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};

/// Scoring output written back onto a consultation session.
#[derive(Debug, Clone)]
pub struct QualityUpdate {
    pub quality_score: f64,
    pub quality_metrics: serde_json::Value,
    pub transcript: Option<String>,
    pub duration: Option<String>,
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| {
        debug!("Consultation session with id {id} not found");
        Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
    })
}

/// Stores a computed quality score and its metrics on an existing session.
///
/// Transcript and duration are only overwritten when the update carries a value,
/// so re-scoring a session never erases a previously captured transcript.
pub async fn update_quality(
    db: &DatabaseConnection,
    id: Id,
    update: QualityUpdate,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    debug!(
        "Updating quality score for consultation session {id}: {}",
        update.quality_score
    );

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        booking_id: Unchanged(existing.booking_id),
        transcript: Set(update.transcript.or(existing.transcript)),
        duration: Set(update.duration.or(existing.duration)),
        quality_score: Set(Some(update.quality_score)),
        quality_metrics: Set(Some(update.quality_metrics)),
        summary: Unchanged(existing.summary),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

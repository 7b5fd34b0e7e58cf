use crate::consultation_sessions::Model;
use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use crate::quality::{self, DurationInput, QualityMetrics, QualityScore};
use crate::Id;
use consultation_ai::traits::transcription::Provider;
use consultation_ai::types::transcription::{Config as TranscriptionConfig, Status};
use consultation_ai::Transcription;
use entity_api::consultation_session::{self, QualityUpdate};
use events::{DomainEvent, EventPublisher};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::consultation_session::find_by_id;

/// Scores a finished transcription.
///
/// The provider's measured audio length wins; `fallback_duration` (usually the
/// duration recorded with the session) is only used when the provider did not
/// report one.
pub fn assess(
    transcription: &Transcription,
    fallback_duration: Option<&DurationInput>,
) -> (QualityScore, QualityMetrics) {
    let measured = transcription.duration_seconds.map(DurationInput::Seconds);
    let duration = measured.as_ref().or(fallback_duration);

    quality::score(
        &transcription.sentiment_analysis,
        transcription.text.as_deref().unwrap_or_default(),
        duration,
    )
}

/// Submits a consultation recording for diarized, sentiment-annotated transcription.
pub async fn request_transcription(
    provider: &dyn Provider,
    media_url: &str,
) -> Result<Transcription, Error> {
    info!(
        "Requesting {} transcription for {media_url}",
        provider.provider_id()
    );
    let transcription = provider
        .create_transcription(TranscriptionConfig::for_consultation(media_url))
        .await?;
    debug!("Transcription {} is {:?}", transcription.id, transcription.status);
    Ok(transcription)
}

/// Fetches a completed transcription, scores it and stores score, metrics,
/// transcript and duration on the consultation session.
///
/// Fails with `TranscriptionUnavailable` while the provider is still working or
/// when the job failed; nothing is written in that case.
pub async fn score_transcription(
    db: &DatabaseConnection,
    provider: &dyn Provider,
    publisher: &EventPublisher,
    consultation_session_id: Id,
    transcription_id: &str,
) -> Result<Model, Error> {
    let session = consultation_session::find_by_id(db, consultation_session_id).await?;
    let transcription = provider.get_transcription(transcription_id).await?;

    if transcription.status != Status::Completed {
        warn!(
            "Transcription {transcription_id} for consultation session {consultation_session_id} is {:?}: {}",
            transcription.status,
            transcription.error_message.as_deref().unwrap_or("not finished")
        );
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::TranscriptionUnavailable),
        });
    }

    let recorded_duration = session.duration.clone().map(DurationInput::Text);
    let (quality_score, metrics) = assess(&transcription, recorded_duration.as_ref());
    if let Some(reason) = metrics.error() {
        warn!("Consultation session {consultation_session_id} could not be scored: {reason}");
    }

    let quality_metrics = metrics.to_json();
    let updated = consultation_session::update_quality(
        db,
        consultation_session_id,
        QualityUpdate {
            quality_score,
            quality_metrics: quality_metrics.clone(),
            transcript: transcription.text.clone(),
            duration: transcription.duration_seconds.map(format_duration),
        },
    )
    .await?;

    info!("Consultation session {consultation_session_id} scored {quality_score:.2}");

    publisher
        .publish(DomainEvent::ConsultationScored {
            consultation_session_id,
            quality_score,
            quality_metrics,
        })
        .await;

    Ok(updated)
}

/// `H:MM:SS`, the layout sessions store durations in.
fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

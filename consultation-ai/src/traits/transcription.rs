//! Transcription provider trait.

use crate::types::transcription::{Config, Transcription};
use crate::Error;
use async_trait::async_trait;

/// Abstraction for speech-to-text transcription services.
///
/// Implementations convert consultation audio to text with speaker diarization
/// and utterance-level sentiment analysis.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Start an async transcription job for the audio at `config.media_url`.
    ///
    /// Returns immediately with the job id; results are available through
    /// `get_transcription` once the job completes.
    async fn create_transcription(
        &self,
        config: Config,
    ) -> std::result::Result<Transcription, Error>;

    /// Retrieve transcription status and results by id.
    ///
    /// Utterances and sentiment are only populated once status is `Completed`.
    async fn get_transcription(
        &self,
        transcription_id: &str,
    ) -> std::result::Result<Transcription, Error>;

    /// Permanently delete a transcription from provider storage.
    async fn delete_transcription(&self, transcription_id: &str) -> std::result::Result<(), Error>;

    /// Lowercase identifier for this provider, e.g. "assemblyai".
    fn provider_id(&self) -> &str;

    /// Validate API credentials with a lightweight request.
    async fn verify_credentials(&self) -> std::result::Result<bool, Error>;
}

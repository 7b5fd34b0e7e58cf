//! AssemblyAI implementation of the transcription [`Provider`].
//!
//! Talks to the AssemblyAI v2 REST API to transcribe consultation recordings
//! with speaker diarization and utterance-level sentiment analysis.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use async_trait::async_trait;
use consultation_ai::traits::transcription::Provider;
use consultation_ai::types::transcription::{Config as TranscriptionConfig, Status, Utterance};
use consultation_ai::{Error as SpeechError, Sentiment, SentimentSegment, Transcription};
use log::*;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use service::config::Config;

const PROVIDER_ID: &str = "assemblyai";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Request to create a new transcription
#[derive(Debug, Serialize)]
struct CreateTranscriptRequest {
    audio_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook_url: Option<String>,
    speaker_labels: bool,
    sentiment_analysis: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_code: Option<String>,
}

impl From<TranscriptionConfig> for CreateTranscriptRequest {
    fn from(config: TranscriptionConfig) -> Self {
        Self {
            audio_url: config.media_url,
            webhook_url: config.webhook_url,
            speaker_labels: config.enable_speaker_labels,
            sentiment_analysis: config.enable_sentiment_analysis,
            language_code: config.language_code,
        }
    }
}

/// Transcript as returned by `POST /transcript` and `GET /transcript/{id}`
#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    id: String,
    status: TranscriptStatus,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    utterances: Option<Vec<UtteranceResult>>,
    #[serde(default)]
    sentiment_analysis_results: Option<Vec<SentimentResult>>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    audio_duration: Option<f64>,
    #[serde(default)]
    language_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl From<TranscriptStatus> for Status {
    fn from(status: TranscriptStatus) -> Self {
        match status {
            TranscriptStatus::Queued => Status::Queued,
            TranscriptStatus::Processing => Status::Processing,
            TranscriptStatus::Completed => Status::Completed,
            TranscriptStatus::Error => Status::Failed,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UtteranceResult {
    text: String,
    start: i64,
    end: i64,
    confidence: f64,
    speaker: String,
}

#[derive(Debug, Deserialize)]
struct SentimentResult {
    text: String,
    start: i64,
    end: i64,
    sentiment: Sentiment,
    confidence: f64,
    #[serde(default)]
    speaker: Option<String>,
}

impl From<TranscriptResponse> for Transcription {
    fn from(response: TranscriptResponse) -> Self {
        Transcription {
            id: response.id,
            status: response.status.into(),
            text: response.text,
            utterances: response
                .utterances
                .unwrap_or_default()
                .into_iter()
                .map(|u| Utterance {
                    text: u.text,
                    speaker: u.speaker,
                    start_ms: u.start,
                    end_ms: u.end,
                    confidence: u.confidence,
                })
                .collect(),
            sentiment_analysis: response
                .sentiment_analysis_results
                .unwrap_or_default()
                .into_iter()
                .map(|s| SentimentSegment {
                    text: s.text,
                    sentiment: s.sentiment,
                    confidence: s.confidence,
                    start_ms: Some(s.start),
                    end_ms: Some(s.end),
                    speaker: s.speaker,
                })
                .collect(),
            confidence: response.confidence,
            duration_seconds: response.audio_duration,
            language_code: response.language_code,
            error_message: response.error,
        }
    }
}

/// AssemblyAI API client
pub struct AssemblyAiProvider {
    client: reqwest::Client,
    base_url: String,
}

impl AssemblyAiProvider {
    /// Create a new AssemblyAI client with the given API key and base URL
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, SpeechError> {
        let mut headers = reqwest::header::HeaderMap::new();

        let mut header_value = reqwest::header::HeaderValue::from_str(api_key).map_err(|e| {
            warn!("Failed to create auth header: {:?}", e);
            SpeechError::Configuration("Invalid API key format".to_string())
        })?;
        header_value.set_sensitive(true);
        headers.insert("authorization", header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()
            .map_err(|e| SpeechError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds the provider from `ASSEMBLY_AI_API_KEY` / `ASSEMBLY_AI_BASE_URL`.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let api_key = config.assembly_ai_api_key().ok_or_else(|| {
            warn!("Failed to get AssemblyAI API key from config");
            Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            }
        })?;
        Ok(Self::new(&api_key, config.assembly_ai_base_url())?)
    }

    fn transcript_url(&self, transcript_id: Option<&str>) -> String {
        match transcript_id {
            Some(id) => format!("{}/transcript/{}", self.base_url, id),
            None => format!("{}/transcript", self.base_url),
        }
    }

    async fn read_transcript(
        &self,
        response: reqwest::Response,
    ) -> Result<TranscriptResponse, SpeechError> {
        let response = check_status(response).await?;
        response.json::<TranscriptResponse>().await.map_err(|e| {
            warn!("Failed to parse AssemblyAI response: {:?}", e);
            SpeechError::Deserialization(e.to_string())
        })
    }
}

fn network_error(context: &str, err: reqwest::Error) -> SpeechError {
    warn!("{context}: {:?}", err);
    SpeechError::Network(err.to_string())
}

/// Maps non-success responses onto provider-agnostic errors.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SpeechError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    let error_text = response.text().await.unwrap_or_default();
    error!("AssemblyAI API ({status}): {error_text}");

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SpeechError::Authentication(error_text),
        StatusCode::NOT_FOUND => SpeechError::NotFound(error_text),
        StatusCode::TOO_MANY_REQUESTS => SpeechError::RateLimited {
            retry_after_seconds: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        StatusCode::BAD_REQUEST => SpeechError::Configuration(error_text),
        _ => SpeechError::Provider(error_text),
    })
}

#[async_trait]
impl Provider for AssemblyAiProvider {
    async fn create_transcription(
        &self,
        config: TranscriptionConfig,
    ) -> Result<Transcription, SpeechError> {
        let request = CreateTranscriptRequest::from(config);
        debug!("Creating AssemblyAI transcript for audio: {}", request.audio_url);

        let response = self
            .client
            .post(self.transcript_url(None))
            .json(&request)
            .send()
            .await
            .map_err(|e| network_error("Failed to create AssemblyAI transcript", e))?;

        let transcript = self.read_transcript(response).await?;
        info!("Created AssemblyAI transcript with ID: {}", transcript.id);
        Ok(transcript.into())
    }

    async fn get_transcription(&self, transcription_id: &str) -> Result<Transcription, SpeechError> {
        let response = self
            .client
            .get(self.transcript_url(Some(transcription_id)))
            .send()
            .await
            .map_err(|e| network_error("Failed to get AssemblyAI transcript", e))?;

        Ok(self.read_transcript(response).await?.into())
    }

    async fn delete_transcription(&self, transcription_id: &str) -> Result<(), SpeechError> {
        let response = self
            .client
            .delete(self.transcript_url(Some(transcription_id)))
            .send()
            .await
            .map_err(|e| network_error("Failed to delete AssemblyAI transcript", e))?;

        check_status(response).await?;
        info!("Deleted AssemblyAI transcript: {}", transcription_id);
        Ok(())
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    async fn verify_credentials(&self) -> Result<bool, SpeechError> {
        let response = self
            .client
            .get(self.transcript_url(None))
            .send()
            .await
            .map_err(|e| network_error("Failed to verify AssemblyAI API key", e))?;

        // 200 lists transcripts, 401 means the key was rejected
        Ok(response.status().is_success())
    }
}

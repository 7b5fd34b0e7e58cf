//! Types for transcription operations.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Processing status of a speech-to-text transcription job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// Emotional tone label attached to an utterance.
///
/// Providers disagree on casing (`POSITIVE` vs `positive`), so labels are matched
/// case-insensitively. Any label outside the three known classes is kept verbatim
/// in `Other` rather than rejected; the quality scorer ignores such segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Other(String),
}

impl From<String> for Sentiment {
    fn from(label: String) -> Self {
        match label.to_ascii_uppercase().as_str() {
            "POSITIVE" => Sentiment::Positive,
            "NEUTRAL" => Sentiment::Neutral,
            "NEGATIVE" => Sentiment::Negative,
            _ => Sentiment::Other(label),
        }
    }
}

impl From<&str> for Sentiment {
    fn from(label: &str) -> Self {
        Sentiment::from(label.to_string())
    }
}

impl From<Sentiment> for String {
    fn from(sentiment: Sentiment) -> Self {
        match sentiment {
            Sentiment::Positive => "POSITIVE".to_string(),
            Sentiment::Neutral => "NEUTRAL".to_string(),
            Sentiment::Negative => "NEGATIVE".to_string(),
            Sentiment::Other(label) => label,
        }
    }
}

/// Utterance-level sentiment result.
///
/// Produced by the transcription provider and consumed read-only by the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSegment {
    pub text: String,
    pub sentiment: Sentiment,
    /// Provider confidence in the sentiment label, 0.0 - 1.0
    pub confidence: f64,
    #[serde(default, alias = "start")]
    pub start_ms: Option<i64>,
    #[serde(default, alias = "end")]
    pub end_ms: Option<i64>,
    #[serde(default)]
    pub speaker: Option<String>,
}

impl SentimentSegment {
    pub fn new(text: impl Into<String>, sentiment: Sentiment, confidence: f64) -> Self {
        Self {
            text: text.into(),
            sentiment,
            confidence,
            start_ms: None,
            end_ms: None,
            speaker: None,
        }
    }
}

/// Continuous speech from a single speaker, as produced by diarization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub speaker: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub confidence: f64,
}

/// Complete transcription with speech-to-text results and sentiment.
///
/// Only `id` and `status` are meaningful until `status` is `Completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub id: String,
    pub status: Status,
    pub text: Option<String>,
    #[serde(default)]
    pub utterances: Vec<Utterance>,
    #[serde(default)]
    pub sentiment_analysis: Vec<SentimentSegment>,
    pub confidence: Option<f64>,
    pub duration_seconds: Option<f64>,
    pub language_code: Option<String>,
    pub error_message: Option<String>,
}

impl Transcription {
    /// Number of distinct diarized speakers.
    pub fn speaker_count(&self) -> usize {
        let mut speakers: Vec<&str> = self.utterances.iter().map(|u| u.speaker.as_str()).collect();
        speakers.sort_unstable();
        speakers.dedup();
        speakers.len()
    }
}

/// Configuration for creating a transcription job.
#[derive(Debug, Clone)]
pub struct Config {
    pub media_url: String,
    pub webhook_url: Option<String>,
    pub enable_speaker_labels: bool,
    pub enable_sentiment_analysis: bool,
    pub language_code: Option<String>,
    pub provider_options: HashMap<String, String>,
}

impl Config {
    /// Diarized transcription with sentiment, the combination quality scoring needs.
    pub fn for_consultation(media_url: impl Into<String>) -> Self {
        Self {
            media_url: media_url.into(),
            webhook_url: None,
            enable_speaker_labels: true,
            enable_sentiment_analysis: true,
            language_code: None,
            provider_options: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sentiment_labels_are_case_insensitive() {
        assert_eq!(Sentiment::from("positive"), Sentiment::Positive);
        assert_eq!(Sentiment::from("NEGATIVE"), Sentiment::Negative);
        assert_eq!(Sentiment::from("Neutral"), Sentiment::Neutral);
    }

    #[test]
    fn unknown_sentiment_labels_are_preserved() {
        let segment: SentimentSegment = serde_json::from_value(json!({
            "text": "hmm",
            "sentiment": "MIXED",
            "confidence": 0.4
        }))
        .unwrap();

        assert_eq!(segment.sentiment, Sentiment::Other("MIXED".to_string()));
        assert_eq!(segment.start_ms, None);
    }

    #[test]
    fn segment_accepts_provider_timestamp_names() {
        let segment: SentimentSegment = serde_json::from_value(json!({
            "text": "Thank you, that helps a lot.",
            "sentiment": "POSITIVE",
            "confidence": 0.93,
            "start": 1200,
            "end": 2650,
            "speaker": "B"
        }))
        .unwrap();

        assert_eq!(segment.start_ms, Some(1200));
        assert_eq!(segment.end_ms, Some(2650));
        assert_eq!(segment.speaker.as_deref(), Some("B"));
    }

    #[test]
    fn speaker_count_counts_distinct_labels() {
        let utterance = |speaker: &str| Utterance {
            text: "ok".to_string(),
            speaker: speaker.to_string(),
            start_ms: 0,
            end_ms: 10,
            confidence: 0.9,
        };
        let transcription = Transcription {
            id: "t1".to_string(),
            status: Status::Completed,
            text: None,
            utterances: vec![utterance("A"), utterance("B"), utterance("A")],
            sentiment_analysis: vec![],
            confidence: None,
            duration_seconds: None,
            language_code: None,
            error_message: None,
        };

        assert_eq!(transcription.speaker_count(), 2);
    }
}

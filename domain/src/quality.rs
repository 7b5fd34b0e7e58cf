//! Consultation quality scoring.
//!
//! Turns the utterance-level sentiment of a transcribed consultation into a
//! single score in `[0, 1]`:
//!
//! ```text
//! base       = 0.7 * positivity_ratio + 0.3 * (1 - negativity_ratio)
//! confidence = average confidence of POSITIVE segments (0.5 when there are none)
//! score      = clamp(base * confidence * duration_factor, 0, 1)
//! ```
//!
//! The duration factor rewards consultations between 10 and 30 minutes and
//! discounts very short or very long ones. Scoring is a pure function: no I/O,
//! no clock, no shared state.

use consultation_ai::{Sentiment, SentimentSegment};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A consultation quality score. Always within `[0.0, 1.0]`.
pub type QualityScore = f64;

const SHORT_SESSION_SECS: f64 = 180.0;
const MIN_IDEAL_SECS: f64 = 600.0;
const MAX_IDEAL_SECS: f64 = 1800.0;
const MAX_PENALIZED_EXCESS_SECS: f64 = 1800.0;

const POSITIVITY_WEIGHT: f64 = 0.7;
const NON_NEGATIVITY_WEIGHT: f64 = 0.3;
const DEFAULT_CONFIDENCE_FACTOR: f64 = 0.5;

pub const NO_SENTIMENT_DATA: &str = "no sentiment data";
pub const NO_VALID_SENTIMENTS: &str = "no valid sentiments";

/// Recording duration as captured upstream: raw seconds, or text such as
/// `"900"`, `"15:00"` or `"0:15:00"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Seconds(f64),
    Text(String),
}

impl From<f64> for DurationInput {
    fn from(seconds: f64) -> Self {
        DurationInput::Seconds(seconds)
    }
}

impl From<i64> for DurationInput {
    fn from(seconds: i64) -> Self {
        DurationInput::Seconds(seconds as f64)
    }
}

impl From<&str> for DurationInput {
    fn from(text: &str) -> Self {
        DurationInput::Text(text.to_string())
    }
}

impl From<String> for DurationInput {
    fn from(text: String) -> Self {
        DurationInput::Text(text)
    }
}

impl DurationInput {
    /// Duration in seconds, or `None` when the value cannot be interpreted.
    pub fn seconds(&self) -> Option<f64> {
        let seconds = match self {
            DurationInput::Seconds(seconds) => *seconds,
            DurationInput::Text(text) => parse_duration_text(text)?,
        };
        (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
    }
}

fn parse_duration_text(text: &str) -> Option<f64> {
    let text = text.trim();
    if !text.contains(':') {
        return text.parse::<f64>().ok();
    }

    let parts = text
        .split(':')
        .map(|part| part.trim().parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;

    match parts.as_slice() {
        [hours, minutes, seconds] => Some(hours * 3600.0 + minutes * 60.0 + seconds),
        [minutes, seconds] => Some(minutes * 60.0 + seconds),
        _ => None,
    }
}

/// Multiplier applied for the consultation's length.
///
/// | length          | factor                          |
/// |-----------------|---------------------------------|
/// | < 3 min         | 0.3 rising linearly to 0.5      |
/// | 3 – 10 min      | 0.5 rising linearly to 1.0      |
/// | 10 – 30 min     | 1.0                             |
/// | > 30 min        | 1.0 falling to 0.8 at 60+ min   |
pub fn duration_factor(duration_seconds: f64) -> f64 {
    if duration_seconds < SHORT_SESSION_SECS {
        0.3 + 0.2 * duration_seconds / SHORT_SESSION_SECS
    } else if duration_seconds < MIN_IDEAL_SECS {
        0.5 + 0.5 * (duration_seconds - SHORT_SESSION_SECS) / (MIN_IDEAL_SECS - SHORT_SESSION_SECS)
    } else if duration_seconds > MAX_IDEAL_SECS {
        let excess = (duration_seconds - MAX_IDEAL_SECS).min(MAX_PENALIZED_EXCESS_SECS);
        1.0 - 0.2 * excess / MAX_PENALIZED_EXCESS_SECS
    } else {
        1.0
    }
}

/// Per-class values (percentages or averages) for the three sentiment classes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// Breakdown of a successful score. Every field except the score returned
/// alongside it is rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMetrics {
    /// Share of segments per class, in percent with one decimal.
    pub sentiment_distribution: SentimentBreakdown,
    pub average_confidence: SentimentBreakdown,
    pub positivity_ratio: f64,
    pub negativity_ratio: f64,
    /// `None` (serialized as `"N/A"`) when no usable duration was supplied.
    #[serde(
        serialize_with = "serialize_duration_factor",
        deserialize_with = "deserialize_duration_factor"
    )]
    pub duration_factor: Option<f64>,
    pub base_score: f64,
    pub confidence_factor: f64,
    pub final_score: f64,
    pub segments_scored: usize,
}

/// Stored next to a consultation session as an opaque JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QualityMetrics {
    Scored(ScoredMetrics),
    Unscored { error: String },
}

impl QualityMetrics {
    fn unscored(reason: &str) -> Self {
        QualityMetrics::Unscored {
            error: reason.to_string(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QualityMetrics::Unscored { error } => Some(error),
            QualityMetrics::Scored(_) => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}

fn serialize_duration_factor<S: Serializer>(
    factor: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match factor {
        Some(factor) => serializer.serialize_f64(*factor),
        None => serializer.serialize_str("N/A"),
    }
}

fn deserialize_duration_factor<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Factor(f64),
        NotApplicable(String),
    }

    Ok(match Stored::deserialize(deserializer)? {
        Stored::Factor(factor) => Some(factor),
        Stored::NotApplicable(_) => None,
    })
}

#[derive(Default)]
struct Tally {
    counts: [usize; 3],
    confidence_sums: [f64; 3],
}

impl Tally {
    const POSITIVE: usize = 0;
    const NEUTRAL: usize = 1;
    const NEGATIVE: usize = 2;

    fn from_segments(segments: &[SentimentSegment]) -> Self {
        let mut tally = Tally::default();
        for segment in segments {
            let class = match segment.sentiment {
                Sentiment::Positive => Self::POSITIVE,
                Sentiment::Neutral => Self::NEUTRAL,
                Sentiment::Negative => Self::NEGATIVE,
                Sentiment::Other(_) => continue,
            };
            tally.counts[class] += 1;
            tally.confidence_sums[class] += segment.confidence;
        }
        tally
    }

    fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    fn ratio(&self, class: usize) -> f64 {
        self.counts[class] as f64 / self.total() as f64
    }

    fn average_confidence(&self, class: usize) -> Option<f64> {
        (self.counts[class] > 0).then(|| self.confidence_sums[class] / self.counts[class] as f64)
    }

    fn breakdown(&self, value: impl Fn(usize) -> f64) -> SentimentBreakdown {
        SentimentBreakdown {
            positive: value(Self::POSITIVE),
            neutral: value(Self::NEUTRAL),
            negative: value(Self::NEGATIVE),
        }
    }
}

/// Scores a consultation from its sentiment segments and duration.
///
/// `transcript_text` is accepted so callers can hand over everything the
/// transcription produced, but it does not influence the score.
///
/// Never fails: empty or unusable sentiment input yields `0.0` with an
/// `Unscored` metrics record, and an unparseable duration leaves the duration
/// factor at 1.0.
pub fn score(
    segments: &[SentimentSegment],
    _transcript_text: &str,
    duration: Option<&DurationInput>,
) -> (QualityScore, QualityMetrics) {
    if segments.is_empty() {
        return (0.0, QualityMetrics::unscored(NO_SENTIMENT_DATA));
    }

    let tally = Tally::from_segments(segments);
    if tally.total() == 0 {
        return (0.0, QualityMetrics::unscored(NO_VALID_SENTIMENTS));
    }

    let positivity_ratio = tally.ratio(Tally::POSITIVE);
    let negativity_ratio = tally.ratio(Tally::NEGATIVE);

    let applied_duration_factor = duration
        .and_then(DurationInput::seconds)
        .map(duration_factor);

    let base_score =
        POSITIVITY_WEIGHT * positivity_ratio + NON_NEGATIVITY_WEIGHT * (1.0 - negativity_ratio);
    let confidence_factor = tally
        .average_confidence(Tally::POSITIVE)
        .unwrap_or(DEFAULT_CONFIDENCE_FACTOR);

    let raw = base_score * confidence_factor * applied_duration_factor.unwrap_or(1.0);
    let quality_score = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };

    let metrics = ScoredMetrics {
        sentiment_distribution: tally.breakdown(|class| round_to(tally.ratio(class) * 100.0, 1)),
        average_confidence: tally
            .breakdown(|class| round_to(tally.average_confidence(class).unwrap_or(0.0), 2)),
        positivity_ratio: round_to(positivity_ratio, 2),
        negativity_ratio: round_to(negativity_ratio, 2),
        duration_factor: applied_duration_factor.map(|factor| round_to(factor, 2)),
        base_score: round_to(base_score, 2),
        confidence_factor: round_to(confidence_factor, 2),
        final_score: round_to(quality_score, 2),
        segments_scored: tally.total(),
    };

    (quality_score, QualityMetrics::Scored(metrics))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

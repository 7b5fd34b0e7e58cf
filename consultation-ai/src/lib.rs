//! Speech AI abstraction layer for consultation recordings.
//!
//! Provides a provider-agnostic view of speech-to-text with speaker diarization
//! and utterance-level sentiment analysis. The scoring pipeline only ever sees
//! these types, so a different vendor (AssemblyAI, Deepgram, Whisper) can be
//! swapped in without touching the scorer.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::transcription::{Sentiment, SentimentSegment, Transcription};

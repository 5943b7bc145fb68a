//! audioscribe - chunked transcription of long-form audio
//!
//! Splits audiobooks, lectures and voice messages into bounded chunks,
//! transcribes them in parallel against hosted speech-to-text providers with
//! automatic fallback, and reassembles one ordered transcript. Short clips
//! and playback-window requests skip chunking for a single direct call.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod pipeline;
pub mod provider;

// Core traits (probe → plan → dispatch → assemble)
pub use audio::extract::{FfmpegExtractor, MockExtractor, SegmentExtractor, SegmentFile};
pub use audio::probe::{AudioProbe, FfprobeProbe, MockProbe};
pub use provider::transcriber::{
    MockProvider, SpeechProvider, Task, TranscribeOptions, Transcription, WordSpan,
};
pub use provider::{ProviderKind, resolve_order, transcribe_with_fallback};

// Pipeline
pub use pipeline::orchestrator::{
    ProviderStatus, TranscriptionPipeline, TranscriptionRequest, WindowRequest,
};
pub use pipeline::{ChunkPlan, ChunkSpec, TimeWindow, TranscriptOutput, TranscriptionMode};

// Error handling
pub use error::{AudioscribeError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

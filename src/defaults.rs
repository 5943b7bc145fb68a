//! Default configuration constants for audioscribe.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default chunk duration in seconds for long-form audio.
///
/// 120 seconds keeps each sub-request comfortably under provider duration/size
/// limits while amortizing per-request overhead (extraction + network round-trip).
pub const CHUNK_SIZE_SECS: u32 = 120;

/// Default overlap between consecutive chunks in seconds.
///
/// One second of duplicated audio avoids losing words cut at a chunk boundary
/// without inflating the number of chunks noticeably.
pub const OVERLAP_SECS: u32 = 1;

/// Smallest accepted chunk size in seconds.
pub const MIN_CHUNK_SIZE_SECS: u32 = 10;

/// Largest accepted chunk size in seconds.
pub const MAX_CHUNK_SIZE_SECS: u32 = 300;

/// Default number of chunk transcriptions in flight at once.
///
/// Bounded to respect provider rate limits and to avoid saturating the
/// extraction toolchain. Chunks beyond the limit queue until a slot frees.
pub const CONCURRENCY: usize = 3;

/// Duration threshold in seconds below which chunking is skipped entirely.
///
/// For short clips a single direct provider call beats the overhead of
/// extraction plus multiple network round-trips.
pub const FAST_PATH_THRESHOLD_SECS: u32 = 300;

/// Half-window in seconds for playback-position ("windowed") transcription.
pub const WINDOW_HALF_SECS: f64 = 120.0;

/// Per-call provider timeout in seconds.
///
/// Applies independently to each chunk; one chunk timing out never cancels
/// sibling in-flight chunks.
pub const PROVIDER_TIMEOUT_SECS: u64 = 60;

/// Language value that requests automatic language detection.
///
/// When set, no language field is sent to the provider at all.
pub const AUTO_LANGUAGE: &str = "auto";

/// Audio container extensions accepted by the pipeline.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["mp3", "wav", "webm", "m4a", "ogg"];

/// Default provider tried first when no preference is given.
pub const PREFERRED_PROVIDER: &str = "groq";

/// Groq OpenAI-compatible transcription endpoint.
pub const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/audio/transcriptions";

/// OpenAI transcription endpoint.
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Whisper model served by Groq.
pub const GROQ_MODEL: &str = "whisper-large-v3-turbo";

/// Whisper model served by OpenAI.
pub const OPENAI_MODEL: &str = "whisper-1";

/// Quality prompt sent along with transcribe-task requests.
pub const TRANSCRIPTION_PROMPT: &str = "This is a transcription of audio content.";

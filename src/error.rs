//! Error types for audioscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioscribeError {
    // Configuration errors — rejected before any work is dispatched
    #[error("Unsupported audio format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("Invalid chunking parameters: {message}")]
    InvalidChunking { message: String },

    #[error("No transcription provider available — configure GROQ_API_KEY or OPENAI_API_KEY")]
    NoProviderAvailable,

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Probe errors — fatal for the request, chunk planning cannot proceed
    #[error("Audio probe failed: {message}")]
    Probe { message: String },

    // Chunk-level errors — recovered via provider fallback, never job-fatal
    #[error("Segment extraction failed: {message}")]
    Extraction { message: String },

    #[error("{provider} API error: {message}")]
    Provider {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    #[error("{provider} request timed out after {seconds}s")]
    Timeout { provider: String, seconds: u64 },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioscribeError {
    /// Whether a retry against the same provider could plausibly succeed.
    ///
    /// Rate limits, server-side failures and timeouts are transient; bad
    /// credentials or unsupported payloads are not. The dispatcher's fallback
    /// policy does not branch on this, but callers deciding whether to retry
    /// a whole job can.
    pub fn is_transient(&self) -> bool {
        match self {
            AudioscribeError::Provider { status, .. } => {
                matches!(status, Some(429) | Some(500..=599) | None)
            }
            AudioscribeError::Timeout { .. } => true,
            _ => false,
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, AudioscribeError>;

use crate::defaults;
use crate::error::{AudioscribeError, Result};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What the provider should do with the audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Task {
    #[default]
    Transcribe,
    Translate,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Transcribe => "transcribe",
            Task::Translate => "translate",
        }
    }
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "transcribe" => Ok(Task::Transcribe),
            "translate" => Ok(Task::Translate),
            other => Err(format!("unknown task: {other}")),
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call options passed through to a provider.
#[derive(Debug, Clone)]
pub struct TranscribeOptions {
    /// File name reported to the provider (drives format detection server-side)
    pub file_name: String,
    /// ISO language code, or "auto" to omit the language field entirely
    pub language: String,
    pub task: Task,
    /// Request word-level timestamps (verbose response) for window filtering
    pub word_timestamps: bool,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self {
            file_name: "audio.mp3".to_string(),
            language: defaults::AUTO_LANGUAGE.to_string(),
            task: Task::Transcribe,
            word_timestamps: false,
        }
    }
}

/// One recognized word with its time offsets in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct WordSpan {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// A provider's answer for one audio payload.
#[derive(Debug, Clone, Default)]
pub struct Transcription {
    pub text: String,
    /// Empty unless word timestamps were requested and returned
    pub words: Vec<WordSpan>,
}

/// Trait for hosted speech-to-text backends.
///
/// This trait allows swapping implementations (real HTTP clients vs mock).
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Stable provider identifier ("groq", "openai")
    fn name(&self) -> &str;

    /// Model the provider runs
    fn model(&self) -> &str;

    /// Whether credentials are configured. Pure function of configuration,
    /// never a network call.
    fn is_available(&self) -> bool;

    /// Transcribe one audio payload to text.
    async fn transcribe(&self, audio: &[u8], options: &TranscribeOptions) -> Result<Transcription>;
}

/// Mock provider for testing
#[derive(Debug, Clone)]
pub struct MockProvider {
    name: String,
    model: String,
    response: String,
    words: Vec<WordSpan>,
    available: bool,
    should_fail: bool,
    echo: bool,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new mock provider with default settings
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            model: "mock-whisper".to_string(),
            response: "mock transcription".to_string(),
            words: Vec::new(),
            available: true,
            should_fail: false,
            echo: false,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to echo the audio payload back as UTF-8 text
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    /// Configure the mock to return word-level timestamps
    pub fn with_words(mut self, words: Vec<WordSpan>) -> Self {
        self.words = words;
        self
    }

    /// Configure the mock to fail every call
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the mock to report no credentials
    pub fn with_unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Configure the mock to sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Total number of transcribe calls observed
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously in-flight transcribe calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn transcribe(&self, audio: &[u8], _options: &TranscribeOptions) -> Result<Transcription> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.should_fail {
            return Err(AudioscribeError::Provider {
                provider: self.name.clone(),
                status: Some(500),
                message: "mock transcription failure".to_string(),
            });
        }

        let text = if self.echo {
            String::from_utf8_lossy(audio).trim().to_string()
        } else {
            self.response.clone()
        };

        Ok(Transcription {
            text,
            words: self.words.clone(),
        })
    }
}

//! Speech-recognition provider clients.
//!
//! A closed set of interchangeable hosted backends behind one capability
//! trait, selected through an explicit ordered list so fallback order stays
//! visible and typed.

pub mod groq;
pub mod openai;
pub mod transcriber;

use crate::error::{AudioscribeError, Result};
use crate::provider::transcriber::{SpeechProvider, TranscribeOptions, Transcription, WordSpan};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// The providers this crate knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Groq,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "groq",
            ProviderKind::OpenAi => "openai",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "groq" => Ok(ProviderKind::Groq),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response body shared by the OpenAI-compatible transcription endpoints.
///
/// `words` is only populated for `verbose_json` responses with word-level
/// timestamp granularity.
#[derive(Debug, Deserialize)]
pub(crate) struct TranscriptionPayload {
    #[serde(default)]
    text: String,
    #[serde(default)]
    words: Vec<WordPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WordPayload {
    word: String,
    start: f64,
    end: f64,
}

impl From<TranscriptionPayload> for Transcription {
    fn from(payload: TranscriptionPayload) -> Self {
        Transcription {
            text: payload.text.trim().to_string(),
            words: payload
                .words
                .into_iter()
                .map(|w| WordSpan {
                    word: w.word,
                    start: w.start,
                    end: w.end,
                })
                .collect(),
        }
    }
}

/// Order providers by preference and drop the unavailable ones.
///
/// The preferred provider (when named and configured) moves to the front;
/// the rest keep their construction order as fallbacks. An empty result is
/// a configuration error, reported before any chunk work starts.
pub fn resolve_order(
    providers: &[Arc<dyn SpeechProvider>],
    preference: Option<ProviderKind>,
) -> Result<Vec<Arc<dyn SpeechProvider>>> {
    let mut order: Vec<Arc<dyn SpeechProvider>> = providers.to_vec();
    if let Some(preferred) = preference {
        order.sort_by_key(|p| if p.name() == preferred.as_str() { 0 } else { 1 });
    }

    let available: Vec<Arc<dyn SpeechProvider>> =
        order.into_iter().filter(|p| p.is_available()).collect();

    if available.is_empty() {
        return Err(AudioscribeError::NoProviderAvailable);
    }
    Ok(available)
}

/// Run one transcription against an ordered provider list.
///
/// Each attempt carries its own timeout; any provider error, transport fault
/// or timeout falls through to the next provider in the order. Returns the
/// transcription together with the provider that produced it.
pub async fn transcribe_with_fallback(
    providers: &[Arc<dyn SpeechProvider>],
    audio: &[u8],
    options: &TranscribeOptions,
    call_timeout: Duration,
) -> Result<(Transcription, Arc<dyn SpeechProvider>)> {
    let mut last_error = None;

    for provider in providers {
        if !provider.is_available() {
            continue;
        }

        match tokio::time::timeout(call_timeout, provider.transcribe(audio, options)).await {
            Ok(Ok(transcription)) => {
                tracing::debug!(provider = provider.name(), "transcription succeeded");
                return Ok((transcription, Arc::clone(provider)));
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    provider = provider.name(),
                    error = %e,
                    "provider attempt failed, trying next"
                );
                last_error = Some(e);
            }
            Err(_) => {
                let e = AudioscribeError::Timeout {
                    provider: provider.name().to_string(),
                    seconds: call_timeout.as_secs(),
                };
                tracing::warn!(provider = provider.name(), error = %e, "provider attempt timed out");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(AudioscribeError::NoProviderAvailable))
}

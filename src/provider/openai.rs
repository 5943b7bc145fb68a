//! OpenAI Whisper client.

use crate::audio;
use crate::defaults;
use crate::error::{AudioscribeError, Result};
use crate::provider::TranscriptionPayload;
use crate::provider::transcriber::{SpeechProvider, Task, TranscribeOptions, Transcription};
use async_trait::async_trait;
use reqwest::multipart;

pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: defaults::OPENAI_ENDPOINT.to_string(),
            api_key,
            model: defaults::OPENAI_MODEL.to_string(),
        }
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

#[async_trait]
impl SpeechProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    async fn transcribe(&self, audio: &[u8], options: &TranscribeOptions) -> Result<Transcription> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AudioscribeError::Provider {
                provider: "openai".to_string(),
                status: None,
                message: "API key not configured".to_string(),
            })?;

        let file_part = multipart::Part::bytes(audio.to_vec())
            .file_name(options.file_name.clone())
            .mime_str(audio::mime_for(&options.file_name))
            .map_err(|e| AudioscribeError::Provider {
                provider: "openai".to_string(),
                status: None,
                message: format!("mime: {e}"),
            })?;

        let mut form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone());

        if options.word_timestamps {
            form = form
                .text("response_format", "verbose_json")
                .text("timestamp_granularities[]", "word");
        } else {
            form = form.text("response_format", "json");
        }
        if options.language != defaults::AUTO_LANGUAGE {
            form = form.text("language", options.language.clone());
        }
        if options.task == Task::Transcribe {
            form = form.text("prompt", defaults::TRANSCRIPTION_PROMPT);
        }

        tracing::debug!(endpoint = %self.endpoint, file = %options.file_name, "sending audio to OpenAI");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AudioscribeError::Provider {
                provider: "openai".to_string(),
                status: None,
                message: format!("request: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AudioscribeError::Provider {
                provider: "openai".to_string(),
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let payload: TranscriptionPayload =
            response
                .json()
                .await
                .map_err(|e| AudioscribeError::Provider {
                    provider: "openai".to_string(),
                    status: None,
                    message: format!("parse response: {e}"),
                })?;

        Ok(payload.into())
    }
}

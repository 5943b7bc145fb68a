//! Pipeline entry points: whole-file and windowed transcription.
//!
//! Owns the fast-path decision and wires the probe, extractor, dispatcher
//! and providers together. Constructed once from configuration and shared by
//! reference; there is no process-wide state.

use crate::audio;
use crate::audio::extract::{FfmpegExtractor, SegmentExtractor};
use crate::audio::probe::{AudioProbe, FfprobeProbe};
use crate::config::{ChunkingConfig, Config, RequestConfig};
use crate::defaults;
use crate::error::Result;
use crate::pipeline::assembler::{TranscriptOutput, TranscriptionMode, assemble};
use crate::pipeline::dispatcher::Dispatcher;
use crate::pipeline::planner::{self, ChunkPlan, playback_window};
use crate::pipeline::window::filter_words;
use crate::provider::groq::GroqProvider;
use crate::provider::openai::OpenAiProvider;
use crate::provider::transcriber::{SpeechProvider, Task, TranscribeOptions};
use crate::provider::{ProviderKind, resolve_order, transcribe_with_fallback};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Whether a clip is short enough to skip chunking entirely.
pub fn should_fast_path(duration_secs: f64, threshold_secs: u32) -> bool {
    duration_secs <= f64::from(threshold_secs)
}

/// A whole-file transcription request.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub path: PathBuf,
    pub chunk_size_secs: u32,
    pub overlap_secs: u32,
    /// ISO code, or "auto" for provider-side detection
    pub language: String,
    pub task: Task,
    /// Provider tried first; falls back to the configured preference
    pub provider: Option<ProviderKind>,
    /// Allow the fast path for short clips
    pub fast_mode: bool,
}

impl TranscriptionRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_size_secs: defaults::CHUNK_SIZE_SECS,
            overlap_secs: defaults::OVERLAP_SECS,
            language: defaults::AUTO_LANGUAGE.to_string(),
            task: Task::Transcribe,
            provider: None,
            fast_mode: true,
        }
    }
}

/// An interactive request for the audio around a playback position.
#[derive(Debug, Clone)]
pub struct WindowRequest {
    pub path: PathBuf,
    /// Playback position in seconds
    pub position_secs: f64,
    /// Half-window override; the configured default when `None`
    pub half_window_secs: Option<f64>,
    pub language: String,
    pub task: Task,
    pub provider: Option<ProviderKind>,
}

impl WindowRequest {
    pub fn new(path: impl Into<PathBuf>, position_secs: f64) -> Self {
        Self {
            path: path.into(),
            position_secs,
            half_window_secs: None,
            language: defaults::AUTO_LANGUAGE.to_string(),
            task: Task::Transcribe,
            provider: None,
        }
    }
}

/// Availability of one configured provider.
#[derive(Debug, Clone)]
pub struct ProviderStatus {
    pub name: String,
    pub model: String,
    pub available: bool,
}

/// The chunked transcription pipeline.
pub struct TranscriptionPipeline {
    chunking: ChunkingConfig,
    request: RequestConfig,
    preferred: Option<ProviderKind>,
    probe: Arc<dyn AudioProbe>,
    extractor: Arc<dyn SegmentExtractor>,
    providers: Vec<Arc<dyn SpeechProvider>>,
}

impl TranscriptionPipeline {
    /// Build a pipeline with real ffprobe/ffmpeg tooling and HTTP providers.
    pub fn new(config: &Config) -> Self {
        let providers: Vec<Arc<dyn SpeechProvider>> = vec![
            Arc::new(GroqProvider::new(config.providers.groq_api_key.clone())),
            Arc::new(OpenAiProvider::new(config.providers.openai_api_key.clone())),
        ];

        Self {
            chunking: config.chunking.clone(),
            request: config.request.clone(),
            preferred: config.preferred_provider(),
            probe: Arc::new(FfprobeProbe::new()),
            extractor: Arc::new(FfmpegExtractor::new()),
            providers,
        }
    }

    /// Sets a custom probe (for deterministic testing).
    pub fn with_probe(mut self, probe: Arc<dyn AudioProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Sets a custom segment extractor (for deterministic testing).
    pub fn with_extractor(mut self, extractor: Arc<dyn SegmentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replaces the provider set.
    pub fn with_providers(mut self, providers: Vec<Arc<dyn SpeechProvider>>) -> Self {
        self.providers = providers;
        self
    }

    /// Availability of every configured provider, credentials only.
    pub fn provider_availability(&self) -> Vec<ProviderStatus> {
        self.providers
            .iter()
            .map(|p| ProviderStatus {
                name: p.name().to_string(),
                model: p.model().to_string(),
                available: p.is_available(),
            })
            .collect()
    }

    fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.request.timeout_secs)
    }

    /// Transcribe a whole audio file.
    ///
    /// Short clips (at most the fast-path threshold) go through a single
    /// direct provider call; everything longer is chunked, dispatched under
    /// the concurrency cap and reassembled in order. Partial chunk failures
    /// degrade the transcript and surface in `failed_count` instead of
    /// failing the job.
    pub async fn transcribe(&self, request: TranscriptionRequest) -> Result<TranscriptOutput> {
        let started = Instant::now();

        audio::validate_extension(&request.path)?;
        planner::validate_chunking(request.chunk_size_secs, request.overlap_secs)?;
        let order = resolve_order(&self.providers, request.provider.or(self.preferred))?;

        let duration = self.probe.duration_secs(&request.path).await?;
        tracing::info!(
            path = %request.path.display(),
            duration,
            "starting transcription job"
        );

        let options = TranscribeOptions {
            file_name: file_name_of(&request.path),
            language: request.language.clone(),
            task: request.task,
            word_timestamps: false,
        };

        if request.fast_mode && should_fast_path(duration, self.chunking.fast_path_threshold_secs) {
            tracing::info!("using fast path for short audio");
            return self
                .direct_call(&request.path, duration, &order, &options, started)
                .await;
        }

        let plan = ChunkPlan::build(
            duration,
            f64::from(request.chunk_size_secs),
            f64::from(request.overlap_secs),
        )?;
        tracing::info!(chunks = plan.len(), "dispatching chunked transcription");

        let dispatcher = Dispatcher::new(self.chunking.concurrency, self.call_timeout());
        let job = dispatcher
            .dispatch(
                &request.path,
                &plan,
                Arc::clone(&self.extractor),
                &order,
                &options,
                duration,
            )
            .await?;

        let output = assemble(&job, order[0].name(), order[0].model(), started.elapsed());
        tracing::info!(
            chunks = output.chunk_count,
            failed = output.failed_count,
            seconds = output.processing_time_seconds,
            "transcription job finished"
        );
        Ok(output)
    }

    /// Transcribe the audio around a playback position.
    ///
    /// Always a single provider call. The provider is asked for word-level
    /// timestamps and the result is filtered to words starting inside the
    /// window; when the provider returns no word timings, the full text of
    /// the call stands in.
    pub async fn transcribe_window(&self, request: WindowRequest) -> Result<TranscriptOutput> {
        let started = Instant::now();

        audio::validate_extension(&request.path)?;
        let order = resolve_order(&self.providers, request.provider.or(self.preferred))?;

        let duration = self.probe.duration_secs(&request.path).await?;
        let half_window = request
            .half_window_secs
            .unwrap_or(self.request.window_half_secs);
        let window = playback_window(duration, request.position_secs, half_window);
        tracing::info!(
            path = %request.path.display(),
            position = request.position_secs,
            window_start = window.start,
            window_end = window.end,
            "starting windowed transcription"
        );

        let options = TranscribeOptions {
            file_name: file_name_of(&request.path),
            language: request.language.clone(),
            task: request.task,
            word_timestamps: true,
        };

        let audio_bytes = tokio::fs::read(&request.path).await?;
        let (transcription, provider) =
            transcribe_with_fallback(&order, &audio_bytes, &options, self.call_timeout()).await?;

        let transcript = if transcription.words.is_empty() {
            transcription.text
        } else {
            filter_words(&transcription.words, &window)
        };

        Ok(TranscriptOutput {
            transcript,
            total_duration: duration,
            chunk_count: 1,
            chunks_processed: 1,
            failed_count: 0,
            service_used: provider.name().to_string(),
            model: provider.model().to_string(),
            processing_time_seconds: started.elapsed().as_secs_f64(),
            mode: TranscriptionMode::Fast,
        })
    }

    async fn direct_call(
        &self,
        path: &Path,
        duration: f64,
        order: &[Arc<dyn SpeechProvider>],
        options: &TranscribeOptions,
        started: Instant,
    ) -> Result<TranscriptOutput> {
        let audio_bytes = tokio::fs::read(path).await?;
        let (transcription, provider) =
            transcribe_with_fallback(order, &audio_bytes, options, self.call_timeout()).await?;

        Ok(TranscriptOutput {
            transcript: transcription.text,
            total_duration: duration,
            chunk_count: 1,
            chunks_processed: 1,
            failed_count: 0,
            service_used: provider.name().to_string(),
            model: provider.model().to_string(),
            processing_time_seconds: started.elapsed().as_secs_f64(),
            mode: TranscriptionMode::Fast,
        })
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio.mp3".to_string())
}

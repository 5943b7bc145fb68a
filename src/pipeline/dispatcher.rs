//! Bounded-concurrency dispatch of chunk transcription tasks.
//!
//! Each chunk runs as its own task: extract the segment, try providers in
//! order, settle with a result. Failure stays local to the chunk; the job as
//! a whole only fails when no provider is configured at all.

use crate::audio::extract::SegmentExtractor;
use crate::error::{AudioscribeError, Result};
use crate::pipeline::planner::{ChunkPlan, ChunkSpec};
use crate::provider::transcribe_with_fallback;
use crate::provider::transcriber::{SpeechProvider, TranscribeOptions};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Settled outcome of one chunk.
///
/// Exactly one of `text` (success) or `error` (terminal failure after all
/// providers were exhausted) is meaningful.
#[derive(Debug)]
pub struct ChunkResult {
    pub index: usize,
    pub text: String,
    /// Provider that produced the text, `None` on failure
    pub provider: Option<String>,
    pub error: Option<AudioscribeError>,
}

impl ChunkResult {
    fn success(index: usize, text: String, provider: String) -> Self {
        Self {
            index,
            text,
            provider: Some(provider),
            error: None,
        }
    }

    fn failure(index: usize, error: AudioscribeError) -> Self {
        Self {
            index,
            text: String::new(),
            provider: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// In-flight aggregate state of one transcription request.
///
/// Created when dispatch starts, mutated only by the dispatcher as tasks
/// settle, consumed by the assembler once every chunk has a result. Nothing
/// outlives the request.
#[derive(Debug)]
pub struct TranscriptionJob {
    pub source_duration: f64,
    pub chunk_count: usize,
    pub results: BTreeMap<usize, ChunkResult>,
    pub completed_count: usize,
    pub failed_count: usize,
}

impl TranscriptionJob {
    fn new(source_duration: f64, chunk_count: usize) -> Self {
        Self {
            source_duration,
            chunk_count,
            results: BTreeMap::new(),
            completed_count: 0,
            failed_count: 0,
        }
    }

    fn record(&mut self, result: ChunkResult) {
        if result.is_success() {
            self.completed_count += 1;
        } else {
            self.failed_count += 1;
        }
        self.results.insert(result.index, result);
    }

    /// Provider that transcribed the most chunks, if any chunk succeeded.
    pub fn majority_provider(&self) -> Option<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for result in self.results.values() {
            if let Some(provider) = result.provider.as_deref() {
                *counts.entry(provider).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .map(|(provider, _)| provider.to_string())
    }
}

/// Runs chunk tasks under a concurrency cap with per-call timeouts.
pub struct Dispatcher {
    concurrency: usize,
    call_timeout: Duration,
}

impl Dispatcher {
    pub fn new(concurrency: usize, call_timeout: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            call_timeout,
        }
    }

    /// Transcribe every chunk of the plan and return the fully settled job.
    ///
    /// Completion order is whatever the network yields; ordering is restored
    /// at assembly by chunk index. Returns an error only when no provider in
    /// the order is available — before spawning any chunk work.
    pub async fn dispatch(
        &self,
        source: &Path,
        plan: &ChunkPlan,
        extractor: Arc<dyn SegmentExtractor>,
        providers: &[Arc<dyn SpeechProvider>],
        options: &TranscribeOptions,
        source_duration: f64,
    ) -> Result<TranscriptionJob> {
        if !providers.iter().any(|p| p.is_available()) {
            return Err(AudioscribeError::NoProviderAvailable);
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<ChunkResult> = JoinSet::new();

        for spec in plan.chunks() {
            let semaphore = Arc::clone(&semaphore);
            let extractor = Arc::clone(&extractor);
            let providers = providers.to_vec();
            let options = options.clone();
            let source = source.to_path_buf();
            let spec = spec.clone();
            let call_timeout = self.call_timeout;

            tasks.spawn(async move {
                // The semaphore is never closed while tasks run
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return ChunkResult::failure(
                            spec.index,
                            AudioscribeError::Extraction {
                                message: "dispatcher shut down".to_string(),
                            },
                        );
                    }
                };
                run_chunk(source, spec, extractor, providers, options, call_timeout).await
            });
        }

        let mut job = TranscriptionJob::new(source_duration, plan.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    tracing::debug!(
                        index = result.index,
                        success = result.is_success(),
                        "chunk settled"
                    );
                    job.record(result);
                }
                Err(e) => {
                    // A panicked task leaves its slot empty; count it failed
                    tracing::error!(error = %e, "chunk task panicked");
                    job.failed_count += 1;
                }
            }
        }

        Ok(job)
    }
}

/// Extract one chunk's segment and transcribe it with provider fallback.
///
/// The segment file is dropped (and deleted) on every path out of here.
async fn run_chunk(
    source: PathBuf,
    spec: ChunkSpec,
    extractor: Arc<dyn SegmentExtractor>,
    providers: Vec<Arc<dyn SpeechProvider>>,
    options: TranscribeOptions,
    call_timeout: Duration,
) -> ChunkResult {
    tracing::debug!(
        index = spec.index,
        start = spec.start,
        end = spec.end,
        "processing chunk"
    );

    let segment = match extractor
        .extract(&source, spec.start, spec.end, spec.index)
        .await
    {
        Ok(segment) => segment,
        Err(e) => {
            tracing::warn!(index = spec.index, error = %e, "segment extraction failed");
            return ChunkResult::failure(spec.index, e);
        }
    };

    let audio = match segment.read().await {
        Ok(audio) => audio,
        Err(e) => return ChunkResult::failure(spec.index, e),
    };

    match transcribe_with_fallback(&providers, &audio, &options, call_timeout).await {
        Ok((transcription, provider)) => {
            ChunkResult::success(spec.index, transcription.text, provider.name().to_string())
        }
        Err(e) => {
            tracing::warn!(index = spec.index, error = %e, "all providers exhausted for chunk");
            ChunkResult::failure(spec.index, e)
        }
    }
}

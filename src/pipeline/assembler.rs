//! Ordered assembly of settled chunk results into one transcript.

use crate::pipeline::dispatcher::TranscriptionJob;
use serde::Serialize;
use std::time::Duration;

/// How the transcript was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionMode {
    /// Single direct provider call, no chunking
    Fast,
    /// Parallel chunked dispatch
    Chunked,
}

impl std::fmt::Display for TranscriptionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptionMode::Fast => f.write_str("fast"),
            TranscriptionMode::Chunked => f.write_str("chunked"),
        }
    }
}

/// The one value that crosses the pipeline's outbound boundary.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptOutput {
    pub transcript: String,
    pub total_duration: f64,
    pub chunk_count: usize,
    /// Chunks that produced text (chunk_count minus failures)
    pub chunks_processed: usize,
    pub failed_count: usize,
    pub service_used: String,
    pub model: String,
    pub processing_time_seconds: f64,
    pub mode: TranscriptionMode,
}

/// Concatenate a settled job's chunk texts in index order.
///
/// Iterates indices `0..chunk_count`; a chunk that failed (or never settled)
/// contributes nothing beyond a failure count — degraded completeness, never
/// an abort. Texts are joined with single spaces. Assembly depends only on
/// chunk indices, so any completion order produces the same transcript.
pub fn assemble(
    job: &TranscriptionJob,
    fallback_service: &str,
    model: &str,
    processing_time: Duration,
) -> TranscriptOutput {
    let mut pieces: Vec<&str> = Vec::with_capacity(job.chunk_count);
    let mut failed = 0;

    for index in 0..job.chunk_count {
        match job.results.get(&index) {
            Some(result) if result.is_success() => {
                if !result.text.is_empty() {
                    pieces.push(result.text.as_str());
                }
            }
            _ => failed += 1,
        }
    }

    let service_used = job
        .majority_provider()
        .unwrap_or_else(|| fallback_service.to_string());

    TranscriptOutput {
        transcript: pieces.join(" "),
        total_duration: job.source_duration,
        chunk_count: job.chunk_count,
        chunks_processed: job.chunk_count - failed,
        failed_count: failed,
        service_used,
        model: model.to_string(),
        processing_time_seconds: processing_time.as_secs_f64(),
        mode: TranscriptionMode::Chunked,
    }
}

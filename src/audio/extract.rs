//! Segment extraction via ffmpeg.
//!
//! Extraction is an external collaborator: the pipeline trusts the returned
//! segment to correspond exactly to the requested interval and treats any
//! failure as a chunk-level fault, never a job-wide one.

use crate::error::{AudioscribeError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::process::Command;

/// Monotonic counter keeping concurrent segment file names distinct.
static NEXT_SEGMENT_ID: AtomicU64 = AtomicU64::new(0);

/// Trait for cutting a `[start, end)` interval out of an audio file.
#[async_trait]
pub trait SegmentExtractor: Send + Sync {
    async fn extract(
        &self,
        source: &Path,
        start: f64,
        end: f64,
        index: usize,
    ) -> Result<SegmentFile>;
}

/// A temporary on-disk audio segment, deleted when dropped.
///
/// Ownership follows the task that created the segment; dropping on every
/// exit path (success, provider error, timeout) keeps the temp dir clean
/// under sustained load.
#[derive(Debug)]
pub struct SegmentFile {
    path: PathBuf,
}

impl SegmentFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole segment into memory.
    pub async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| AudioscribeError::Extraction {
                message: format!("failed to read segment {}: {e}", self.path.display()),
            })
    }
}

impl Drop for SegmentFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove segment file");
        }
    }
}

/// Extractor backed by the `ffmpeg` binary.
///
/// Uses stream copy (no re-encode) so extraction cost stays proportional to
/// segment size, not codec complexity.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    temp_dir: PathBuf,
}

impl FfmpegExtractor {
    pub fn new() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Write segment files into a specific directory instead of the OS temp dir.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    fn segment_path(&self, source: &Path, index: usize) -> PathBuf {
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("wav");
        let id = NEXT_SEGMENT_ID.fetch_add(1, Ordering::Relaxed);
        self.temp_dir.join(format!(
            "audioscribe-{}-{id}-{index}.{extension}",
            std::process::id()
        ))
    }
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SegmentExtractor for FfmpegExtractor {
    async fn extract(
        &self,
        source: &Path,
        start: f64,
        end: f64,
        index: usize,
    ) -> Result<SegmentFile> {
        let target = self.segment_path(source, index);

        let output = Command::new("ffmpeg")
            .arg("-i")
            .arg(source)
            .args(["-ss", &start.to_string()])
            .args(["-t", &(end - start).to_string()])
            .args(["-c", "copy", "-y"])
            .arg(&target)
            .output()
            .await
            .map_err(|e| AudioscribeError::Extraction {
                message: format!("failed to run ffmpeg: {e}"),
            })?;

        if !output.status.success() {
            // ffmpeg may have left a partial file behind
            if let Err(e) = std::fs::remove_file(&target)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!(path = %target.display(), error = %e, "failed to remove partial segment");
            }
            return Err(AudioscribeError::Extraction {
                message: format!(
                    "ffmpeg exited with {} for segment {index} [{start:.1}s, {end:.1}s): {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(SegmentFile::new(target))
    }
}

/// Mock extractor for testing
///
/// Writes a small real file per segment whose content names the chunk index,
/// so a text-echoing mock provider reproduces chunk identity in its output.
#[derive(Debug, Clone)]
pub struct MockExtractor {
    temp_dir: PathBuf,
    fail_indices: HashSet<usize>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            fail_indices: HashSet::new(),
        }
    }

    /// Write mock segments into a specific directory (useful for cleanup checks).
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Configure the mock to fail extraction for one chunk index.
    pub fn with_failure_on(mut self, index: usize) -> Self {
        self.fail_indices.insert(index);
        self
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SegmentExtractor for MockExtractor {
    async fn extract(
        &self,
        _source: &Path,
        start: f64,
        end: f64,
        index: usize,
    ) -> Result<SegmentFile> {
        if self.fail_indices.contains(&index) {
            return Err(AudioscribeError::Extraction {
                message: format!("mock extraction failure for segment {index}"),
            });
        }

        let id = NEXT_SEGMENT_ID.fetch_add(1, Ordering::Relaxed);
        let target = self
            .temp_dir
            .join(format!("audioscribe-mock-{}-{id}.txt", std::process::id()));
        tokio::fs::write(&target, format!("segment-{index} [{start:.1},{end:.1})"))
            .await
            .map_err(|e| AudioscribeError::Extraction {
                message: format!("failed to write mock segment: {e}"),
            })?;

        Ok(SegmentFile::new(target))
    }
}

//! Audio duration probing via ffprobe.
//!
//! Duration is the one fact chunk planning cannot proceed without; a probe
//! failure is fatal to the request rather than guessed around.

use crate::error::{AudioscribeError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tokio::process::Command;

/// Trait for determining the total duration of an audio file.
///
/// This trait allows swapping implementations (real ffprobe vs mock).
#[async_trait]
pub trait AudioProbe: Send + Sync {
    /// Total duration of the stream in seconds. Never zero on success.
    async fn duration_secs(&self, path: &Path) -> Result<f64>;
}

/// Probe backed by the `ffprobe` binary.
#[derive(Debug, Clone, Default)]
pub struct FfprobeProbe;

impl FfprobeProbe {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[async_trait]
impl AudioProbe for FfprobeProbe {
    async fn duration_secs(&self, path: &Path) -> Result<f64> {
        let output = Command::new("ffprobe")
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .output()
            .await
            .map_err(|e| AudioscribeError::Probe {
                message: format!("failed to run ffprobe: {e}"),
            })?;

        if !output.status.success() {
            return Err(AudioscribeError::Probe {
                message: format!(
                    "ffprobe exited with {} for {}",
                    output.status,
                    path.display()
                ),
            });
        }

        let parsed: ProbeOutput =
            serde_json::from_slice(&output.stdout).map_err(|e| AudioscribeError::Probe {
                message: format!("unreadable ffprobe output: {e}"),
            })?;

        // ffprobe reports duration as a decimal string inside "format"
        let duration: f64 = parsed
            .format
            .duration
            .as_deref()
            .ok_or_else(|| AudioscribeError::Probe {
                message: "no duration in container metadata".to_string(),
            })?
            .parse()
            .map_err(|e| AudioscribeError::Probe {
                message: format!("unparsable duration: {e}"),
            })?;

        if duration <= 0.0 {
            return Err(AudioscribeError::Probe {
                message: "zero-length stream".to_string(),
            });
        }

        Ok(duration)
    }
}

/// Mock probe for testing
#[derive(Debug, Clone)]
pub struct MockProbe {
    duration: f64,
    should_fail: bool,
}

impl MockProbe {
    /// Create a mock probe reporting a fixed duration
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            should_fail: false,
        }
    }

    /// Configure the mock to fail on probe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

#[async_trait]
impl AudioProbe for MockProbe {
    async fn duration_secs(&self, _path: &Path) -> Result<f64> {
        if self.should_fail {
            Err(AudioscribeError::Probe {
                message: "mock probe failure".to_string(),
            })
        } else {
            Ok(self.duration)
        }
    }
}

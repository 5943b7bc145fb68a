use crate::defaults;
use crate::provider::ProviderKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub chunking: ChunkingConfig,
    pub request: RequestConfig,
}

/// Provider credentials and selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Provider tried first ("groq" or "openai")
    pub preferred: String,
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

/// Chunk planning and dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size_secs: u32,
    pub overlap_secs: u32,
    pub concurrency: usize,
    pub fast_path_threshold_secs: u32,
}

/// Per-request behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RequestConfig {
    /// Per-call provider timeout in seconds
    pub timeout_secs: u64,
    /// Half-window in seconds for playback-position transcription
    pub window_half_secs: f64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            preferred: defaults::PREFERRED_PROVIDER.to_string(),
            groq_api_key: None,
            openai_api_key: None,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size_secs: defaults::CHUNK_SIZE_SECS,
            overlap_secs: defaults::OVERLAP_SECS,
            concurrency: defaults::CONCURRENCY,
            fast_path_threshold_secs: defaults::FAST_PATH_THRESHOLD_SECS,
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::PROVIDER_TIMEOUT_SECS,
            window_half_secs: defaults::WINDOW_HALF_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - GROQ_API_KEY → providers.groq_api_key
    /// - OPENAI_API_KEY → providers.openai_api_key
    /// - AUDIOSCRIBE_PROVIDER → providers.preferred
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("GROQ_API_KEY")
            && !key.is_empty()
        {
            self.providers.groq_api_key = Some(key);
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY")
            && !key.is_empty()
        {
            self.providers.openai_api_key = Some(key);
        }

        if let Ok(provider) = std::env::var("AUDIOSCRIBE_PROVIDER")
            && !provider.is_empty()
        {
            self.providers.preferred = provider;
        }

        self
    }

    /// Parse the configured preferred provider.
    ///
    /// Returns `None` (with a warning) for unknown names rather than failing:
    /// an unknown preference degrades to default provider ordering.
    pub fn preferred_provider(&self) -> Option<ProviderKind> {
        match self.providers.preferred.parse::<ProviderKind>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                tracing::warn!(
                    preferred = %self.providers.preferred,
                    "unknown preferred provider, using default ordering"
                );
                None
            }
        }
    }

    /// Validate the chunking section.
    ///
    /// The same bounds apply to per-request overrides; a violation is a
    /// configuration error, not a retryable fault.
    pub fn validate(&self) -> crate::error::Result<()> {
        crate::pipeline::planner::validate_chunking(
            self.chunking.chunk_size_secs,
            self.chunking.overlap_secs,
        )
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/audioscribe/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("audioscribe")
            .join("config.toml")
    }
}

//! Audio file inspection and segment extraction.

pub mod extract;
pub mod probe;

use crate::defaults;
use crate::error::{AudioscribeError, Result};
use std::path::Path;

/// Check that a file carries a supported audio container extension.
///
/// The check is by declared extension only; the probe and the providers are
/// the ones that actually read the stream.
pub fn validate_extension(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if defaults::SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(AudioscribeError::UnsupportedFormat { extension })
    }
}

/// MIME type for a file name, by extension.
pub fn mime_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        _ => "application/octet-stream",
    }
}

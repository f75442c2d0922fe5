//! Saves transposed audio under a derived filename
//!
//! Name pattern: `{base}_shifted_{shift}.{format}`, where `base` is the
//! original filename without its last extension.

use kc_common::OutputFormat;
use std::io;
use std::path::{Path, PathBuf};

/// Stem used when a display name has no usable final component
const FALLBACK_STEM: &str = "audio";

/// `song`, -3, wav -> `song_shifted_-3.wav`
///
/// Only the final path component of `base_name` is kept, so the result
/// always names a file directly inside the output directory.
pub fn derive_filename(base_name: &str, shift: i32, format: OutputFormat) -> String {
    format!("{}_shifted_{}.{}", file_stem(base_name), shift, format)
}

fn file_stem(base_name: &str) -> &str {
    let last = base_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();
    match last {
        "" | "." | ".." => FALLBACK_STEM,
        stem => stem,
    }
}

#[derive(Debug, Clone)]
pub struct DownloadDispatcher {
    output_dir: PathBuf,
}

impl DownloadDispatcher {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `bytes` into the output directory; returns the saved path.
    ///
    /// An existing file with the same name is replaced.
    pub fn save(
        &self,
        bytes: &[u8],
        base_name: &str,
        shift: i32,
        format: OutputFormat,
    ) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(derive_filename(base_name, shift, format));
        std::fs::write(&path, bytes)?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "Saved transposed audio");
        Ok(path)
    }
}

//! Uploaded audio file (opaque bytes plus declared media type and display name)

use std::path::Path;

/// Fallback when neither content nor extension identifies the file
const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// A candidate or accepted upload
///
/// Immutable once built; a new selection replaces it wholesale.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioFile {
    name: String,
    media_type: String,
    data: Vec<u8>,
}

impl AudioFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data,
        }
    }

    /// Read a file from disk.
    ///
    /// `declared_media_type` wins when given. Otherwise the type is sniffed
    /// from the content, and the extension is consulted only when sniffing
    /// finds nothing.
    pub async fn from_path(path: &Path, declared_media_type: Option<&str>) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let media_type = match declared_media_type {
            Some(mt) => mt.to_string(),
            None => sniff_media_type(&data, path),
        };

        tracing::debug!(
            file = %name,
            media_type = %media_type,
            size = data.len(),
            "Read audio file"
        );

        Ok(Self::new(name, media_type, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Display name with its last extension removed (`my.song.mp3` -> `my.song`)
    ///
    /// Follows the service's own output naming, which splits on the last dot,
    /// rather than truncating at the first dot.
    pub fn base_name(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((base, _)) if !base.is_empty() => base,
            _ => &self.name,
        }
    }
}

// Keep multi-megabyte payloads out of debug logs
impl std::fmt::Debug for AudioFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.data.len())
            .finish()
    }
}

fn sniff_media_type(data: &[u8], path: &Path) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        _ => UNKNOWN_MEDIA_TYPE,
    }
    .to_string()
}

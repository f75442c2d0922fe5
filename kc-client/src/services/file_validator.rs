//! Upload gate
//!
//! Classifies a candidate file by its declared media type (the extension is
//! not consulted) and by size. Pure: no I/O, no network.

use crate::models::AudioFile;
use kc_common::types::is_accepted_media_type;
use std::fmt;

/// Fixed reason for media-type rejections
pub const UNSUPPORTED_TYPE_REASON: &str = "unsupported file type — only mp3/wav accepted";

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Why a candidate was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedType { media_type: String },
    TooLarge { size: u64, limit_mb: u64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnsupportedType { .. } => f.write_str(UNSUPPORTED_TYPE_REASON),
            RejectReason::TooLarge { limit_mb, .. } => {
                write!(f, "file too large — limit is {} MB", limit_mb)
            }
        }
    }
}

/// Outcome of [`FileValidator::validate`]
#[derive(Debug)]
pub enum Validation {
    Accepted(AudioFile),
    Rejected { file_name: String, reason: RejectReason },
}

#[derive(Debug, Clone, Default)]
pub struct FileValidator {
    max_upload_mb: Option<u64>,
}

impl FileValidator {
    /// `max_upload_mb = None` disables the size check
    pub fn new(max_upload_mb: Option<u64>) -> Self {
        Self { max_upload_mb }
    }

    pub fn validate(&self, candidate: AudioFile) -> Validation {
        if !is_accepted_media_type(candidate.media_type()) {
            return Validation::Rejected {
                file_name: candidate.name().to_string(),
                reason: RejectReason::UnsupportedType {
                    media_type: candidate.media_type().to_string(),
                },
            };
        }

        if let Some(limit_mb) = self.max_upload_mb {
            let size = candidate.len() as u64;
            if size > limit_mb.saturating_mul(BYTES_PER_MB) {
                return Validation::Rejected {
                    file_name: candidate.name().to_string(),
                    reason: RejectReason::TooLarge { size, limit_mb },
                };
            }
        }

        Validation::Accepted(candidate)
    }
}

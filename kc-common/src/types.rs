//! Types exchanged with the key analysis / transposition service

use crate::key::{transpose_key_name, MusicalKey};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Media types the service accepts for upload
pub const ACCEPTED_MEDIA_TYPES: [&str; 4] = ["audio/mp3", "audio/mpeg", "audio/wav", "audio/x-wav"];

/// Lowest allowed transposition, in semitones
pub const MIN_SHIFT: i32 = -12;
/// Highest allowed transposition, in semitones
pub const MAX_SHIFT: i32 = 12;

/// Confidence below which a detected key is flagged as possibly inaccurate
pub const RELIABLE_CONFIDENCE: f64 = 0.7;

/// Check a declared media type against [`ACCEPTED_MEDIA_TYPES`].
///
/// Only the essence is compared: parameters after `;` are ignored, as are
/// surrounding whitespace and letter case.
pub fn is_accepted_media_type(media_type: &str) -> bool {
    ACCEPTED_MEDIA_TYPES.contains(&media_type_essence(media_type).as_str())
}

/// `" Audio/WAV; codecs=1 "` -> `"audio/wav"`
pub fn media_type_essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Result of a successful `/analyze` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyResult {
    /// Detected key, e.g. `"E"` or `"F#m"`
    pub key: String,
    /// Analyzer certainty in [0, 1]
    pub confidence: f64,
}

impl KeyResult {
    /// Confidence must be a finite number within [0, 1]
    pub fn is_well_formed(&self) -> bool {
        self.confidence.is_finite() && (0.0..=1.0).contains(&self.confidence)
    }

    /// Parsed key, if the service reported a recognizable name
    pub fn musical_key(&self) -> Option<MusicalKey> {
        self.key.parse().ok()
    }

    /// Confidence rounded to a whole percentage
    pub fn confidence_percent(&self) -> u8 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }

    pub fn is_reliable(&self) -> bool {
        self.confidence >= RELIABLE_CONFIDENCE
    }

    /// Key name after shifting by `shift` semitones (`"-"` when unrecognized)
    pub fn preview_key(&self, shift: i32) -> String {
        transpose_key_name(&self.key, shift)
    }
}

/// Coarse grading of an analysis confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.6 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        };
        f.write_str(label)
    }
}

/// Output container for transposed audio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp3,
    Wav,
}

impl OutputFormat {
    /// Form value sent to the service; also the file extension
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Wav => "wav",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(OutputFormat::Mp3),
            "wav" => Ok(OutputFormat::Wav),
            other => Err(Error::InvalidInput(format!(
                "unsupported output format {:?}, expected mp3 or wav",
                other
            ))),
        }
    }
}

/// Parameters of one `/transpose` submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransposeRequest {
    shift: i32,
    format: OutputFormat,
}

impl TransposeRequest {
    /// Build a request, rejecting shifts outside [`MIN_SHIFT`, `MAX_SHIFT`]
    pub fn new(shift: i32, format: OutputFormat) -> Result<Self> {
        if !(MIN_SHIFT..=MAX_SHIFT).contains(&shift) {
            return Err(Error::InvalidInput(format!(
                "shift {} is outside the allowed range {}..={}",
                shift, MIN_SHIFT, MAX_SHIFT
            )));
        }
        Ok(Self { shift, format })
    }

    pub fn shift(&self) -> i32 {
        self.shift
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

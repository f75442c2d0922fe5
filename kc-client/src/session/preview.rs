//! Transpose form state with live key preview
//!
//! Holds the shift/format the user is editing and recomputes the previewed
//! key synchronously on every shift change. No network access.

use kc_common::types::{MAX_SHIFT, MIN_SHIFT};
use kc_common::{transpose_key_name, Error, KeyResult, OutputFormat, Result, TransposeRequest, UNKNOWN_KEY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransposeDraft {
    original_key: Option<String>,
    shift: i32,
    format: OutputFormat,
    preview: String,
}

impl TransposeDraft {
    /// Start at shift 0 / mp3 for `original_key` (none before analysis)
    pub fn new(original_key: Option<&str>) -> Self {
        let original_key = original_key.map(str::to_string);
        let preview = compute_preview(original_key.as_deref(), 0);
        Self {
            original_key,
            shift: 0,
            format: OutputFormat::default(),
            preview,
        }
    }

    pub fn for_result(result: &KeyResult) -> Self {
        Self::new(Some(&result.key))
    }

    /// Change the shift and return the new preview
    pub fn set_shift(&mut self, shift: i32) -> Result<&str> {
        if !(MIN_SHIFT..=MAX_SHIFT).contains(&shift) {
            return Err(Error::InvalidInput(format!(
                "shift {} is outside the allowed range {}..={}",
                shift, MIN_SHIFT, MAX_SHIFT
            )));
        }
        self.shift = shift;
        self.preview = compute_preview(self.original_key.as_deref(), shift);
        Ok(&self.preview)
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    pub fn shift(&self) -> i32 {
        self.shift
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn original_key(&self) -> &str {
        self.original_key.as_deref().unwrap_or(UNKNOWN_KEY)
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// Submission is possible only once a key is known
    pub fn can_submit(&self) -> bool {
        self.original_key.is_some()
    }

    pub fn to_request(&self) -> Result<TransposeRequest> {
        TransposeRequest::new(self.shift, self.format)
    }
}

fn compute_preview(original_key: Option<&str>, shift: i32) -> String {
    match original_key {
        Some(key) => transpose_key_name(key, shift),
        None => UNKNOWN_KEY.to_string(),
    }
}

//! # KeyChanger Common Library
//!
//! Shared code for the KeyChanger client crates:
//! - Pitch-class arithmetic for previewing transposed keys
//! - Request/response types exchanged with the key service
//! - Bootstrap configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod key;
pub mod types;

pub use error::{Error, Result};
pub use key::{transpose_key_name, MusicalKey, PitchClass, UNKNOWN_KEY};
pub use types::{ConfidenceLevel, KeyResult, OutputFormat, TransposeRequest};

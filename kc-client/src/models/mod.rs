//! Data models for the KeyChanger client
//!
//! - Uploaded audio file
//! - Session state record and phase transitions

pub mod audio_file;
pub mod session_state;

pub use audio_file::AudioFile;
pub use session_state::{SessionPhase, SessionState, StateTransition, StatusMessage};

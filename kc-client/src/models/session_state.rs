//! Session state machine record
//!
//! A session spans one selected file:
//! IDLE → VALIDATING → ANALYZING → ANALYZED → TRANSPOSING → ANALYZED
//!
//! Failures drop back to IDLE (analysis) or ANALYZED (transposition).
//! The busy flags are derived from the single `phase` field, so at most one
//! of analyzing/transposing can be true.

use crate::error::{ErrorKind, SessionError};
use chrono::{DateTime, Utc};
use kc_common::KeyResult;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use super::AudioFile;

/// Orchestrator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionPhase {
    /// No analysis result; may hold an error from the last attempt
    Idle,
    /// Candidate file being classified
    Validating,
    /// `/analyze` in flight
    Analyzing,
    /// Key result available
    Analyzed,
    /// `/transpose` in flight
    Transposing,
}

impl SessionPhase {
    pub fn is_busy(self) -> bool {
        matches!(self, SessionPhase::Analyzing | SessionPhase::Transposing)
    }
}

/// Phase change record, published as a session event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_phase: SessionPhase,
    pub new_phase: SessionPhase,
    pub transitioned_at: DateTime<Utc>,
}

/// Error or success banner; holding one excludes the other
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StatusMessage {
    Error { kind: ErrorKind, message: String },
    Success { message: String },
}

/// The orchestrator's single mutable record
///
/// Fields are read through accessors; only the orchestrator mutates them.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Identity of the current selection; in-flight requests are tagged with it
    session_id: Uuid,
    phase: SessionPhase,
    file: Option<Arc<AudioFile>>,
    key_result: Option<KeyResult>,
    status: Option<StatusMessage>,
    /// Where the last successful transposition of this file was saved
    last_download: Option<PathBuf>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            phase: SessionPhase::Idle,
            file: None,
            key_result: None,
            status: None,
            last_download: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn file(&self) -> Option<&Arc<AudioFile>> {
        self.file.as_ref()
    }

    pub fn key_result(&self) -> Option<&KeyResult> {
        self.key_result.as_ref()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn last_download(&self) -> Option<&PathBuf> {
        self.last_download.as_ref()
    }

    pub fn analyzing(&self) -> bool {
        self.phase == SessionPhase::Analyzing
    }

    pub fn transposing(&self) -> bool {
        self.phase == SessionPhase::Transposing
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            Some(StatusMessage::Error { message, .. }) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &self.status {
            Some(StatusMessage::Error { kind, .. }) => Some(*kind),
            _ => None,
        }
    }

    pub fn success_message(&self) -> Option<&str> {
        match &self.status {
            Some(StatusMessage::Success { message }) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Start a new session: fresh identity, prior file/result/messages dropped
    pub(crate) fn begin_session(&mut self) -> StateTransition {
        self.session_id = Uuid::new_v4();
        self.file = None;
        self.key_result = None;
        self.status = None;
        self.last_download = None;
        self.transition_to(SessionPhase::Validating)
    }

    pub(crate) fn transition_to(&mut self, new_phase: SessionPhase) -> StateTransition {
        let transition = StateTransition {
            session_id: self.session_id,
            old_phase: self.phase,
            new_phase,
            transitioned_at: Utc::now(),
        };
        self.phase = new_phase;
        transition
    }

    pub(crate) fn set_file(&mut self, file: Arc<AudioFile>) {
        self.file = Some(file);
    }

    pub(crate) fn set_key_result(&mut self, key_result: Option<KeyResult>) {
        self.key_result = key_result;
    }

    pub(crate) fn set_error(&mut self, error: &SessionError) {
        self.status = Some(StatusMessage::Error {
            kind: error.kind(),
            message: error.user_message(),
        });
    }

    pub(crate) fn set_success(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage::Success {
            message: message.into(),
        });
    }

    pub(crate) fn set_last_download(&mut self, path: PathBuf) {
        self.last_download = Some(path);
    }

    pub(crate) fn clear_status(&mut self) {
        self.status = None;
    }
}

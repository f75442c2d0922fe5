//! Session events published for front-ends

use crate::error::ErrorKind;
use crate::models::StateTransition;
use kc_common::KeyResult;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// Notification emitted by the orchestrator after each state change
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Orchestrator phase changed
    PhaseChanged(StateTransition),

    /// Analysis finished for the current file
    KeyDetected {
        session_id: Uuid,
        file_name: String,
        key_result: KeyResult,
    },

    /// An operation ended with an error (validation, network, server, save)
    OperationFailed {
        session_id: Uuid,
        kind: ErrorKind,
        message: String,
    },

    /// Transposed audio written to disk
    FileSaved { session_id: Uuid, path: PathBuf },

    /// A response arrived for a file that is no longer selected
    StaleResultDiscarded {
        stale_session_id: Uuid,
        operation: String,
    },
}

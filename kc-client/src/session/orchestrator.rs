//! Session orchestrator
//!
//! Sequences validation → analysis → transposition → save for one selected
//! file and owns the [`SessionState`] record. All mutation goes through the
//! named operations below; the lock is never held across a network call.
//!
//! Every request is tagged with the session id it was issued for. A response
//! whose id no longer matches the current session is discarded, so a new
//! selection can never be overwritten by a late reply for an older file.

use crate::error::{SessionError, SessionResult};
use crate::models::{AudioFile, SessionPhase, SessionState, StateTransition};
use crate::services::{DownloadDispatcher, FileValidator, KeyService, Validation};
use crate::session::events::SessionEvent;
use kc_common::{OutputFormat, TransposeRequest, UNKNOWN_KEY};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Success banner after a transposed file is saved
pub const TRANSPOSE_SUCCESS_MESSAGE: &str = "File transposed successfully.";

const EVENT_CAPACITY: usize = 64;

pub struct SessionOrchestrator {
    service: Arc<dyn KeyService>,
    validator: FileValidator,
    dispatcher: DownloadDispatcher,
    state: Mutex<SessionState>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionOrchestrator {
    pub fn new(
        service: Arc<dyn KeyService>,
        validator: FileValidator,
        dispatcher: DownloadDispatcher,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            service,
            validator,
            dispatcher,
            state: Mutex::new(SessionState::new()),
            event_tx,
        }
    }

    /// Receive [`SessionEvent`]s from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.lock_state().clone()
    }

    /// Key name the current result would have after `shift` semitones
    pub fn preview_key(&self, shift: i32) -> String {
        match self.lock_state().key_result() {
            Some(result) => result.preview_key(shift),
            None => UNKNOWN_KEY.to_string(),
        }
    }

    /// Start a new session with `candidate` and analyze it if accepted.
    ///
    /// Prior file, key result and messages are dropped first. Any request
    /// still in flight for the previous selection becomes stale.
    pub async fn select_file(&self, candidate: AudioFile) -> SessionState {
        let (session_id, file) = {
            let mut state = self.lock_state();
            if state.phase().is_busy() {
                tracing::debug!(
                    superseded = %state.session_id(),
                    phase = ?state.phase(),
                    "New selection supersedes in-flight request"
                );
            }
            let transition = state.begin_session();
            self.emit_transition(transition);

            match self.validator.validate(candidate) {
                Validation::Rejected { file_name, reason } => {
                    tracing::warn!(file = %file_name, reason = %reason, "File rejected");
                    let error = SessionError::Validation(reason.to_string());
                    self.fail(&mut state, &error, SessionPhase::Idle);
                    return state.clone();
                }
                Validation::Accepted(file) => {
                    tracing::info!(
                        session_id = %state.session_id(),
                        file = %file.name(),
                        size = file.len(),
                        "File accepted"
                    );
                    let file = Arc::new(file);
                    state.set_file(Arc::clone(&file));
                    let transition = state.transition_to(SessionPhase::Analyzing);
                    self.emit_transition(transition);
                    (state.session_id(), file)
                }
            }
        };

        self.run_analysis(session_id, file).await
    }

    /// Retry analysis of the current file. No-op while busy or without a file.
    pub async fn reanalyze(&self) -> SessionState {
        let (session_id, file) = {
            let mut state = self.lock_state();
            if state.phase().is_busy() {
                tracing::debug!(phase = ?state.phase(), "Reanalyze ignored while busy");
                return state.clone();
            }
            let Some(file) = state.file().cloned() else {
                tracing::debug!("Reanalyze ignored without a selected file");
                return state.clone();
            };

            state.clear_status();
            state.set_key_result(None);
            let transition = state.transition_to(SessionPhase::Analyzing);
            self.emit_transition(transition);
            (state.session_id(), file)
        };

        self.run_analysis(session_id, file).await
    }

    /// Transpose the current file and save the result.
    ///
    /// No-op while busy, or before a file has been analyzed. A shift outside
    /// [-12, 12] fails locally without a request.
    pub async fn submit_transpose(&self, shift: i32, format: OutputFormat) -> SessionState {
        let (session_id, file, request) = {
            let mut state = self.lock_state();
            if state.phase().is_busy() {
                tracing::debug!(phase = ?state.phase(), "Transpose ignored while busy");
                return state.clone();
            }
            let Some(file) = state.file().cloned() else {
                tracing::debug!("Transpose ignored without a selected file");
                return state.clone();
            };
            if state.key_result().is_none() {
                tracing::debug!("Transpose ignored before analysis has succeeded");
                return state.clone();
            }

            state.clear_status();
            let request = match TransposeRequest::new(shift, format) {
                Ok(request) => request,
                Err(e) => {
                    let error = SessionError::from(e);
                    let phase = state.phase();
                    self.fail(&mut state, &error, phase);
                    return state.clone();
                }
            };

            let transition = state.transition_to(SessionPhase::Transposing);
            self.emit_transition(transition);
            (state.session_id(), file, request)
        };

        let outcome = self.service.transpose(&file, &request).await;

        {
            let state = self.lock_state();
            if self.is_stale(&state, session_id, "transpose") {
                return state.clone();
            }
        }

        let saved = match outcome {
            Ok(audio) => self.save_download(audio, &file, &request).await,
            Err(error) => Err(error),
        };

        let mut state = self.lock_state();
        if self.is_stale(&state, session_id, "transpose") {
            return state.clone();
        }

        // The key result survives either way, so the user can retry
        match saved {
            Ok(path) => {
                state.set_success(TRANSPOSE_SUCCESS_MESSAGE);
                state.set_last_download(path.clone());
                self.emit(SessionEvent::FileSaved { session_id, path });
                let transition = state.transition_to(SessionPhase::Analyzed);
                self.emit_transition(transition);
            }
            Err(error) => self.fail(&mut state, &error, SessionPhase::Analyzed),
        }

        state.clone()
    }

    /// Write transposed audio on the blocking pool, outside the state lock
    async fn save_download(
        &self,
        audio: Vec<u8>,
        file: &AudioFile,
        request: &TransposeRequest,
    ) -> SessionResult<PathBuf> {
        let dispatcher = self.dispatcher.clone();
        let base_name = file.base_name().to_string();
        let (shift, format) = (request.shift(), request.format());

        let written =
            tokio::task::spawn_blocking(move || dispatcher.save(&audio, &base_name, shift, format))
                .await;

        match written {
            Ok(Ok(path)) => Ok(path),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to save transposed audio");
                Err(SessionError::SaveFailed(e.to_string()))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Save task did not complete");
                Err(SessionError::SaveFailed(e.to_string()))
            }
        }
    }

    async fn run_analysis(&self, session_id: Uuid, file: Arc<AudioFile>) -> SessionState {
        let outcome = self.service.analyze(&file).await;

        let mut state = self.lock_state();
        if self.is_stale(&state, session_id, "analyze") {
            return state.clone();
        }

        match outcome {
            Ok(key_result) => {
                state.set_key_result(Some(key_result.clone()));
                state.clear_status();
                let transition = state.transition_to(SessionPhase::Analyzed);
                self.emit_transition(transition);
                self.emit(SessionEvent::KeyDetected {
                    session_id,
                    file_name: file.name().to_string(),
                    key_result,
                });
            }
            Err(error) => {
                state.set_key_result(None);
                self.fail(&mut state, &error, SessionPhase::Idle);
            }
        }

        state.clone()
    }

    /// True (and logged) when `issued_for` is no longer the current session
    fn is_stale(&self, state: &SessionState, issued_for: Uuid, operation: &str) -> bool {
        if state.session_id() == issued_for {
            return false;
        }
        tracing::debug!(
            operation,
            stale_session = %issued_for,
            current_session = %state.session_id(),
            "Discarding stale result"
        );
        self.emit(SessionEvent::StaleResultDiscarded {
            stale_session_id: issued_for,
            operation: operation.to_string(),
        });
        true
    }

    fn fail(&self, state: &mut SessionState, error: &SessionError, next_phase: SessionPhase) {
        tracing::info!(
            session_id = %state.session_id(),
            kind = ?error.kind(),
            error = %error,
            "Operation failed"
        );
        state.set_error(error);
        self.emit(SessionEvent::OperationFailed {
            session_id: state.session_id(),
            kind: error.kind(),
            message: error.user_message(),
        });
        if state.phase() != next_phase {
            let transition = state.transition_to(next_phase);
            self.emit_transition(transition);
        }
    }

    fn emit_transition(&self, transition: StateTransition) {
        tracing::debug!(
            session_id = %transition.session_id,
            from = ?transition.old_phase,
            to = ?transition.new_phase,
            "Session phase changed"
        );
        self.emit(SessionEvent::PhaseChanged(transition));
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! In-process [`KeyService`] whose replies are released by the test
//!
//! Each call waits on a oneshot gate registered for the file name, so a test
//! can decide exactly when (and in what order) responses arrive.

use async_trait::async_trait;
use kc_client::models::AudioFile;
use kc_client::services::KeyService;
use kc_client::{SessionError, SessionResult};
use kc_common::{KeyResult, TransposeRequest};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

type AnalyzeGate = oneshot::Receiver<SessionResult<KeyResult>>;
type TransposeGate = oneshot::Receiver<SessionResult<Vec<u8>>>;

#[derive(Default)]
pub struct ScriptedKeyService {
    analyze_gates: Mutex<HashMap<String, AnalyzeGate>>,
    transpose_gates: Mutex<HashMap<String, TransposeGate>>,
    analyze_calls: AtomicUsize,
    transpose_calls: AtomicUsize,
}

impl ScriptedKeyService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the next `/analyze` reply for `file_name`
    pub fn gate_analysis(&self, file_name: &str) -> oneshot::Sender<SessionResult<KeyResult>> {
        let (tx, rx) = oneshot::channel();
        self.analyze_gates
            .lock()
            .unwrap()
            .insert(file_name.to_string(), rx);
        tx
    }

    /// Register the next `/transpose` reply for `file_name`
    pub fn gate_transpose(&self, file_name: &str) -> oneshot::Sender<SessionResult<Vec<u8>>> {
        let (tx, rx) = oneshot::channel();
        self.transpose_gates
            .lock()
            .unwrap()
            .insert(file_name.to_string(), rx);
        tx
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn transpose_calls(&self) -> usize {
        self.transpose_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyService for ScriptedKeyService {
    async fn analyze(&self, file: &AudioFile) -> SessionResult<KeyResult> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.analyze_gates.lock().unwrap().remove(file.name());
        match gate {
            Some(rx) => rx.await.unwrap_or(Err(SessionError::Unreachable)),
            None => Err(SessionError::Unreachable),
        }
    }

    async fn transpose(&self, file: &AudioFile, _request: &TransposeRequest) -> SessionResult<Vec<u8>> {
        self.transpose_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.transpose_gates.lock().unwrap().remove(file.name());
        match gate {
            Some(rx) => rx.await.unwrap_or(Err(SessionError::Unreachable)),
            None => Err(SessionError::Unreachable),
        }
    }
}

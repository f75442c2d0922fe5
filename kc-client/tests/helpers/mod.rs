//! Test Helper Utilities
//!
//! Shared fixtures for kc-client integration tests

#![allow(dead_code, unused_imports)]

pub mod mock_service;
pub mod scripted_service;

pub use mock_service::{unreachable_url, MockReply, MockService, ReceivedUpload};
pub use scripted_service::ScriptedKeyService;

use kc_client::config::ClientConfig;
use kc_client::models::{AudioFile, SessionState};
use kc_client::session::SessionOrchestrator;
use std::path::Path;
use std::time::{Duration, Instant};

/// MPEG frame sync followed by padding
pub fn mp3_file(name: &str) -> AudioFile {
    let mut data = vec![0xFF, 0xFB, 0x90, 0x64];
    data.resize(512, 0);
    AudioFile::new(name, "audio/mpeg", data)
}

pub fn wav_file(name: &str) -> AudioFile {
    let mut data = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
    data.resize(256, 0);
    AudioFile::new(name, "audio/wav", data)
}

/// Client settings pointing at `base_url` with one deadline for both uploads
pub fn test_config(base_url: &str, timeout: Duration, output_dir: &Path) -> ClientConfig {
    ClientConfig {
        server_url: base_url.to_string(),
        analyze_timeout: timeout,
        transpose_timeout: timeout,
        output_dir: output_dir.to_path_buf(),
        max_upload_mb: 50,
    }
}

/// Poll the orchestrator until `predicate` holds (panics after 5 s)
pub async fn wait_for_state<F>(orchestrator: &SessionOrchestrator, predicate: F) -> SessionState
where
    F: Fn(&SessionState) -> bool,
{
    let started = Instant::now();
    loop {
        let state = orchestrator.snapshot();
        if predicate(&state) {
            return state;
        }
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "state never matched; last phase {:?}",
            state.phase()
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

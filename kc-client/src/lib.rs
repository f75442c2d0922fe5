//! kc-client library interface
//!
//! Client-side session core for the KeyChanger service: upload validation,
//! key analysis, live key preview, transposition and local save.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use crate::error::{ErrorKind, SessionError, SessionResult};

use crate::config::ClientConfig;
use crate::services::{DownloadDispatcher, FileValidator, HttpKeyService};
use crate::session::SessionOrchestrator;
use std::sync::Arc;

/// Wire an orchestrator to the HTTP key service described by `config`
pub fn build_orchestrator(config: &ClientConfig) -> kc_common::Result<SessionOrchestrator> {
    let service = HttpKeyService::new(config)?;
    Ok(SessionOrchestrator::new(
        Arc::new(service),
        FileValidator::new(Some(config.max_upload_mb)),
        DownloadDispatcher::new(config.output_dir.clone()),
    ))
}

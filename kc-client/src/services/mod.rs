//! Service layer for the session orchestrator
//!
//! - Upload validation
//! - `/analyze` and `/transpose` clients behind the [`KeyService`] seam
//! - Local save of transposed audio

pub mod analysis_client;
pub mod download_dispatcher;
pub mod file_validator;
pub mod http;
pub mod key_service;
pub mod transpose_client;

pub use analysis_client::AnalysisClient;
pub use download_dispatcher::{derive_filename, DownloadDispatcher};
pub use file_validator::{FileValidator, RejectReason, Validation, UNSUPPORTED_TYPE_REASON};
pub use http::ServiceEndpoint;
pub use key_service::{HealthStatus, HttpKeyService, KeyService};
pub use transpose_client::TransposeClient;

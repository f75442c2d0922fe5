//! Shared HTTP plumbing for the key service clients
//!
//! Owns the reqwest client and base URL, and the error normalization shared by
//! `/analyze`, `/transpose` and the health check.

use crate::error::{SessionError, SessionResult};
use crate::models::AudioFile;
use crate::services::file_validator::UNSUPPORTED_TYPE_REASON;
use kc_common::types::media_type_essence;
use reqwest::multipart::Part;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

const USER_AGENT: &str = concat!("keychanger/", env!("CARGO_PKG_VERSION"));

/// Base URL plus a pooled HTTP client
#[derive(Debug, Clone)]
pub struct ServiceEndpoint {
    http: reqwest::Client,
    base_url: String,
}

impl ServiceEndpoint {
    /// Build an endpoint for `base_url` (trailing slashes are ignored).
    ///
    /// No client-level timeout is set; each operation applies its own deadline.
    pub fn new(base_url: &str) -> kc_common::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| kc_common::Error::Config(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Failure body returned by the service: `{"detail": "..."}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The `detail` text, when it is a non-empty string.
    ///
    /// Framework validation errors put a list in `detail`; those count as absent.
    pub(crate) fn into_message(self) -> Option<String> {
        match self.detail {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }
}

/// Map a reqwest failure that produced no usable response
pub(crate) fn transport_error(operation: &'static str, err: &reqwest::Error) -> SessionError {
    tracing::warn!(operation, error = %err, "Request failed without a response");
    if err.is_timeout() {
        SessionError::Timeout
    } else if err.is_decode() {
        SessionError::MalformedResponse
    } else {
        SessionError::Unreachable
    }
}

/// Run a request exchange under a wall-clock deadline.
///
/// On expiry the exchange future is dropped, which abandons the request.
pub(crate) async fn with_deadline<T, F>(
    operation: &'static str,
    deadline: Duration,
    exchange: F,
) -> SessionResult<T>
where
    F: Future<Output = SessionResult<T>>,
{
    match tokio::time::timeout(deadline, exchange).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation,
                deadline_secs = deadline.as_secs_f64(),
                "Request deadline exceeded"
            );
            Err(SessionError::Timeout)
        }
    }
}

/// Multipart `file` field carrying the raw upload, typed with the bare essence
pub(crate) fn file_part(file: &AudioFile) -> SessionResult<Part> {
    let essence = media_type_essence(file.media_type());
    Part::bytes(file.data().to_vec())
        .file_name(file.name().to_string())
        .mime_str(&essence)
        .map_err(|e| {
            tracing::warn!(media_type = %file.media_type(), error = %e, "Media type not usable for upload");
            SessionError::Validation(UNSUPPORTED_TYPE_REASON.to_string())
        })
}

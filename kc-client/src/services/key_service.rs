//! Remote key service seam
//!
//! The orchestrator only sees [`KeyService`]; [`HttpKeyService`] is the
//! production implementation backed by the analysis and transpose clients.

use crate::config::ClientConfig;
use crate::error::{SessionError, SessionResult};
use crate::models::AudioFile;
use crate::services::analysis_client::AnalysisClient;
use crate::services::http::{transport_error, with_deadline, ServiceEndpoint};
use crate::services::transpose_client::TransposeClient;
use async_trait::async_trait;
use kc_common::{KeyResult, TransposeRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// The two remote operations a session depends on
#[async_trait]
pub trait KeyService: Send + Sync {
    /// Detect the musical key of `file`
    async fn analyze(&self, file: &AudioFile) -> SessionResult<KeyResult>;

    /// Re-pitch `file`, returning the encoded audio
    async fn transpose(&self, file: &AudioFile, request: &TransposeRequest) -> SessionResult<Vec<u8>>;
}

/// `GET /` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// HTTP-backed [`KeyService`]
#[derive(Debug, Clone)]
pub struct HttpKeyService {
    endpoint: ServiceEndpoint,
    analysis: AnalysisClient,
    transpose: TransposeClient,
}

impl HttpKeyService {
    pub fn new(config: &ClientConfig) -> kc_common::Result<Self> {
        let endpoint = ServiceEndpoint::new(&config.server_url)?;
        Ok(Self {
            analysis: AnalysisClient::new(endpoint.clone(), config.analyze_timeout),
            transpose: TransposeClient::new(endpoint.clone(), config.transpose_timeout),
            endpoint,
        })
    }

    pub fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }

    /// Query the service status endpoint
    pub async fn health(&self) -> SessionResult<HealthStatus> {
        let request = self.endpoint.http().get(self.endpoint.url("/"));

        with_deadline("health", HEALTH_TIMEOUT, async move {
            let response = request
                .send()
                .await
                .map_err(|e| transport_error("health", &e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(SessionError::Server(format!(
                    "Service reported status {}",
                    status.as_u16()
                )));
            }

            response.json::<HealthStatus>().await.map_err(|e| {
                tracing::warn!(error = %e, "Health response did not match expected shape");
                SessionError::MalformedResponse
            })
        })
        .await
    }
}

#[async_trait]
impl KeyService for HttpKeyService {
    async fn analyze(&self, file: &AudioFile) -> SessionResult<KeyResult> {
        self.analysis.analyze(file).await
    }

    async fn transpose(&self, file: &AudioFile, request: &TransposeRequest) -> SessionResult<Vec<u8>> {
        self.transpose.transpose(file, request).await
    }
}

//! Key analysis client (`POST /analyze`)
//!
//! Uploads the raw file as multipart field `file` and expects
//! `{"key": "...", "confidence": 0.0..1.0}` back.

use crate::error::{SessionError, SessionResult, ANALYZE_FALLBACK_MESSAGE};
use crate::models::AudioFile;
use crate::services::http::{file_part, transport_error, with_deadline, ErrorBody, ServiceEndpoint};
use kc_common::KeyResult;
use reqwest::multipart::Form;
use std::time::{Duration, Instant};

const OPERATION: &str = "analyze";

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    endpoint: ServiceEndpoint,
    timeout: Duration,
}

impl AnalysisClient {
    pub fn new(endpoint: ServiceEndpoint, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Detect the key of `file`
    pub async fn analyze(&self, file: &AudioFile) -> SessionResult<KeyResult> {
        let form = Form::new().part("file", file_part(file)?);
        let request = self
            .endpoint
            .http()
            .post(self.endpoint.url("/analyze"))
            .multipart(form);

        tracing::debug!(
            file = %file.name(),
            size = file.len(),
            media_type = %file.media_type(),
            "Uploading file for key analysis"
        );

        let started = Instant::now();
        let result = with_deadline(OPERATION, self.timeout, async move {
            let response = request
                .send()
                .await
                .map_err(|e| transport_error(OPERATION, &e))?;

            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| transport_error(OPERATION, &e))?;

            if !status.is_success() {
                let message = serde_json::from_slice::<ErrorBody>(&body)
                    .ok()
                    .and_then(ErrorBody::into_message)
                    .unwrap_or_else(|| ANALYZE_FALLBACK_MESSAGE.to_string());
                tracing::warn!(status = status.as_u16(), detail = %message, "Analysis rejected by server");
                return Err(SessionError::Server(message));
            }

            let key_result: KeyResult = serde_json::from_slice(&body).map_err(|e| {
                tracing::warn!(error = %e, "Analysis response did not match expected shape");
                SessionError::MalformedResponse
            })?;

            if !key_result.is_well_formed() {
                tracing::warn!(confidence = key_result.confidence, "Analysis confidence out of range");
                return Err(SessionError::MalformedResponse);
            }

            Ok(key_result)
        })
        .await;

        if let Ok(key_result) = &result {
            tracing::info!(
                file = %file.name(),
                key = %key_result.key,
                confidence = key_result.confidence,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Key analysis complete"
            );
        }

        result
    }
}

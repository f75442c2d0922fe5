//! Transposition client (`POST /transpose`)
//!
//! Sends `file`, `shift` and `format` as multipart fields and receives the
//! re-pitched audio as a binary body. Error bodies arrive through the same
//! binary channel, so they are read back as text and only then parsed as JSON.

use crate::error::{SessionError, SessionResult, TRANSPOSE_FALLBACK_MESSAGE};
use crate::models::AudioFile;
use crate::services::http::{file_part, transport_error, with_deadline, ErrorBody, ServiceEndpoint};
use kc_common::TransposeRequest;
use reqwest::multipart::Form;
use std::time::{Duration, Instant};

const OPERATION: &str = "transpose";

#[derive(Debug, Clone)]
pub struct TransposeClient {
    endpoint: ServiceEndpoint,
    timeout: Duration,
}

impl TransposeClient {
    pub fn new(endpoint: ServiceEndpoint, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Re-pitch `file`; returns the encoded audio bytes
    pub async fn transpose(&self, file: &AudioFile, request: &TransposeRequest) -> SessionResult<Vec<u8>> {
        let form = Form::new()
            .part("file", file_part(file)?)
            .text("shift", request.shift().to_string())
            .text("format", request.format().to_string());

        let http_request = self
            .endpoint
            .http()
            .post(self.endpoint.url("/transpose"))
            .multipart(form);

        tracing::debug!(
            file = %file.name(),
            shift = request.shift(),
            format = %request.format(),
            "Submitting transposition"
        );

        let started = Instant::now();
        let result = with_deadline(OPERATION, self.timeout, async move {
            let response = http_request
                .send()
                .await
                .map_err(|e| transport_error(OPERATION, &e))?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                // An undecodable error body falls back to the generic message
                let message = serde_json::from_str::<ErrorBody>(&text)
                    .ok()
                    .and_then(ErrorBody::into_message)
                    .unwrap_or_else(|| TRANSPOSE_FALLBACK_MESSAGE.to_string());
                tracing::warn!(status = status.as_u16(), detail = %message, "Transposition rejected by server");
                return Err(SessionError::Server(message));
            }

            let audio = response
                .bytes()
                .await
                .map_err(|e| transport_error(OPERATION, &e))?;

            if audio.is_empty() {
                tracing::warn!("Transposition returned an empty body");
                return Err(SessionError::MalformedResponse);
            }

            Ok(audio.to_vec())
        })
        .await;

        if let Ok(audio) = &result {
            tracing::info!(
                file = %file.name(),
                shift = request.shift(),
                format = %request.format(),
                bytes = audio.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Transposition complete"
            );
        }

        result
    }
}

//! HttpAnalysisClient (inferencia remota)
//!
//! - Envía `AnalysisRequestEnvelope` como JSON a `{base_url}/v1/analyze`.
//! - Errores de transporte y respuestas 5xx/429 son `ServiceUnavailable`.
//! - Un 4xx distinto de 429 no es transitorio: `MalformedResponse`.
//! - No reintenta; eso lo decide el caller con `retry_with_backoff`.

use std::time::Duration;

use async_trait::async_trait;
use dx_core::wire::{decode_response, AnalysisRequestEnvelope};
use dx_core::AnalysisClient;
use dx_domain::{AnalysisError, AnalysisResult, ValidatedInput};
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use uuid::Uuid;

pub const ANALYZE_PATH: &str = "/v1/analyze";

#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    endpoint: String,
}

impl HttpAnalysisClient {
    pub fn new(base_url: &str) -> Result<Self, AnalysisError> {
        let client = Client::builder().build()
                                      .map_err(|e| AnalysisError::ServiceUnavailable(format!("http client init: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), ANALYZE_PATH);
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(e: reqwest::Error, timeout: Duration) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::Timeout { after_ms: timeout.as_millis() as u64 }
        } else {
            AnalysisError::ServiceUnavailable(e.to_string())
        }
    }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn analyze(&self, input: &ValidatedInput, timeout: Duration) -> Result<AnalysisResult, AnalysisError> {
        let envelope = AnalysisRequestEnvelope::from_input(input, Uuid::new_v4());
        debug!("POST {} request {} ({} bytes image)",
               self.endpoint,
               envelope.request_id(),
               input.image().size_bytes());

        let response = self.client
                           .post(&self.endpoint)
                           .timeout(timeout)
                           .json(&envelope)
                           .send()
                           .await
                           .map_err(|e| Self::transport_error(e, timeout))?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            warn!("analysis backend answered {status} for request {}", envelope.request_id());
            return Err(AnalysisError::ServiceUnavailable(format!("backend status {status}")));
        }
        if !status.is_success() {
            warn!("analysis backend rejected request {} with {status}", envelope.request_id());
            return Err(AnalysisError::MalformedResponse(format!("backend status {status}")));
        }

        let body = response.bytes()
                           .await
                           .map_err(|e| Self::transport_error(e, timeout))?;
        decode_response(&body, input.image())
    }
}

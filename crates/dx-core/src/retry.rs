//! Reintento explícito con backoff exponencial.
//!
//! Nunca se activa solo: la política por defecto es un único intento. Sólo se
//! reintentan `ServiceUnavailable` y `Timeout`.

use std::time::Duration;

use dx_domain::{AnalysisError, AnalysisResult, ValidatedInput};
use log::{debug, warn};

use crate::client::AnalysisClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// Un único intento, sin reintentos.
    pub fn none() -> Self {
        Self { max_attempts: 1,
               base_delay: Duration::from_millis(200),
               max_delay: Duration::from_secs(5) }
    }

    /// `max_attempts` cuenta el primer intento; valores < 1 se tratan como 1.
    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1),
               base_delay,
               ..Self::none() }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn max_attempts(&self) -> u32 { self.max_attempts }

    /// Espera antes del reintento número `retry` (1 = primer reintento):
    /// `base * 2^(retry-1)`, acotada por `max_delay`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Ejecuta `client.analyze` aplicando el timeout a cada intento y
/// reintentando según `policy`.
pub async fn retry_with_backoff(client: &dyn AnalysisClient,
                                input: &ValidatedInput,
                                timeout: Duration,
                                policy: RetryPolicy)
                                -> Result<AnalysisResult, AnalysisError> {
    let mut attempt = 1u32;
    loop {
        let outcome = match tokio::time::timeout(timeout, client.analyze(input, timeout)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AnalysisError::Timeout { after_ms: timeout.as_millis() as u64 }),
        };
        match outcome {
            Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!("analysis attempt {attempt}/{} via {} failed: {err}; retrying in {delay:?}",
                      policy.max_attempts,
                      client.name());
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => {
                debug!("analysis via {} finished after {attempt} attempt(s)", client.name());
                return other;
            }
        }
    }
}

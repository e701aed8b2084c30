//! Frontera con el servicio de inferencia externo.

use std::time::Duration;

use async_trait::async_trait;
use dx_domain::{AnalysisError, AnalysisResult, ValidatedInput};

/// Capacidad de análisis. Una petición produce exactamente una respuesta o un
/// error tipado.
///
/// Las implementaciones no deben reintentar por su cuenta: el modelo remoto
/// puede no ser determinista y el reintento es decisión del caller
/// (ver `retry_with_backoff`).
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    fn name(&self) -> &str;

    async fn analyze(&self, input: &ValidatedInput, timeout: Duration) -> Result<AnalysisResult, AnalysisError>;
}

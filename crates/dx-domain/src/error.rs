//! Errores del dominio de envío y análisis.
//!
//! `ValidationError` se resuelve siempre en local (nunca se reintenta).
//! `AnalysisError` viaja desde el backend de inferencia hasta la sesión; sólo
//! `ServiceUnavailable` y `Timeout` admiten reintento dirigido por el caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("no image attached to the submission")]
    MissingImage,
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    /// Imagen de cero bytes con un tipo aceptado; sin esta comprobación
    /// pasaría el resto de validaciones.
    #[error("image is empty")]
    EmptyImage,
    #[error("image too large: {size} bytes (limit {limit})")]
    ImageTooLarge { size: u64, limit: u64 },
    #[error("report text is empty")]
    EmptyReport,
    #[error("patient label is empty")]
    EmptyPatientLabel,
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisError {
    #[error("analysis service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("analysis timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),
    #[error("analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// Fallos transitorios: candidatos a reintento con backoff si el caller lo pide.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnalysisError::ServiceUnavailable(_) | AnalysisError::Timeout { .. })
    }
}

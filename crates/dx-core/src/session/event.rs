//! Eventos de transición de una sesión.
//!
//! Cada transición se anexa al log interno de la sesión (append-only, `seq`
//! contiguo desde 0) y se difunde a los suscriptores. Los eventos no
//! transportan bytes de imagen ni el texto del informe.
use chrono::{DateTime, Utc};
use dx_domain::{AnalysisError, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SessionStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// `submit` aceptado; comienza la validación.
    ValidationStarted,
    /// La entrada no pasó la validación. Terminal.
    ValidationFailed { error: ValidationError },
    /// Entrada válida; se lanzó la llamada al backend.
    AnalysisStarted { submission_id: Uuid, max_attempts: u32 },
    /// El backend devolvió un resultado válido. Terminal.
    AnalysisCompleted { submission_id: Uuid, confidence: u8, findings: usize },
    /// El backend falló (o se agotó el tiempo). Terminal.
    AnalysisFailed { submission_id: Uuid, error: AnalysisError },
    /// El caller canceló mientras se analizaba. Terminal.
    Cancelled { submission_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub seq: u64,
    pub session_id: Uuid,
    pub from: SessionStatus,
    pub to: SessionStatus,
    pub kind: SessionEventKind,
    pub ts: DateTime<Utc>,
}

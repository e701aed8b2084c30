//! Errores específicos del core.

use dx_domain::ValidationError;
use thiserror::Error;
use uuid::Uuid;

use crate::session::SessionStatus;

/// Errores de uso de la sesión. `SessionBusy` indica un mal uso de la API,
/// no una condición transitoria.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum SessionError {
    #[error("session busy: submit called while {status}")]
    SessionBusy { status: SessionStatus },
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("no tokio runtime available to run the analysis")]
    RuntimeUnavailable,
    #[error("session not completed (status {status})")]
    NotCompleted { status: SessionStatus },
    #[error(transparent)]
    History(#[from] HistoryError),
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum HistoryError {
    #[error("duplicate history entry for submission {submission_id}")]
    DuplicateEntry { submission_id: Uuid },
    #[error("history storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ExportError {
    #[error("report rendering failed: {0}")]
    Render(String),
}

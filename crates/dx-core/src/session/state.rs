use std::fmt;

use chrono::{DateTime, Utc};
use dx_domain::{AnalysisError, AnalysisResult, ImagePayload, ReportText, ValidatedInput, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Estado de una sesión en tiempo de ejecución.
///
/// Las transiciones válidas son:
/// - `Idle` -> `Validating`
/// - `Validating` -> `Analyzing`
/// - `Validating` -> `Failed`
/// - `Analyzing` -> `Completed`
/// - `Analyzing` -> `Failed`
///
/// `Completed` y `Failed` son terminales. Nunca se vuelve a `Validating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Sin envío todavía.
    Idle,
    /// Validando imagen y texto.
    Validating,
    /// Esperando al backend de análisis.
    Analyzing,
    /// El análisis terminó con resultado.
    Completed,
    /// La validación o el análisis fallaron (o se canceló).
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }

    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!((self, next),
                 (Idle, Validating) | (Validating, Analyzing) | (Validating, Failed) | (Analyzing, Completed) | (Analyzing, Failed))
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Validating => "validating",
            SessionStatus::Analyzing => "analyzing",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Causa de un `Failed`.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionFailure {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Estado con su carga: el resultado en `Completed`, la causa en `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Analyzing,
    Completed(AnalysisResult),
    Failed(SessionFailure),
}

impl SubmissionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            SubmissionState::Idle => SessionStatus::Idle,
            SubmissionState::Validating => SessionStatus::Validating,
            SubmissionState::Analyzing => SessionStatus::Analyzing,
            SubmissionState::Completed(_) => SessionStatus::Completed,
            SubmissionState::Failed(_) => SessionStatus::Failed,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            SubmissionState::Completed(r) => Some(r),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&SessionFailure> {
        match self {
            SubmissionState::Failed(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }
}

/// Envío en curso. Pertenece en exclusiva a su `SubmissionSession`.
#[derive(Debug, Clone)]
pub struct Submission {
    id: Uuid,
    image: ImagePayload,
    report: ReportText,
    pub(crate) state: SessionStatus,
    created_at: DateTime<Utc>,
}

impl Submission {
    pub(crate) fn from_input(input: ValidatedInput, state: SessionStatus) -> Self {
        let (image, report) = input.into_parts();
        Self { id: Uuid::new_v4(),
               image,
               report,
               state,
               created_at: Utc::now() }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn image(&self) -> &ImagePayload { &self.image }
    pub fn report(&self) -> &ReportText { &self.report }
    pub fn state(&self) -> SessionStatus { self.state }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
}

//! dx-core: máquina de estados de envíos, contrato de análisis e historial
pub mod client;
pub mod constants;
pub mod errors;
pub mod export;
pub mod history;
pub mod retry;
pub mod session;
pub mod wire;

pub use client::AnalysisClient;
pub use errors::{ExportError, HistoryError, SessionError};
pub use export::{ExportedReport, ReportExporter, ReportView};
pub use history::{HistoryQuery, HistoryStore, InMemoryHistoryStore};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use session::{SessionConfig, SessionEvent, SessionEventKind, SessionFailure, SessionStatus, Submission, SubmissionSession,
                  SubmissionState};
pub use wire::{AnalysisRequestEnvelope, AnalysisResponseEnvelope};

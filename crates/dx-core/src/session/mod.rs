//! Session module: máquina de estados de un envío
//!
//! Provee la sesión, sus estados y el log de eventos de transición.

pub mod core;
pub mod event;
pub mod state;

pub use self::core::{SessionConfig, SubmissionSession};
pub use event::{SessionEvent, SessionEventKind};
pub use state::{SessionFailure, SessionStatus, Submission, SubmissionState};

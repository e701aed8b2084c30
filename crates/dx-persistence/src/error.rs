//! Errores de persistencia.
//! Mapea errores de IO / formato del fichero a variantes semánticas.

use dx_core::HistoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("history file io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt history line {line}: {reason}")]
    Corrupt { line: usize, reason: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl From<PersistenceError> for HistoryError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::History(inner) => inner,
            other => HistoryError::Storage(other.to_string()),
        }
    }
}

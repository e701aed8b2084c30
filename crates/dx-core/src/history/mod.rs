//! Historial append-only de envíos completados.

mod ledger;
mod query;

use std::sync::{Mutex, MutexGuard};

use dx_domain::HistoryEntry;

pub use ledger::{HistoryLog, StoredEntry};
pub use query::{HistoryIter, HistoryQuery};

use crate::errors::HistoryError;

/// Almacenamiento de historial append-only, compartido entre sesiones.
pub trait HistoryStore: Send + Sync {
    /// Anexa una entrada y devuelve su `seq`. Rechaza `submission_id`
    /// repetidos con `DuplicateEntry`; nunca sobreescribe.
    fn record(&self, entry: HistoryEntry) -> Result<u64, HistoryError>;
    /// Entradas por timestamp descendente (empates: la más reciente primero).
    fn query(&self, limit: usize, offset: usize) -> HistoryQuery;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Store en memoria. Los `record` concurrentes se linealizan con un mutex.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    log: Mutex<HistoryLog>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HistoryLog> {
        // el log sólo se modifica tras validar; un pánico previo no lo deja a medias
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn record(&self, entry: HistoryEntry) -> Result<u64, HistoryError> {
        self.lock().append(entry)
    }

    fn query(&self, limit: usize, offset: usize) -> HistoryQuery {
        self.lock().snapshot(limit, offset)
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

//! Log ordenado de entradas de historial compartido por todas las stores.
//!
//! Invariantes:
//! - `seq` es monótono y contiguo desde 0 en orden de llegada.
//! - `entries` se mantiene ordenado por timestamp descendente; en empate va
//!   primero la entrada insertada más tarde.
//! - Un `submission_id` aparece como mucho una vez.
//!
//! El vector vive detrás de un `Arc` (copy-on-write): una consulta toma una
//! instantánea barata y los `record` posteriores no la alteran.
use std::collections::HashSet;
use std::sync::Arc;

use dx_domain::HistoryEntry;
use uuid::Uuid;

use super::HistoryQuery;
use crate::errors::HistoryError;

#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub seq: u64,
    pub entry: Arc<HistoryEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Arc<Vec<StoredEntry>>,
    ids: HashSet<Uuid>,
    next_seq: u64,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_unique(&self, submission_id: Uuid) -> Result<(), HistoryError> {
        if self.ids.contains(&submission_id) {
            return Err(HistoryError::DuplicateEntry { submission_id });
        }
        Ok(())
    }

    /// Seq que recibirá el próximo `append`.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn append(&mut self, entry: HistoryEntry) -> Result<u64, HistoryError> {
        self.check_unique(entry.submission_id())?;
        let seq = self.next_seq;
        let ts = entry.timestamp();
        let entries = Arc::make_mut(&mut self.entries);
        // primera posición cuyo timestamp no es posterior: en empate, la nueva va delante
        let pos = entries.partition_point(|e| e.entry.timestamp() > ts);
        self.ids.insert(entry.submission_id());
        entries.insert(pos, StoredEntry { seq, entry: Arc::new(entry) });
        self.next_seq += 1;
        Ok(seq)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self, limit: usize, offset: usize) -> HistoryQuery {
        HistoryQuery::new(Arc::clone(&self.entries), limit, offset)
    }
}

use std::iter::{Skip, Take};
use std::slice;
use std::sync::Arc;

use dx_domain::HistoryEntry;

use super::ledger::StoredEntry;

/// Resultado de `HistoryStore::query`: vista perezosa sobre una instantánea.
///
/// Finita (a lo sumo `limit` entradas) y reiniciable: cada llamada a `iter`
/// recorre de nuevo la misma instantánea desde el principio.
#[derive(Debug, Clone)]
pub struct HistoryQuery {
    snapshot: Arc<Vec<StoredEntry>>,
    limit: usize,
    offset: usize,
}

impl HistoryQuery {
    pub(crate) fn new(snapshot: Arc<Vec<StoredEntry>>, limit: usize, offset: usize) -> Self {
        Self { snapshot, limit, offset }
    }

    pub fn iter(&self) -> HistoryIter<'_> {
        HistoryIter { inner: self.snapshot.iter().skip(self.offset).take(self.limit) }
    }

    /// Igual que `iter` pero con el `seq` de llegada de cada entrada.
    pub fn iter_with_seq(&self) -> impl Iterator<Item = (u64, &HistoryEntry)> + '_ {
        self.snapshot
            .iter()
            .skip(self.offset)
            .take(self.limit)
            .map(|s| (s.seq, s.entry.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.snapshot.len().saturating_sub(self.offset).min(self.limit)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self) -> Option<&HistoryEntry> {
        self.iter().next()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.iter().cloned().collect()
    }
}

pub struct HistoryIter<'a> {
    inner: Take<Skip<slice::Iter<'a, StoredEntry>>>,
}

impl<'a> Iterator for HistoryIter<'a> {
    type Item = &'a HistoryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|s| s.entry.as_ref())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a HistoryQuery {
    type Item = &'a HistoryEntry;
    type IntoIter = HistoryIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

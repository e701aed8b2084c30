//! `HistoryStore` sobre un fichero JSON-lines.
//!
//! Cada `record` anexa una línea `{"seq": n, "entry": {...}}` antes de tocar
//! el índice en memoria; si la escritura falla el índice no cambia y el
//! fichero se trunca a su longitud previa. Al abrir se hace replay de todas
//! las líneas en orden y se exige `seq` contiguo.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use dx_core::history::HistoryLog;
use dx_core::{HistoryError, HistoryQuery, HistoryStore};
use dx_domain::HistoryEntry;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

#[derive(Deserialize)]
struct HistoryRecord {
    seq: u64,
    entry: HistoryEntry,
}

#[derive(Serialize)]
struct HistoryRecordRef<'a> {
    seq: u64,
    entry: &'a HistoryEntry,
}

/// Estado del final del fichero tras el replay.
enum ReplayTail {
    Clean,
    Torn { valid_len: u64 },
    MissingNewline,
}

struct JsonlState {
    file: File,
    log: HistoryLog,
}

pub struct JsonlHistoryStore {
    path: PathBuf,
    state: Mutex<JsonlState>,
}

impl JsonlHistoryStore {
    /// Abre (o crea) el fichero y reconstruye el índice.
    ///
    /// Una última línea incompleta (sin `\n` final y no decodificable) es el
    /// rastro de una escritura interrumpida: se descarta y se trunca.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let (log, tail) = if path.exists() { Self::replay(&path)? } else { (HistoryLog::new(), ReplayTail::Clean) };
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        match tail {
            ReplayTail::Clean => {}
            ReplayTail::Torn { valid_len } => file.set_len(valid_len)?,
            ReplayTail::MissingNewline => file.write_all(b"\n")?,
        }
        info!("history store {} opened with {} entries", path.display(), log.len());
        Ok(Self { path,
                  state: Mutex::new(JsonlState { file, log }) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replay(path: &Path) -> Result<(HistoryLog, ReplayTail), PersistenceError> {
        let mut log = HistoryLog::new();
        let mut reader = BufReader::new(File::open(path)?);
        let mut buf = String::new();
        let mut offset = 0u64;
        let mut line_no = 0usize;
        let mut tail = ReplayTail::Clean;
        loop {
            buf.clear();
            let n = reader.read_line(&mut buf)?;
            if n == 0 {
                break;
            }
            line_no += 1;
            let complete = buf.ends_with('\n');
            let text = buf.trim();
            if text.is_empty() {
                offset += n as u64;
                continue;
            }
            let record: HistoryRecord = match serde_json::from_str(text) {
                Ok(record) => record,
                Err(e) if !complete => {
                    warn!("history store {} dropping torn trailing line {line_no}: {e}", path.display());
                    tail = ReplayTail::Torn { valid_len: offset };
                    break;
                }
                Err(e) => {
                    return Err(PersistenceError::Corrupt { line: line_no,
                                                           reason: e.to_string() })
                }
            };
            if record.seq != log.next_seq() {
                return Err(PersistenceError::Corrupt { line: line_no,
                                                       reason: format!("expected seq {}, found {}", log.next_seq(), record.seq) });
            }
            log.append(record.entry)
               .map_err(|e| PersistenceError::Corrupt { line: line_no,
                                                        reason: e.to_string() })?;
            offset += n as u64;
            if !complete {
                tail = ReplayTail::MissingNewline;
            }
        }
        Ok((log, tail))
    }

    fn lock(&self) -> MutexGuard<'_, JsonlState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn append_line(state: &mut JsonlState, entry: &HistoryEntry) -> Result<u64, PersistenceError> {
        state.log.check_unique(entry.submission_id())?;
        let seq = state.log.next_seq();
        let mut line = serde_json::to_vec(&HistoryRecordRef { seq, entry })?;
        line.push(b'\n');
        let committed_len = state.file.metadata()?.len();
        if let Err(e) = state.file.write_all(&line).and_then(|_| state.file.flush()) {
            // no dejar un fragmento al que se pegaría la siguiente línea
            warn!("history append failed at seq {seq}, truncating to {committed_len} bytes: {e}");
            state.file.set_len(committed_len)?;
            return Err(e.into());
        }
        Ok(seq)
    }
}

impl HistoryStore for JsonlHistoryStore {
    fn record(&self, entry: HistoryEntry) -> Result<u64, HistoryError> {
        let mut state = self.lock();
        let seq = Self::append_line(&mut state, &entry)?;
        let appended = state.log.append(entry)?;
        debug_assert_eq!(seq, appended);
        debug!("history store {} appended seq {seq}", self.path.display());
        Ok(appended)
    }

    fn query(&self, limit: usize, offset: usize) -> HistoryQuery {
        self.lock().log.snapshot(limit, offset)
    }

    fn len(&self) -> usize {
        self.lock().log.len()
    }
}

impl std::fmt::Debug for JsonlHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlHistoryStore")
         .field("path", &self.path)
         .field("entries", &self.len())
         .finish()
    }
}

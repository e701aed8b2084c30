//! Carga de configuración del historial desde variables de entorno.
//! Usa `DXFLOW_HISTORY_PATH` con un valor por defecto relativo al cwd.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

pub const DEFAULT_HISTORY_PATH: &str = "dxflow-history.jsonl";

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    pub path: PathBuf,
}

impl HistoryConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = lookup("DXFLOW_HISTORY_PATH").filter(|v| !v.trim().is_empty())
                                                .unwrap_or_else(|| DEFAULT_HISTORY_PATH.to_string());
        Self { path: PathBuf::from(path) }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

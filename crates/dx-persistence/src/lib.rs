//! dx-persistence
//!
//! Historial durable sobre un fichero JSON-lines append-only.
//!
//! Módulos:
//! - `jsonl`: `JsonlHistoryStore`, implementación de `HistoryStore` que anexa
//!   una línea por entrada y reconstruye el orden al abrir (replay).
//! - `config`: carga de configuración desde .env / entorno.
//! - `error`: errores de IO y de formato del fichero.

pub mod config;
pub mod error;
pub mod jsonl;

pub use config::{init_dotenv, HistoryConfig};
pub use error::PersistenceError;
pub use jsonl::JsonlHistoryStore;

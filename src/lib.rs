//! dxflow: envío de imágenes diagnósticas con informe clínico a un servicio
//! de análisis, con historial append-only de resultados.
//!
//! Este crate raíz sólo re-exporta los crates del workspace y añade la
//! configuración de la aplicación y la orquestación de un envío completo.
pub mod config;
pub mod pipeline;

pub use dx_adapters as adapters;
pub use dx_core as core;
pub use dx_domain as domain;
pub use dx_persistence as persistence;

pub use config::{AppConfig, ConfigError};
pub use pipeline::{load_image, run_submission, PipelineError, SubmissionRequest};

//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable
//! (`AppConfig`) con los parámetros del backend de análisis, del validador y
//! del historial.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dx_core::constants::DEFAULT_ANALYSIS_TIMEOUT;
use dx_core::{RetryPolicy, SessionConfig};
use dx_domain::{InputValidator, DEFAULT_MAX_IMAGE_BYTES};
use dx_persistence::HistoryConfig;
use thiserror::Error;

pub const DEFAULT_ANALYSIS_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Valor inválido para {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Parámetros del servicio de inferencia.
    pub analysis: AnalysisConfig,
    /// Límite de tamaño de imagen aceptado por el validador.
    pub max_image_bytes: u64,
    /// Fichero JSON-lines del historial.
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Intentos totales (1 = sin reintento).
    pub retry_max_attempts: u32,
    pub retry_base_delay: Duration,
}

impl AppConfig {
    /// Lee `.env` (si existe) y las variables `DXFLOW_*` del entorno.
    pub fn from_env() -> Result<Self, ConfigError> {
        dx_persistence::init_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("DXFLOW_ANALYSIS_URL").filter(|v| !v.trim().is_empty())
                                                    .unwrap_or_else(|| DEFAULT_ANALYSIS_URL.to_string());
        let timeout_secs = parse_or(&lookup, "DXFLOW_ANALYSIS_TIMEOUT_SECS", DEFAULT_ANALYSIS_TIMEOUT.as_secs())?;
        let retry_max_attempts = parse_or(&lookup, "DXFLOW_RETRY_MAX_ATTEMPTS", 1u32)?;
        let retry_base_ms = parse_or(&lookup, "DXFLOW_RETRY_BASE_DELAY_MS", 200u64)?;
        let max_image_bytes = parse_or(&lookup, "DXFLOW_MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?;
        Ok(AppConfig { analysis: AnalysisConfig { base_url,
                                                  timeout: Duration::from_secs(timeout_secs),
                                                  retry_max_attempts,
                                                  retry_base_delay: Duration::from_millis(retry_base_ms) },
                       max_image_bytes,
                       history: HistoryConfig::from_lookup(&lookup) })
    }

    /// Configuración de sesión derivada.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default().with_timeout(self.analysis.timeout)
                                .with_retry(RetryPolicy::exponential(self.analysis.retry_max_attempts,
                                                                     self.analysis.retry_base_delay))
                                .with_validator(InputValidator::new().with_max_image_bytes(self.max_image_bytes))
    }

    pub fn history_path(&self) -> &PathBuf {
        &self.history.path
    }
}

fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.analysis.base_url, DEFAULT_ANALYSIS_URL);
        assert_eq!(cfg.analysis.timeout, Duration::from_secs(30));
        assert_eq!(cfg.analysis.retry_max_attempts, 1);
        assert_eq!(cfg.max_image_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.session_config().retry.max_attempts(), 1);
    }

    #[test]
    fn test_overrides_flow_into_session_config() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("DXFLOW_ANALYSIS_URL", "http://infer:9000"),
                                                       ("DXFLOW_ANALYSIS_TIMEOUT_SECS", "5"),
                                                       ("DXFLOW_RETRY_MAX_ATTEMPTS", "4"),
                                                       ("DXFLOW_MAX_IMAGE_BYTES", "1024"),
                                                       ("DXFLOW_HISTORY_PATH", "/var/lib/dx/h.jsonl")])).unwrap();
        let session = cfg.session_config();
        assert_eq!(session.timeout, Duration::from_secs(5));
        assert_eq!(session.retry.max_attempts(), 4);
        assert_eq!(session.validator.max_image_bytes(), 1024);
        assert_eq!(cfg.history_path(), &PathBuf::from("/var/lib/dx/h.jsonl"));
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("DXFLOW_ANALYSIS_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(err,
                   ConfigError::InvalidValue { key: "DXFLOW_ANALYSIS_TIMEOUT_SECS",
                                               value: "soon".into() });
    }
}

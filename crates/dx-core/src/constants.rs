//! Constantes del core.
//!
//! `WIRE_VERSION` fija la etiqueta del sobre serializado que se intercambia
//! con el backend de inferencia; cambiarla rompe la compatibilidad con
//! servidores que sólo entienden la versión anterior.

use std::time::Duration;

/// Versión del sobre de petición/respuesta del backend.
pub const WIRE_VERSION: &str = "v1";

/// Timeout por defecto de una llamada de análisis.
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

/// Capacidad del canal broadcast de eventos de sesión.
pub const SESSION_EVENT_CAPACITY: usize = 32;

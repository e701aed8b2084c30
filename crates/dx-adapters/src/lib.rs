//! dx-adapters: implementaciones concretas de los contratos del core
//!
//! Este crate provee:
//! - `HttpAnalysisClient`: llamada real al servicio de inferencia remoto
//!   (POST JSON con el sobre versionado de `dx_core::wire`).
//! - `StubAnalysisClient`: doble determinista y programable para tests y
//!   demos sin backend.
//! - `PlainTextReportExporter`: exportador de informes en texto plano.
//!
//! Nota: el core sólo conoce los traits `AnalysisClient` y `ReportExporter`;
//! aquí no se toca la máquina de estados.

pub mod export;
pub mod http_client;
pub mod stub_client;

pub use export::PlainTextReportExporter;
pub use http_client::HttpAnalysisClient;
pub use stub_client::StubAnalysisClient;

//! Contrato del exportador de informes.
//!
//! La generación del documento (PDF u otro) es un colaborador externo; el
//! core sólo fija qué datos recibe: `{patient_label, image_type, result}`
//! más el id y la fecha del envío.

use chrono::{DateTime, Utc};
use dx_domain::{AnalysisResult, HistoryEntry, ImagingModality, PatientLabel};
use uuid::Uuid;

use crate::errors::ExportError;

/// Vista de sólo lectura que consume un exportador.
#[derive(Debug, Clone, Copy)]
pub struct ReportView<'a> {
    pub submission_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub patient_label: &'a PatientLabel,
    pub image_type: &'a ImagingModality,
    pub result: &'a AnalysisResult,
}

impl<'a> From<&'a HistoryEntry> for ReportView<'a> {
    fn from(entry: &'a HistoryEntry) -> Self {
        Self { submission_id: entry.submission_id(),
               timestamp: entry.timestamp(),
               patient_label: entry.patient_label(),
               image_type: entry.image_type(),
               result: entry.result() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedReport {
    pub file_name: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

pub trait ReportExporter: Send + Sync {
    fn format(&self) -> &str;
    fn export(&self, view: ReportView<'_>) -> Result<ExportedReport, ExportError>;

    fn export_entry(&self, entry: &HistoryEntry) -> Result<ExportedReport, ExportError> {
        self.export(ReportView::from(entry))
    }
}

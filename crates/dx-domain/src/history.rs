use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AnalysisResult, PatientLabel};

/// Modalidad de imagen tal como se muestra en el historial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImagingModality {
    ChestXRay,
    CtScan,
    Other(String),
}

impl ImagingModality {
    pub fn parse(label: &str) -> Self {
        let norm: String = label.trim()
                                .to_ascii_lowercase()
                                .chars()
                                .filter(|c| c.is_ascii_alphanumeric())
                                .collect();
        match norm.as_str() {
            "chestxray" | "xray" | "cxr" => ImagingModality::ChestXRay,
            "ct" | "ctscan" => ImagingModality::CtScan,
            _ => ImagingModality::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ImagingModality::ChestXRay => "Chest X-Ray",
            ImagingModality::CtScan => "CT Scan",
            ImagingModality::Other(raw) => raw,
        }
    }
}

impl From<String> for ImagingModality {
    fn from(raw: String) -> Self {
        ImagingModality::parse(&raw)
    }
}

impl From<ImagingModality> for String {
    fn from(m: ImagingModality) -> Self {
        m.label().to_string()
    }
}

impl fmt::Display for ImagingModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Registro durable de un envío completado. Inmutable una vez creado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    submission_id: Uuid,
    timestamp: DateTime<Utc>,
    patient_label: PatientLabel,
    image_type: ImagingModality,
    result: AnalysisResult,
}

impl HistoryEntry {
    pub fn new(submission_id: Uuid,
               timestamp: DateTime<Utc>,
               patient_label: PatientLabel,
               image_type: ImagingModality,
               result: AnalysisResult)
               -> Self {
        Self { submission_id,
               timestamp,
               patient_label,
               image_type,
               result }
    }

    pub fn submission_id(&self) -> Uuid { self.submission_id }
    pub fn timestamp(&self) -> DateTime<Utc> { self.timestamp }
    pub fn patient_label(&self) -> &PatientLabel { &self.patient_label }
    pub fn image_type(&self) -> &ImagingModality { &self.image_type }
    pub fn result(&self) -> &AnalysisResult { &self.result }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Notas clínicas del envío, ya recortadas y no vacías.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReportText(String);

impl ReportText {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyReport);
        }
        Ok(ReportText(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str { &self.0 }
    pub fn len(&self) -> usize { self.0.len() }
    // Nunca vacío por construcción; se mantiene por simetría con `len`.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for ReportText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identificador opaco del paciente (p.ej. `PT-2451`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatientLabel(String);

impl PatientLabel {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyPatientLabel);
        }
        Ok(PatientLabel(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for PatientLabel {
    type Error = ValidationError;
    fn try_from(raw: String) -> Result<Self, Self::Error> {
        PatientLabel::new(&raw)
    }
}

impl From<PatientLabel> for String {
    fn from(label: PatientLabel) -> Self {
        label.0
    }
}

impl fmt::Display for PatientLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Resultado estructurado de un análisis.
//!
//! Sólo se construye a través de `AnalysisResult::new`, que aplica los
//! invariantes de la respuesta (confianza en [0,100], findings presentes).
//! La deserialización pasa por el mismo constructor.

use serde::{Deserialize, Serialize};

use crate::{AnalysisError, ImagePayload};

pub const MAX_CONFIDENCE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAnalysisResult")]
pub struct AnalysisResult {
    confidence: u8,
    findings: Vec<String>,
    narrative: String,
    annotated_image: ImagePayload,
}

impl AnalysisResult {
    pub fn new(confidence: i64,
               findings: Option<Vec<String>>,
               narrative: impl Into<String>,
               annotated_image: ImagePayload)
               -> Result<Self, AnalysisError> {
        if !(0..=MAX_CONFIDENCE).contains(&confidence) {
            return Err(AnalysisError::MalformedResponse(format!("confidence {confidence} outside [0,100]")));
        }
        let findings = findings.ok_or_else(|| AnalysisError::MalformedResponse("findings absent".into()))?;
        Ok(Self { confidence: confidence as u8,
                  findings,
                  narrative: narrative.into(),
                  annotated_image })
    }

    pub fn confidence(&self) -> u8 { self.confidence }
    pub fn findings(&self) -> &[String] { &self.findings }
    pub fn narrative(&self) -> &str { &self.narrative }
    pub fn annotated_image(&self) -> &ImagePayload { &self.annotated_image }

    /// Resumen de una línea para listados: el primer hallazgo.
    pub fn summary(&self) -> &str {
        self.findings
            .first()
            .map(String::as_str)
            .unwrap_or("No findings reported")
    }
}

#[derive(Deserialize)]
struct RawAnalysisResult {
    confidence: i64,
    findings: Option<Vec<String>>,
    #[serde(default)]
    narrative: String,
    annotated_image: ImagePayload,
}

impl TryFrom<RawAnalysisResult> for AnalysisResult {
    type Error = AnalysisError;
    fn try_from(raw: RawAnalysisResult) -> Result<Self, Self::Error> {
        AnalysisResult::new(raw.confidence, raw.findings, raw.narrative, raw.annotated_image)
    }
}

//! Sobres versionados para el intercambio con el backend de inferencia.
//!
//! Rol en el flujo:
//! - `AnalysisRequestEnvelope` empaqueta un `ValidatedInput` (imagen en
//!   base64 + digest + texto) bajo una etiqueta `version`.
//! - `AnalysisResponseEnvelope` se decodifica y se convierte en un
//!   `AnalysisResult` pasando por sus invariantes.
//! - Una versión desconocida o un cuerpo no decodificable es
//!   `AnalysisError::MalformedResponse`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use dx_domain::{AnalysisError, AnalysisResult, ImagePayload, MediaType, ValidatedInput};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// La etiqueta serde de cada variante debe coincidir con
/// `constants::WIRE_VERSION`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "version")]
pub enum AnalysisRequestEnvelope {
    #[serde(rename = "v1")]
    V1(AnalysisRequestV1),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequestV1 {
    pub request_id: Uuid,
    pub media_type: String,
    pub image_base64: String,
    pub image_sha256: String,
    pub report_text: String,
}

impl AnalysisRequestEnvelope {
    pub fn from_input(input: &ValidatedInput, request_id: Uuid) -> Self {
        let image = input.image();
        AnalysisRequestEnvelope::V1(AnalysisRequestV1 { request_id,
                                                        media_type: image.media_type().mime().to_string(),
                                                        image_base64: STANDARD.encode(image.bytes()),
                                                        image_sha256: image.sha256_hex(),
                                                        report_text: input.report().as_str().to_string() })
    }

    pub fn request_id(&self) -> Uuid {
        match self {
            AnalysisRequestEnvelope::V1(req) => req.request_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "version")]
pub enum AnalysisResponseEnvelope {
    #[serde(rename = "v1")]
    V1(AnalysisResponseV1),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponseV1 {
    pub confidence: i64,
    #[serde(default)]
    pub findings: Option<Vec<String>>,
    #[serde(default)]
    pub narrative: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated_image_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated_media_type: Option<String>,
}

impl AnalysisResponseEnvelope {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let img = result.annotated_image();
        AnalysisResponseEnvelope::V1(AnalysisResponseV1 { confidence: i64::from(result.confidence()),
                                                          findings: Some(result.findings().to_vec()),
                                                          narrative: result.narrative().to_string(),
                                                          annotated_image_base64: Some(STANDARD.encode(img.bytes())),
                                                          annotated_media_type: Some(img.media_type().mime().to_string()) })
    }

    /// Convierte la respuesta en `AnalysisResult`. Si el backend no devuelve
    /// imagen anotada se usa `original` (la imagen enviada).
    pub fn into_result(self, original: &ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        match self {
            AnalysisResponseEnvelope::V1(resp) => {
                let annotated = match resp.annotated_image_base64 {
                    Some(b64) => {
                        let bytes = STANDARD.decode(b64.as_bytes())
                                            .map_err(|e| AnalysisError::MalformedResponse(format!("annotated image: {e}")))?;
                        let media = resp.annotated_media_type
                                        .as_deref()
                                        .map(MediaType::from_mime)
                                        .unwrap_or_else(|| original.media_type().clone());
                        if !media.is_accepted() {
                            return Err(AnalysisError::MalformedResponse(format!("annotated image has unsupported media type {media}")));
                        }
                        if bytes.is_empty() {
                            return Err(AnalysisError::MalformedResponse("annotated image is empty".into()));
                        }
                        ImagePayload::new(bytes, media)
                    }
                    None => original.clone(),
                };
                AnalysisResult::new(resp.confidence, resp.findings, resp.narrative, annotated)
            }
        }
    }
}

/// Decodifica un cuerpo JSON de respuesta.
pub fn decode_response(body: &[u8], original: &ImagePayload) -> Result<AnalysisResult, AnalysisError> {
    let envelope: AnalysisResponseEnvelope =
        serde_json::from_slice(body).map_err(|e| AnalysisError::MalformedResponse(format!("undecodable body: {e}")))?;
    envelope.into_result(original)
}

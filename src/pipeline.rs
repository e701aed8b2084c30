//! Orquestación de un envío completo: carga de la imagen, sesión, espera del
//! resultado y archivo en el historial.
use std::path::Path;
use std::sync::Arc;

use dx_core::{AnalysisClient, HistoryStore, SessionConfig, SessionError, SessionFailure, SubmissionSession, SubmissionState};
use dx_domain::{HistoryEntry, ImagePayload, ImagingModality, MediaType, PatientLabel};
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no se pudo leer la imagen {path}: {source}")]
    ImageRead { path: String, source: std::io::Error },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("análisis fallido: {0}")]
    Failed(SessionFailure),
}

/// Datos de un envío tal como los aporta el usuario.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub image: Option<ImagePayload>,
    pub report_text: String,
    pub patient: PatientLabel,
    pub modality: ImagingModality,
}

/// Lee una imagen del disco; el tipo se deduce de la extensión.
pub fn load_image(path: &Path) -> Result<ImagePayload, PipelineError> {
    let bytes = std::fs::read(path).map_err(|source| PipelineError::ImageRead { path: path.display().to_string(),
                                                                                  source })?;
    Ok(ImagePayload::new(bytes, MediaType::from_path(path)))
}

/// Ejecuta un envío hasta su estado terminal y, si se completa, lo archiva.
pub async fn run_submission(client: Arc<dyn AnalysisClient>,
                            config: SessionConfig,
                            store: &dyn HistoryStore,
                            request: SubmissionRequest)
                            -> Result<HistoryEntry, PipelineError> {
    let mut session = SubmissionSession::new(client, config);
    let submission_id = session.submit(request.image, &request.report_text)?;
    match session.wait().await {
        SubmissionState::Completed(_) => {}
        SubmissionState::Failed(failure) => return Err(PipelineError::Failed(failure.clone())),
        other => return Err(SessionError::NotCompleted { status: other.status() }.into()),
    }
    let entry = session.history_entry(request.patient, request.modality)?;
    let seq = store.record(entry.clone()).map_err(SessionError::from)?;
    info!("submission {submission_id} archived at seq {seq}");
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dx_adapters::StubAnalysisClient;
    use dx_core::InMemoryHistoryStore;
    use dx_domain::AnalysisError;

    fn request(image: Option<ImagePayload>) -> SubmissionRequest {
        SubmissionRequest { image,
                            report_text: "cough, fever 3 days".into(),
                            patient: PatientLabel::new("PT-2451").unwrap(),
                            modality: ImagingModality::ChestXRay }
    }

    #[tokio::test]
    async fn test_completed_submission_is_archived() {
        let store = InMemoryHistoryStore::new();
        let img = ImagePayload::new(vec![1u8, 2, 3], MediaType::Png);
        let entry = run_submission(Arc::new(StubAnalysisClient::deterministic()),
                                   SessionConfig::default(),
                                   &store,
                                   request(Some(img))).await
                                                      .unwrap();
        assert_eq!(entry.result().confidence(), 87);
        assert_eq!(store.query(1, 0).first(), Some(&entry));
    }

    #[tokio::test]
    async fn test_backend_failure_is_not_archived() {
        let store = InMemoryHistoryStore::new();
        let stub = StubAnalysisClient::failing(AnalysisError::ServiceUnavailable("down".into()));
        let img = ImagePayload::new(vec![1u8], MediaType::Jpeg);
        let err = run_submission(Arc::new(stub), SessionConfig::default(), &store, request(Some(img))).await
                                                                                                      .unwrap_err();
        assert!(matches!(err, PipelineError::Failed(SessionFailure::Analysis(AnalysisError::ServiceUnavailable(_)))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_image_uses_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.PNG");
        std::fs::write(&path, [0x89u8, 0x50]).unwrap();
        let img = load_image(&path).unwrap();
        assert_eq!(img.media_type(), &MediaType::Png);
        assert_eq!(img.size_bytes(), 2);
        assert!(matches!(load_image(&dir.path().join("missing.jpg")), Err(PipelineError::ImageRead { .. })));
    }
}

use std::sync::Arc;

use dxflow::adapters::{PlainTextReportExporter, StubAnalysisClient};
use dxflow::core::{HistoryStore, ReportExporter, SessionConfig, SessionError};
use dxflow::domain::{AnalysisResult, ImagePayload, ImagingModality, MediaType, PatientLabel, ValidationError};
use dxflow::persistence::JsonlHistoryStore;
use dxflow::{run_submission, AppConfig, PipelineError, SubmissionRequest};

fn expected_result() -> AnalysisResult {
    AnalysisResult::new(87,
                        Some(vec!["Right upper lobe opacity".to_string()]),
                        "...",
                        ImagePayload::new(vec![9u8, 9, 9], MediaType::Png)).unwrap()
}

fn request(image: Option<ImagePayload>, patient: &str) -> SubmissionRequest {
    SubmissionRequest { image,
                        report_text: "cough, fever 3 days".into(),
                        patient: PatientLabel::new(patient).unwrap(),
                        modality: ImagingModality::ChestXRay }
}

#[tokio::test]
async fn png_submission_is_archived_to_disk_and_listed_first() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.jsonl");
    let store = JsonlHistoryStore::open(&path).unwrap();
    let stub = Arc::new(StubAnalysisClient::returning(expected_result()));

    let png = ImagePayload::new(vec![0x42u8; 2 * 1024 * 1024], MediaType::from_mime("image/png"));
    let older = run_submission(stub.clone(), SessionConfig::default(), &store, request(Some(png.clone()), "PT-2398")).await
                                                                                                                      .unwrap();
    let entry = run_submission(stub.clone(), SessionConfig::default(), &store, request(Some(png), "PT-2451")).await
                                                                                                             .unwrap();
    assert_eq!(entry.result(), &expected_result());
    assert_eq!(store.query(1, 0).first(), Some(&entry));
    drop(store);

    let reopened = JsonlHistoryStore::open(&path).unwrap();
    assert_eq!(reopened.query(10, 0).to_vec(), vec![entry.clone(), older]);

    let report = PlainTextReportExporter::new().export_entry(&entry).unwrap();
    let text = String::from_utf8(report.body).unwrap();
    assert!(text.contains("PT-2451"));
    assert!(text.contains("Right upper lobe opacity"));
    assert!(report.file_name.starts_with("report-PT-2451-"));
}

#[tokio::test]
async fn missing_image_records_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonlHistoryStore::open(dir.path().join("history.jsonl")).unwrap();
    let stub = Arc::new(StubAnalysisClient::deterministic());

    let err = run_submission(stub.clone(), SessionConfig::default(), &store, request(None, "PT-1")).await
                                                                                                   .unwrap_err();
    assert!(matches!(err, PipelineError::Session(SessionError::Validation(ValidationError::MissingImage))));
    assert!(store.is_empty());
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn configured_image_limit_is_enforced() {
    let cfg = AppConfig::from_lookup(|k| (k == "DXFLOW_MAX_IMAGE_BYTES").then(|| "16".to_string())).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = JsonlHistoryStore::open(dir.path().join("history.jsonl")).unwrap();
    let stub = Arc::new(StubAnalysisClient::deterministic());

    let img = ImagePayload::new(vec![1u8; 17], MediaType::Jpeg);
    let err = run_submission(stub.clone(), cfg.session_config(), &store, request(Some(img), "PT-1")).await
                                                                                                    .unwrap_err();
    assert!(matches!(err,
                     PipelineError::Session(SessionError::Validation(ValidationError::ImageTooLarge { size: 17, limit: 16 }))));
    assert_eq!(stub.calls(), 0);
}

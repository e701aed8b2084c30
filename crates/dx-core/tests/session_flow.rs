use std::sync::Arc;
use std::time::Duration;

use dx_adapters::StubAnalysisClient;
use dx_core::{HistoryStore, InMemoryHistoryStore, RetryPolicy, SessionConfig, SessionFailure, SessionStatus, SubmissionSession,
              SubmissionState};
use dx_domain::{AnalysisError, AnalysisResult, ImagePayload, ImagingModality, MediaType, PatientLabel, ValidationError};

fn png_2mb() -> ImagePayload {
    ImagePayload::new(vec![0x42u8; 2 * 1024 * 1024], MediaType::from_mime("image/png"))
}

fn expected_result() -> AnalysisResult {
    AnalysisResult::new(87,
                        Some(vec!["Right upper lobe opacity".to_string()]),
                        "...",
                        ImagePayload::new(vec![1u8, 2, 3, 4], MediaType::Png)).unwrap()
}

#[tokio::test]
async fn png_submission_completes_and_is_listed_first() {
    let store = InMemoryHistoryStore::new();
    let stub = Arc::new(StubAnalysisClient::returning(expected_result()));
    let mut session = SubmissionSession::new(stub.clone(), SessionConfig::default());

    let sub_id = session.submit(Some(png_2mb()), "cough, fever 3 days").unwrap();
    let state = session.wait().await;
    assert_eq!(state, &SubmissionState::Completed(expected_result()));

    session.archive(&store, PatientLabel::new("PT-2451").unwrap(), ImagingModality::ChestXRay).unwrap();
    let page = store.query(1, 0);
    let first = page.first().expect("entry listed");
    assert_eq!(first.submission_id(), sub_id);
    assert_eq!(first.result(), &expected_result());
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn missing_image_fails_and_records_nothing() {
    let store = InMemoryHistoryStore::new();
    let stub = Arc::new(StubAnalysisClient::deterministic());
    let mut session = SubmissionSession::new(stub.clone(), SessionConfig::default());

    let err = session.submit(None, "cough, fever 3 days").unwrap_err();
    assert_eq!(err, dx_core::SessionError::Validation(ValidationError::MissingImage));
    assert_eq!(session.state(),
               &SubmissionState::Failed(SessionFailure::Validation(ValidationError::MissingImage)));
    assert!(session.archive(&store, PatientLabel::new("PT-1").unwrap(), ImagingModality::CtScan).is_err());
    assert!(store.is_empty());
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn oversized_image_never_reaches_analyzing() {
    let stub = Arc::new(StubAnalysisClient::deterministic());
    let mut session = SubmissionSession::new(stub.clone(), SessionConfig::default());
    let big = ImagePayload::new(vec![0u8; 10 * 1024 * 1024 + 1], MediaType::Jpeg);
    let _ = session.submit(Some(big), "notes");
    assert_eq!(session.status(), SessionStatus::Failed);
    assert!(session.events().iter().all(|e| e.to != SessionStatus::Analyzing));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_while_analyzing_wins_over_backend() {
    let stub = Arc::new(StubAnalysisClient::returning(expected_result()).with_delay(Duration::from_secs(2)));
    let mut session = SubmissionSession::new(stub, SessionConfig::default());
    session.submit(Some(png_2mb()), "notes").unwrap();
    assert!(session.cancel());
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!session.poll_outcome());
    assert_eq!(session.wait().await,
               &SubmissionState::Failed(SessionFailure::Analysis(AnalysisError::Cancelled)));
}

#[tokio::test(start_paused = true)]
async fn caller_opt_in_retry_recovers_from_outage() {
    let stub = Arc::new(StubAnalysisClient::scripted([Err(AnalysisError::ServiceUnavailable("warming up".into())),
                                                      Ok(expected_result())]));
    let cfg = SessionConfig::default().with_retry(RetryPolicy::exponential(3, Duration::from_millis(100)));
    let mut session = SubmissionSession::new(stub.clone(), cfg);
    session.submit(Some(png_2mb()), "notes").unwrap();
    assert_eq!(session.wait().await, &SubmissionState::Completed(expected_result()));
    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn without_opt_in_outage_is_terminal() {
    let stub = Arc::new(StubAnalysisClient::scripted([Err(AnalysisError::ServiceUnavailable("down".into()))]));
    let mut session = SubmissionSession::new(stub.clone(), SessionConfig::default());
    session.submit(Some(png_2mb()), "notes").unwrap();
    let state = session.wait().await;
    assert!(matches!(state, SubmissionState::Failed(SessionFailure::Analysis(AnalysisError::ServiceUnavailable(_)))));
    assert_eq!(stub.calls(), 1);
}

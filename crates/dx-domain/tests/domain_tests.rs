use dx_domain::{AnalysisResult, HistoryEntry, ImagePayload, ImagingModality, InputValidator, MediaType, PatientLabel, ValidationError,
                DEFAULT_MAX_IMAGE_BYTES};

#[test]
fn test_images_over_ten_mib_are_rejected() {
    // Cualquier tamaño por encima del límite produce ImageTooLarge
    let v = InputValidator::default();
    for extra in [1u64, 7, 4096, 3 * 1024 * 1024] {
        let size = DEFAULT_MAX_IMAGE_BYTES + extra;
        let img = ImagePayload::new(vec![0u8; size as usize], MediaType::Jpeg);
        assert_eq!(v.validate(Some(&img), "notes"),
                   Err(ValidationError::ImageTooLarge { size,
                                                        limit: DEFAULT_MAX_IMAGE_BYTES }));
    }
}

#[test]
fn test_whitespace_reports_are_empty() {
    let v = InputValidator::default();
    let img = ImagePayload::new(vec![1u8; 16], MediaType::Png);
    for raw in ["", "   ", "\n\n", " \t \r\n "] {
        assert_eq!(v.validate(Some(&img), raw), Err(ValidationError::EmptyReport));
    }
}

#[test]
fn test_validated_input_keeps_trimmed_report_and_image() {
    let v = InputValidator::default();
    let img = ImagePayload::new(vec![9u8; 2 * 1024 * 1024], MediaType::from_mime("image/png"));
    let input = v.validate(Some(&img), "  cough, fever 3 days  ").unwrap();
    assert_eq!(input.report().as_str(), "cough, fever 3 days");
    assert_eq!(input.image(), &img);
}

#[test]
fn test_unsupported_and_empty_images() {
    let v = InputValidator::default();
    let bmp = ImagePayload::new(vec![1u8; 4], MediaType::from_mime("image/bmp"));
    assert_eq!(v.validate(Some(&bmp), "x"), Err(ValidationError::UnsupportedMediaType("image/bmp".into())));
    let empty = ImagePayload::new(Vec::new(), MediaType::Png);
    assert_eq!(v.validate(Some(&empty), "x"), Err(ValidationError::EmptyImage));
}

#[test]
fn test_history_entry_serde_roundtrip_keeps_labels() {
    let img = ImagePayload::new(vec![1u8, 2, 3], MediaType::Png);
    let result = AnalysisResult::new(95, Some(vec!["No abnormalities detected".into()]), "clear", img).unwrap();
    let entry = HistoryEntry::new(uuid::Uuid::new_v4(),
                                  chrono::Utc::now(),
                                  PatientLabel::new("PT-2398").unwrap(),
                                  ImagingModality::CtScan,
                                  result);
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["image_type"], "CT Scan");
    assert_eq!(json["patient_label"], "PT-2398");
    let back: HistoryEntry = serde_json::from_value(json).unwrap();
    assert_eq!(back, entry);
}

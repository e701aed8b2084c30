// dx-domain library entry point
pub mod analysis;
pub mod error;
pub mod history;
pub mod media;
pub mod report;
pub mod validator;

pub use analysis::AnalysisResult;
pub use error::{AnalysisError, ValidationError};
pub use history::{HistoryEntry, ImagingModality};
pub use media::{ImagePayload, MediaType};
pub use report::{PatientLabel, ReportText};
pub use validator::{InputValidator, ValidatedInput, DEFAULT_MAX_IMAGE_BYTES};

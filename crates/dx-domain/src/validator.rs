//! Validación de entrada previa a cualquier envío.
//!
//! Función pura de sus entradas: no registra, no asigna ids, no toca estado.
//! Orden de comprobación: imagen ausente, tipo, imagen vacía, tamaño, texto.

use crate::{ImagePayload, ReportText, ValidationError};

/// Límite por defecto del tamaño de imagen (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputValidator {
    max_image_bytes: u64,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self { max_image_bytes: DEFAULT_MAX_IMAGE_BYTES }
    }
}

impl InputValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_image_bytes(mut self, limit: u64) -> Self {
        self.max_image_bytes = limit;
        self
    }

    pub fn max_image_bytes(&self) -> u64 {
        self.max_image_bytes
    }

    pub fn validate(&self, image: Option<&ImagePayload>, report_text: &str) -> Result<ValidatedInput, ValidationError> {
        let image = image.ok_or(ValidationError::MissingImage)?;
        if !image.media_type().is_accepted() {
            return Err(ValidationError::UnsupportedMediaType(image.media_type().mime().to_string()));
        }
        let size = image.size_bytes();
        if size == 0 {
            return Err(ValidationError::EmptyImage);
        }
        if size > self.max_image_bytes {
            return Err(ValidationError::ImageTooLarge { size,
                                                        limit: self.max_image_bytes });
        }
        let report = ReportText::parse(report_text)?;
        Ok(ValidatedInput { image: image.clone(),
                            report })
    }
}

/// Entrada que superó `InputValidator::validate`; segura para el backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    image: ImagePayload,
    report: ReportText,
}

impl ValidatedInput {
    pub fn image(&self) -> &ImagePayload { &self.image }
    pub fn report(&self) -> &ReportText { &self.report }
    pub fn into_parts(self) -> (ImagePayload, ReportText) {
        (self.image, self.report)
    }
}

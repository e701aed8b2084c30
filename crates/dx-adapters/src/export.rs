use std::fmt::Write as _;

use dx_core::{ExportError, ExportedReport, ReportExporter, ReportView};

/// Informe en texto plano con las secciones del dashboard: cabecera del
/// paciente, confianza, hallazgos clave y análisis detallado.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextReportExporter;

impl PlainTextReportExporter {
    pub fn new() -> Self {
        Self
    }

    fn render(view: &ReportView<'_>) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        writeln!(out, "Diagnostic Analysis Report")?;
        writeln!(out, "==========================")?;
        writeln!(out, "Patient:    {}", view.patient_label)?;
        writeln!(out, "Image type: {}", view.image_type)?;
        writeln!(out, "Date:       {}", view.timestamp.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(out, "Submission: {}", view.submission_id)?;
        writeln!(out, "Confidence: {}%", view.result.confidence())?;
        writeln!(out)?;
        writeln!(out, "Key Findings:")?;
        if view.result.findings().is_empty() {
            writeln!(out, "  (none reported)")?;
        }
        for finding in view.result.findings() {
            writeln!(out, "  • {finding}")?;
        }
        writeln!(out)?;
        writeln!(out, "Detailed Analysis:")?;
        writeln!(out, "{}", view.result.narrative())?;
        Ok(out)
    }
}

impl ReportExporter for PlainTextReportExporter {
    fn format(&self) -> &str {
        "text/plain"
    }

    fn export(&self, view: ReportView<'_>) -> Result<ExportedReport, ExportError> {
        let body = Self::render(&view).map_err(|e| ExportError::Render(e.to_string()))?;
        Ok(ExportedReport { file_name: format!("report-{}-{}.txt",
                                               file_stem(view.patient_label.as_str()),
                                               view.timestamp.format("%Y%m%d")),
                            content_type: "text/plain; charset=utf-8".to_string(),
                            body: body.into_bytes() })
    }
}

/// Sólo `[A-Za-z0-9_-]`; cualquier otro carácter pasa a `_` para que el
/// nombre no pueda escapar del directorio de destino.
fn file_stem(label: &str) -> String {
    label.chars()
         .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
         .collect()
}

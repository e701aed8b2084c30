//! CLI de dxflow: analizar un envío, listar el historial y exportar informes.
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use dx_adapters::{HttpAnalysisClient, PlainTextReportExporter, StubAnalysisClient};
use dx_core::{AnalysisClient, HistoryStore, ReportExporter};
use dx_domain::{ImagingModality, PatientLabel};
use dx_persistence::JsonlHistoryStore;
use dxflow::{load_image, run_submission, AppConfig, SubmissionRequest};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "dxflow")]
#[command(about = "Diagnostic image + clinical report submission pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Envía una imagen y un informe al servicio de análisis
    Analyze {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        report: String,
        #[arg(long)]
        patient: String,
        /// Modalidad: "Chest X-Ray", "CT Scan", ...
        #[arg(long, default_value = "Chest X-Ray")]
        modality: String,
        /// Usa el cliente de análisis local determinista
        #[arg(long)]
        stub: bool,
    },
    /// Lista el historial, más reciente primero
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Imprime el informe en texto plano de un envío archivado
    Export {
        #[arg(long)]
        submission: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
                             .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let store = JsonlHistoryStore::open(config.history_path()).with_context(|| {
                                                                    format!("opening history {}", config.history_path().display())
                                                                })?;

    match cli.command {
        Commands::Analyze { image,
                            report,
                            patient,
                            modality,
                            stub, } => {
            let client: Arc<dyn AnalysisClient> = if stub {
                Arc::new(StubAnalysisClient::deterministic())
            } else {
                Arc::new(HttpAnalysisClient::new(&config.analysis.base_url)?)
            };
            let request = SubmissionRequest { image: Some(load_image(&image)?),
                                              report_text: report,
                                              patient: PatientLabel::new(&patient)?,
                                              modality: ImagingModality::parse(&modality) };
            let entry = run_submission(client, config.session_config(), &store, request).await?;
            let result = entry.result();
            println!("submission {}", entry.submission_id());
            println!("confidence {}%", result.confidence());
            for finding in result.findings() {
                println!("  • {finding}");
            }
            println!("{}", result.narrative());
        }
        Commands::History { limit, offset } => {
            let page = store.query(limit, offset);
            if page.is_empty() {
                println!("(no entries)");
            }
            for entry in &page {
                println!("{}  {}  {:<12} {:<12} {:>3}%  {}",
                         entry.timestamp().format("%Y-%m-%d %H:%M:%S"),
                         entry.submission_id(),
                         entry.patient_label(),
                         entry.image_type(),
                         entry.result().confidence(),
                         entry.result().summary());
            }
        }
        Commands::Export { submission } => {
            let all = store.query(store.len(), 0);
            let entry = all.iter()
                           .find(|e| e.submission_id() == submission)
                           .ok_or_else(|| anyhow!("submission {submission} not found in history"))?;
            let report = PlainTextReportExporter::new().export_entry(entry)?;
            log::info!("exported {}", report.file_name);
            std::io::stdout().write_all(&report.body)?;
        }
    }
    Ok(())
}

use std::path::PathBuf;

use medsum_config::Config;
use medsum_core::{MedicalReport, ReportRepository, StorageError, load_reports_from_file};
use medsum_extraction::ExtractionEngine;
use tracing::{info, warn};

/// Input parameters for the ingest strategy.
#[derive(Debug, Clone)]
pub struct IngestInput {
    /// Reports file; `demo.reports_file` from config when absent.
    pub file: Option<PathBuf>,
    /// Report type label; `demo.report_type` from config when absent.
    pub report_type: Option<String>,
    /// Print database statistics after ingesting.
    pub show_stats: bool,
}

/// Strategy that extracts every report in a file and stores it.
///
/// Backs both `demo` (with stats) and `process` (without).
#[derive(Debug, Clone, Copy)]
pub struct IngestStrategy;

impl super::CommandStrategy for IngestStrategy {
    type Input = IngestInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let show_stats = input.show_stats;

        let path = input
            .file
            .unwrap_or_else(|| config.demo.reports_file.clone());
        let texts = load_reports_from_file(&path)?;
        if texts.is_empty() {
            warn!("No reports found in {}", path.display());
        }

        let engine = ExtractionEngine::new(config.extraction.clone())?;
        let report_type = input
            .report_type
            .unwrap_or_else(|| config.demo.report_type.clone());

        let store = super::open_store(&config).await?;
        let outcome = async {
            for (id, report) in ingest(&engine, &store, &texts, &report_type).await? {
                println!("Report saved with ID: {id}");
                println!("Summary: {}\n", report.summary);
            }

            if show_stats {
                let stats = store.get_stats().await?;
                println!("Database Stats: {stats}");
            }
            Ok::<_, anyhow::Error>(())
        }
        .await;

        store.close().await?;
        outcome
    }
}

/// Extract each text and save it, returning the new ids in input order.
pub async fn ingest<R: ReportRepository>(
    engine: &ExtractionEngine,
    repo: &R,
    texts: &[String],
    report_type: &str,
) -> Result<Vec<(i64, MedicalReport)>, StorageError> {
    let mut saved = Vec::with_capacity(texts.len());
    for text in texts {
        let report = engine.process_report(text, report_type);
        let id = repo.save(&report).await?;
        saved.push((id, report));
    }

    info!("Ingested {} reports", saved.len());
    Ok(saved)
}

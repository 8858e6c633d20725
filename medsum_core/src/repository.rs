use async_trait::async_trait;

use crate::error::Result;
use crate::report::{MedicalReport, ReportStats, StoredReport};

/// Persistence for extracted medical reports.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Persist a report and return its generated id.
    async fn save(&self, report: &MedicalReport) -> Result<i64>;

    async fn get_report(&self, id: i64) -> Result<Option<StoredReport>>;

    /// All reports of one patient, oldest `report_date` first.
    async fn get_patient_reports(&self, patient_id: &str) -> Result<Vec<StoredReport>>;

    /// Reports whose raw text, diagnosis or symptoms contain `term`,
    /// ignoring case.
    async fn search_reports(&self, term: &str) -> Result<Vec<StoredReport>>;

    async fn get_stats(&self) -> Result<ReportStats>;
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Patient id used when no identifier could be found in the text.
pub const UNKNOWN_PATIENT: &str = "UNKNOWN";

/// Structured fields extracted from one unstructured report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalReport {
    pub patient_id: String,
    /// ISO date, `YYYY-MM-DD`.
    pub report_date: String,
    pub report_type: String,
    pub diagnosis: Option<String>,
    pub symptoms: Vec<String>,
    pub medications: Vec<String>,
    /// Canonical lowercase test name to measured value.
    pub lab_values: BTreeMap<String, String>,
    pub summary: String,
    pub raw_text: String,
}

/// How many entries of each list the one-line summary shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLimits {
    pub symptoms: usize,
    pub medications: usize,
    pub labs: usize,
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self {
            symptoms: 3,
            medications: 3,
            labs: 2,
        }
    }
}

impl MedicalReport {
    /// Derive the one-line summary from the other fields.
    ///
    /// The result depends only on the structured fields, never on `raw_text`
    /// or the current `summary`. Labs are listed in `lab_values` key order,
    /// which is alphabetical by test name, not the order the patterns run in.
    #[must_use]
    pub fn summarize(&self, limits: SummaryLimits) -> String {
        let mut parts = vec![
            format!("Patient: {}", self.patient_id),
            format!("Date: {}", self.report_date),
            format!("Type: {}", self.report_type),
        ];

        if let Some(diagnosis) = &self.diagnosis {
            parts.push(format!("Diagnosis: {diagnosis}"));
        }

        if !self.symptoms.is_empty() {
            parts.push(format!(
                "Symptoms: {}",
                head(&self.symptoms, limits.symptoms).join(", ")
            ));
        }

        if !self.medications.is_empty() {
            parts.push(format!(
                "Medications: {}",
                head(&self.medications, limits.medications).join(", ")
            ));
        }

        if !self.lab_values.is_empty() {
            let labs = self
                .lab_values
                .iter()
                .take(limits.labs)
                .map(|(test, value)| format!("{test}={value}"))
                .collect::<Vec<_>>();
            parts.push(format!("Labs: {}", labs.join(", ")));
        }

        parts.join(" | ")
    }

    /// Recompute `summary` in place and return the report.
    #[must_use]
    pub fn with_summary(mut self, limits: SummaryLimits) -> Self {
        self.summary = self.summarize(limits);
        self
    }

    /// Case-insensitive substring match against raw text, diagnosis and
    /// symptoms. `needle` must already be lowercase; an empty needle matches
    /// every report.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.raw_text.to_lowercase().contains(needle)
            || self
                .diagnosis
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
            || self
                .symptoms
                .iter()
                .any(|s| s.to_lowercase().contains(needle))
    }
}

fn head(items: &[String], limit: usize) -> &[String] {
    &items[..items.len().min(limit)]
}

/// A report as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredReport {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: MedicalReport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    pub total_reports: u64,
    pub unique_patients: u64,
    pub report_types: BTreeMap<String, u64>,
}

impl std::fmt::Display for ReportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} reports, {} patients",
            self.total_reports, self.unique_patients
        )?;
        for (report_type, count) in &self.report_types {
            write!(f, "\n  {report_type}: {count}")?;
        }
        Ok(())
    }
}

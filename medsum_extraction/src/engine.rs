//! Extraction engine turning raw report text into a [`MedicalReport`].
//!
//! Extraction is best-effort: every field falls back to an empty or default
//! value when its pattern does not match, so processing a report never fails.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use medsum_core::{MedicalReport, SummaryLimits, UNKNOWN_PATIENT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::patterns::{
    COMMON_MEDICATIONS, DEFAULT_LAB_MATCHERS, DIAGNOSIS_SECTIONS, DOSAGE, LabMatcher,
    LabPatternDef, PATIENT_ID, PATIENT_TOKEN, PatternError, REPORT_DATE, SYMPTOMS, WHITESPACE,
};

const ISO_DATE: &str = "%Y-%m-%d";
const US_DATE: &str = "%m/%d/%Y";

/// Configuration for the extraction engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Report type used when the caller passes a blank label.
    #[serde(default = "ExtractionConfig::default_report_type")]
    pub default_report_type: String,

    /// Longest diagnosis kept, in characters.
    #[serde(default = "ExtractionConfig::default_diagnosis_max_chars")]
    pub diagnosis_max_chars: usize,

    #[serde(default)]
    pub summary: SummaryLimits,

    /// Lab patterns applied after the built-in ones.
    #[serde(default)]
    pub extra_lab_patterns: Vec<LabPatternDef>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_report_type: Self::default_report_type(),
            diagnosis_max_chars: Self::default_diagnosis_max_chars(),
            summary: SummaryLimits::default(),
            extra_lab_patterns: Vec::new(),
        }
    }
}

impl ExtractionConfig {
    fn default_report_type() -> String {
        "General".to_string()
    }

    const fn default_diagnosis_max_chars() -> usize {
        200
    }
}

/// Keyword and pattern scanner for medical report text.
pub struct ExtractionEngine {
    lab_matchers: Vec<LabMatcher>,
    config: ExtractionConfig,
}

impl ExtractionEngine {
    /// Create an engine, compiling any extra lab patterns from `config`.
    pub fn new(config: ExtractionConfig) -> Result<Self, PatternError> {
        let mut lab_matchers = (*DEFAULT_LAB_MATCHERS).clone();
        for def in &config.extra_lab_patterns {
            let matcher = def.build()?;
            // A configured pattern replaces the built-in one of the same name.
            lab_matchers.retain(|m| m.name != matcher.name);
            lab_matchers.push(matcher);
        }

        Ok(Self {
            lab_matchers,
            config,
        })
    }

    /// Engine with the built-in vocabulary only.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            lab_matchers: (*DEFAULT_LAB_MATCHERS).clone(),
            config: ExtractionConfig::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract a report, dating undated text with today's local date.
    #[must_use]
    pub fn process_report(&self, text: &str, report_type: &str) -> MedicalReport {
        self.process_report_on(text, report_type, Local::now().date_naive())
    }

    /// Extract a report, dating undated text with `today`.
    #[must_use]
    pub fn process_report_on(&self, text: &str, report_type: &str, today: NaiveDate) -> MedicalReport {
        let report_type = if report_type.trim().is_empty() {
            self.config.default_report_type.clone()
        } else {
            report_type.trim().to_string()
        };

        let report = MedicalReport {
            patient_id: Self::extract_patient_id(text),
            report_date: Self::extract_report_date(text, today),
            report_type,
            diagnosis: self.extract_diagnosis(text),
            symptoms: Self::extract_symptoms(text),
            medications: Self::extract_medications(text),
            lab_values: self.extract_lab_values(text),
            summary: String::new(),
            raw_text: text.to_string(),
        }
        .with_summary(self.config.summary);

        debug!(
            "Extracted report for {}: {} symptoms, {} medications, {} labs",
            report.patient_id,
            report.symptoms.len(),
            report.medications.len(),
            report.lab_values.len()
        );

        report
    }

    #[must_use]
    pub fn extract_patient_id(text: &str) -> String {
        [&*PATIENT_ID, &*PATIENT_TOKEN]
            .iter()
            .find_map(|re| re.captures(text).and_then(|caps| caps.get(1)))
            .map_or_else(|| UNKNOWN_PATIENT.to_string(), |m| m.as_str().to_string())
    }

    /// The labelled report date as `YYYY-MM-DD`, or `today` when absent or
    /// not a real calendar date.
    #[must_use]
    pub fn extract_report_date(text: &str, today: NaiveDate) -> String {
        REPORT_DATE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| {
                NaiveDate::parse_from_str(m.as_str(), US_DATE)
                    .or_else(|_| NaiveDate::parse_from_str(m.as_str(), ISO_DATE))
                    .ok()
            })
            .unwrap_or(today)
            .format(ISO_DATE)
            .to_string()
    }

    #[must_use]
    pub fn extract_symptoms(text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        SYMPTOMS
            .iter()
            .filter(|symptom| lower.contains(*symptom))
            .map(ToString::to_string)
            .collect()
    }

    /// Known drugs in vocabulary order, then any other `<name> <n> mg`
    /// mention in order of appearance.
    #[must_use]
    pub fn extract_medications(text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut found: Vec<String> = COMMON_MEDICATIONS
            .iter()
            .filter(|med| lower.contains(*med))
            .map(ToString::to_string)
            .collect();

        for caps in DOSAGE.captures_iter(text) {
            let Some(name) = caps.get(1) else { continue };
            let name = name.as_str().to_lowercase();
            if !found.contains(&name) {
                found.push(name);
            }
        }

        found
    }

    #[must_use]
    pub fn extract_lab_values(&self, text: &str) -> BTreeMap<String, String> {
        self.lab_matchers
            .iter()
            .filter_map(|matcher| {
                matcher
                    .find(text)
                    .map(|value| (matcher.name.clone(), value.to_string()))
            })
            .collect()
    }

    /// First non-empty diagnosis, impression or assessment section, with
    /// whitespace collapsed and length capped.
    #[must_use]
    pub fn extract_diagnosis(&self, text: &str) -> Option<String> {
        DIAGNOSIS_SECTIONS.iter().find_map(|section| {
            let body = section.captures(text)?.get(1)?.as_str();
            let collapsed = WHITESPACE.replace_all(body.trim(), " ");
            let capped: String = collapsed
                .chars()
                .take(self.config.diagnosis_max_chars)
                .collect();
            let capped = capped.trim_end();
            (!capped.is_empty()).then(|| capped.to_string())
        })
    }
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

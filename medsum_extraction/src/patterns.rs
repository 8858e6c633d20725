//! Fixed clinical vocabulary and compiled extraction patterns.
//!
//! Everything here is compiled once on first use and shared by every
//! [`ExtractionEngine`](crate::ExtractionEngine). Additional lab patterns can
//! be supplied through configuration as [`LabPatternDef`]s.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symptom keywords, matched as case-insensitive substrings in this order.
pub const SYMPTOMS: &[&str] = &[
    "fever",
    "headache",
    "nausea",
    "vomiting",
    "diarrhea",
    "fatigue",
    "chest pain",
    "shortness of breath",
    "dizziness",
    "cough",
    "rash",
    "abdominal pain",
    "back pain",
    "joint pain",
    "muscle pain",
];

/// Commonly prescribed drugs recognised without a dosage.
pub const COMMON_MEDICATIONS: &[&str] = &[
    "acetaminophen",
    "ibuprofen",
    "aspirin",
    "lisinopril",
    "metformin",
    "atorvastatin",
    "amlodipine",
    "omeprazole",
    "losartan",
    "gabapentin",
];

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid regex for lab '{name}': {source}")]
    Regex {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("lab name '{0}' must be lowercase letters, digits or '_'")]
    Name(String),

    #[error("pattern for lab '{0}' has no capture group for the value")]
    MissingCapture(String),
}

/// Serializable definition of a lab-value pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabPatternDef {
    /// Canonical test name used as the `lab_values` key.
    pub name: String,

    /// Regex whose first capture group is the measured value.
    pub pattern: String,
}

impl LabPatternDef {
    fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
        }
    }

    /// Compile into a [`LabMatcher`].
    pub fn build(&self) -> Result<LabMatcher, PatternError> {
        let canonical = !self.name.is_empty()
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !canonical {
            return Err(PatternError::Name(self.name.clone()));
        }

        let regex = Regex::new(&self.pattern).map_err(|source| PatternError::Regex {
            name: self.name.clone(),
            source,
        })?;
        if regex.captures_len() < 2 {
            return Err(PatternError::MissingCapture(self.name.clone()));
        }

        Ok(LabMatcher {
            name: self.name.clone(),
            regex,
        })
    }
}

/// A compiled lab-value matcher.
#[derive(Debug, Clone)]
pub struct LabMatcher {
    pub name: String,
    regex: Regex,
}

impl LabMatcher {
    /// Value of the first match in `text`, if any.
    #[must_use]
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|v| !v.is_empty())
    }
}

/// Built-in lab-value patterns, keyed by canonical test name.
#[must_use]
pub fn default_lab_patterns() -> Vec<LabPatternDef> {
    vec![
        LabPatternDef::new("glucose", r"(?i)\bglucose[:\s]+(\d+(?:\.\d+)?)"),
        LabPatternDef::new("hemoglobin", r"(?i)\b(?:hemoglobin|hgb)[:\s]+(\d+(?:\.\d+)?)"),
        LabPatternDef::new("cholesterol", r"(?i)\bcholesterol[:\s]+(\d+(?:\.\d+)?)"),
        LabPatternDef::new("blood_pressure", r"(?i)\b(?:bp|blood pressure)[:\s]+(\d+/\d+)"),
        LabPatternDef::new("temperature", r"(?i)\btemp(?:erature)?[:\s]+(\d+(?:\.\d+)?)"),
        LabPatternDef::new("heart_rate", r"(?i)\b(?:hr|heart rate|pulse)[:\s]+(\d+)"),
        LabPatternDef::new(
            "oxygen_saturation",
            r"(?i)\b(?:spo2|o2 sat(?:uration)?)[:\s]+(\d+(?:\.\d+)?)",
        ),
    ]
}

#[expect(
    clippy::expect_used,
    reason = "built-in patterns are literals exercised by the unit tests"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

pub(crate) static DEFAULT_LAB_MATCHERS: Lazy<Vec<LabMatcher>> = Lazy::new(|| {
    default_lab_patterns()
        .iter()
        .filter_map(|def| def.build().ok())
        .collect()
});

/// `Patient ID: X`, `MRN: X` or `ID: X`.
pub(crate) static PATIENT_ID: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\b(?:patient\s+id|mrn|id)\b[:\s]+([A-Za-z0-9\-]+)"));

/// `Patient P-001`: a bare token after "patient" that contains a digit.
pub(crate) static PATIENT_TOKEN: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\bpatient[:\s]+([A-Za-z]*-?\d[A-Za-z0-9\-]*)"));

pub(crate) static REPORT_DATE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\bdate\b[:\s]+(\d{1,2}/\d{1,2}/\d{4}|\d{4}-\d{2}-\d{2})")
});

/// A drug name followed by a whole-number dosage in milligrams. Fractional
/// doses are skipped so "Take 0.5 mg" does not yield "take".
pub(crate) static DOSAGE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\b([A-Za-z]+)\s+\d+\s*mg\b"));

/// Section headings that introduce the diagnosis, in priority order. A section
/// ends at a blank line, at a new line starting with a capital letter, or at
/// end of text.
pub(crate) static DIAGNOSIS_SECTIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["diagnosis", "impression", "assessment"]
        .iter()
        .map(|heading| compile(&format!(r"(?s)\b(?i:{heading})[:\s]+(.*?)(?:\n\n|\n[A-Z]|$)")))
        .collect()
});

pub(crate) static WHITESPACE: Lazy<Regex> = Lazy::new(|| compile(r"\s+"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_default_lab_patterns_compile() {
        assert_eq!(DEFAULT_LAB_MATCHERS.len(), default_lab_patterns().len());
        for matcher in DEFAULT_LAB_MATCHERS.iter() {
            assert_eq!(matcher.name, matcher.name.to_lowercase());
        }
    }

    #[test]
    fn static_patterns_compile() {
        assert!(PATIENT_ID.is_match("MRN: 123"));
        assert!(PATIENT_TOKEN.is_match("Patient P-001"));
        assert!(REPORT_DATE.is_match("Date: 7/26/2025"));
        assert!(DOSAGE.is_match("lisinopril 10mg"));
        assert_eq!(DIAGNOSIS_SECTIONS.len(), 3);
        assert!(WHITESPACE.is_match(" "));
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn lab_matcher_finds_first_value() {
        let matcher = LabPatternDef::new("glucose", r"(?i)\bglucose[:\s]+(\d+(?:\.\d+)?)")
            .build()
            .expect("valid pattern should build");
        assert_eq!(matcher.find("Glucose: 105.5, glucose 99"), Some("105.5"));
        assert_eq!(matcher.find("no labs"), None);
    }

    #[test]
    fn lab_def_rejects_non_canonical_name() {
        let err = LabPatternDef::new("Blood Sugar", r"sugar (\d+)").build();
        assert!(matches!(err, Err(PatternError::Name(_))));
    }

    #[test]
    fn lab_def_requires_capture_group() {
        let err = LabPatternDef::new("ldl", r"ldl \d+").build();
        assert!(matches!(err, Err(PatternError::MissingCapture(_))));
    }

    #[test]
    fn lab_def_rejects_bad_regex() {
        let err = LabPatternDef::new("ldl", r"ldl (\d+").build();
        assert!(matches!(err, Err(PatternError::Regex { .. })));
    }
}

use std::collections::BTreeMap;

use medsum_core::{MedicalReport, StorageError, StoredReport};
use medsum_entities::reports;
use serde::de::DeserializeOwned;

fn decode<T: DeserializeOwned>(id: i32, column: &str, raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Corrupt {
        id: i64::from(id),
        reason: format!("{column}: {e}"),
    })
}

pub fn stored_report_from_model(m: reports::Model) -> Result<StoredReport, StorageError> {
    let symptoms: Vec<String> = decode(m.id, "symptoms", &m.symptoms)?;
    let medications: Vec<String> = decode(m.id, "medications", &m.medications)?;
    let lab_values: BTreeMap<String, String> = decode(m.id, "lab_values", &m.lab_values)?;

    Ok(StoredReport {
        id: i64::from(m.id),
        created_at: m.created_at,
        report: MedicalReport {
            patient_id: m.patient_id,
            report_date: m.report_date,
            report_type: m.report_type,
            diagnosis: m.diagnosis,
            symptoms,
            medications,
            lab_values,
            summary: m.summary,
            raw_text: m.raw_text,
        },
    })
}

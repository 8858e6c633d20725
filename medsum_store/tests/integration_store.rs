//! Integration tests for the report store.
//!
//! These tests verify that:
//! - Saved reports come back per patient, oldest first, same-day ones by id
//! - Keyword search is a case-insensitive substring match
//! - Stats agree with what was saved
//! - The store survives close and reopen on a file database

use chrono::NaiveDate;
use medsum_core::MedicalReport;
use medsum_extraction::ExtractionEngine;
use medsum_store::{ReportRepository, ReportStore};

async fn memory_store() -> ReportStore {
    ReportStore::open("sqlite::memory:")
        .await
        .expect("in-memory database should open")
}

fn extract(text: &str, report_type: &str) -> MedicalReport {
    let today = NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid calendar date");
    ExtractionEngine::with_defaults().process_report_on(text, report_type, today)
}

#[tokio::test]
async fn test_save_and_fetch_by_patient_in_date_order() {
    let store = memory_store().await;

    let later = extract("Patient ID: P-001\nDate: 03/15/2025\ncough", "Follow-up");
    let earlier = extract("Patient ID: P-001\nDate: 01/02/2025\nfever", "Primary Care");
    let other = extract("Patient ID: P-002\nDate: 02/01/2025\nrash", "Dermatology");

    let later_id = store.save(&later).await.expect("save should succeed");
    let earlier_id = store.save(&earlier).await.expect("save should succeed");
    store.save(&other).await.expect("save should succeed");
    assert_ne!(later_id, earlier_id);

    let reports = store
        .get_patient_reports("P-001")
        .await
        .expect("query should succeed");
    let dates: Vec<&str> = reports
        .iter()
        .map(|r| r.report.report_date.as_str())
        .collect();
    assert_eq!(dates, vec!["2025-01-02", "2025-03-15"]);
    assert_eq!(reports[0].id, earlier_id);
    assert_eq!(reports[0].report, earlier);
    assert_eq!(reports[1].report, later);

    store.close().await.expect("close should succeed");
}

#[tokio::test]
async fn test_unknown_patient_has_no_reports() {
    let store = memory_store().await;
    store
        .save(&extract("Patient ID: A-1 fever", "General"))
        .await
        .expect("save should succeed");

    let reports = store
        .get_patient_reports("Z-9")
        .await
        .expect("query should succeed");
    assert!(reports.is_empty());
}

#[tokio::test]
async fn test_get_report_round_trip() {
    let store = memory_store().await;
    let report = extract(
        "MRN: 55\nBP 130/85 Glucose: 101\nImpression: Prediabetes",
        "Lab",
    );
    let id = store.save(&report).await.expect("save should succeed");

    let stored = store
        .get_report(id)
        .await
        .expect("query should succeed")
        .expect("saved report should exist");
    assert_eq!(stored.id, id);
    assert_eq!(stored.report, report);
    assert_eq!(stored.report.diagnosis.as_deref(), Some("Prediabetes"));

    assert!(
        store
            .get_report(id + 1000)
            .await
            .expect("query should succeed")
            .is_none()
    );
    assert!(
        store
            .get_report(i64::MAX)
            .await
            .expect("query should succeed")
            .is_none()
    );
}

#[tokio::test]
async fn test_search_is_case_insensitive_substring() {
    let store = memory_store().await;
    let pneumonia = store
        .save(&extract(
            "Patient ID: A-1\nDate: 05/01/2025\nDiagnosis: Pneumonia",
            "Radiology",
        ))
        .await
        .expect("save should succeed");
    let chest = store
        .save(&extract(
            "Patient ID: B-2\nDate: 04/01/2025\nCHEST PAIN since morning",
            "ER",
        ))
        .await
        .expect("save should succeed");
    store
        .save(&extract("Patient ID: C-3\nroutine checkup", "General"))
        .await
        .expect("save should succeed");

    let hits = store
        .search_reports("pneumo")
        .await
        .expect("search should succeed");
    assert_eq!(hits.iter().map(|r| r.id).collect::<Vec<_>>(), vec![pneumonia]);

    let hits = store
        .search_reports("Chest Pain")
        .await
        .expect("search should succeed");
    assert_eq!(hits.iter().map(|r| r.id).collect::<Vec<_>>(), vec![chest]);

    let hits = store
        .search_reports("patient id")
        .await
        .expect("search should succeed");
    assert_eq!(hits.len(), 3);
    let dates: Vec<&str> = hits.iter().map(|r| r.report.report_date.as_str()).collect();
    let mut sorted = dates.clone();
    sorted.sort_unstable();
    assert_eq!(dates, sorted);

    assert!(
        store
            .search_reports("asthma")
            .await
            .expect("search should succeed")
            .is_empty()
    );
}

#[tokio::test]
async fn test_blank_search_terms_are_plain_substrings() {
    let store = memory_store().await;
    let spaced = store
        .save(&extract("Patient ID: A-1 has fever", "General"))
        .await
        .expect("save should succeed");
    let single_word = store
        .save(&extract("cough", "General"))
        .await
        .expect("save should succeed");

    let everything = store
        .search_reports("")
        .await
        .expect("search should succeed");
    let mut ids: Vec<i64> = everything.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![spaced, single_word]);

    let with_space = store
        .search_reports(" ")
        .await
        .expect("search should succeed");
    assert_eq!(with_space.iter().map(|r| r.id).collect::<Vec<_>>(), vec![spaced]);

    assert!(
        store
            .search_reports("   ")
            .await
            .expect("search should succeed")
            .is_empty()
    );
}

#[tokio::test]
async fn test_same_day_reports_keep_insertion_order() {
    let store = memory_store().await;
    let mut saved = Vec::new();
    for text in [
        "Patient ID: T-1\nDate: 06/01/2025\nfever",
        "Patient ID: T-1\nDate: 06/01/2025\ncough",
        "Patient ID: T-1\nDate: 06/01/2025\nrash",
    ] {
        saved.push(
            store
                .save(&extract(text, "General"))
                .await
                .expect("save should succeed"),
        );
    }
    assert!(saved.windows(2).all(|pair| pair[0] < pair[1]));

    let by_patient = store
        .get_patient_reports("T-1")
        .await
        .expect("query should succeed");
    assert_eq!(by_patient.iter().map(|r| r.id).collect::<Vec<_>>(), saved);

    let by_term = store
        .search_reports("t-1")
        .await
        .expect("search should succeed");
    assert_eq!(by_term.iter().map(|r| r.id).collect::<Vec<_>>(), saved);
}

#[tokio::test]
async fn test_stats_count_reports_types_and_patients() {
    let store = memory_store().await;

    let empty = store.get_stats().await.expect("stats should succeed");
    assert_eq!(empty.total_reports, 0);
    assert_eq!(empty.unique_patients, 0);
    assert!(empty.report_types.is_empty());

    for (text, report_type) in [
        ("Patient ID: A-1 fever", "Imported"),
        ("Patient ID: A-1 cough", "Imported"),
        ("Patient ID: B-2 rash", "Dermatology"),
        ("no identifier at all", "Imported"),
    ] {
        store
            .save(&extract(text, report_type))
            .await
            .expect("save should succeed");
    }

    let stats = store.get_stats().await.expect("stats should succeed");
    assert_eq!(stats.total_reports, 4);
    assert_eq!(stats.unique_patients, 3);
    assert_eq!(stats.report_types.get("Imported"), Some(&3));
    assert_eq!(stats.report_types.get("Dermatology"), Some(&1));
    assert_eq!(
        stats.report_types.values().sum::<u64>(),
        stats.total_reports
    );
}

#[tokio::test]
async fn test_file_database_persists_across_reopen() {
    let path = std::env::temp_dir().join(format!("medsum-store-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let store = ReportStore::open(&url).await.expect("file database should open");
    let id = store
        .save(&extract("Patient ID: K-7 headache", "General"))
        .await
        .expect("save should succeed");
    store.close().await.expect("close should succeed");

    let reopened = ReportStore::open(&url).await.expect("file database should reopen");
    let reports = reopened
        .get_patient_reports("K-7")
        .await
        .expect("query should succeed");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, id);
    reopened.close().await.expect("close should succeed");

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_unreachable_database_is_storage_error() {
    let result = ReportStore::open("sqlite:/nonexistent-dir/medsum/reports.db").await;
    assert!(matches!(
        result,
        Err(medsum_store::StorageError::Unavailable(_))
    ));
}

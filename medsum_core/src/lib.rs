#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

pub mod error;
pub mod loader;
pub mod report;
pub mod repository;

pub use error::{LoadError, StorageError};
pub use loader::{load_reports_from_file, split_reports};
pub use report::{MedicalReport, ReportStats, StoredReport, SummaryLimits, UNKNOWN_PATIENT};
pub use repository::ReportRepository;

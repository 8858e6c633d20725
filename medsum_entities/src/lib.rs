//! sea-orm entities for the report database.

pub mod reports;

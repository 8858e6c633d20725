//! SQLite-backed report store.
//!
//! A single `reports` table holds every extracted report. The store owns one
//! database connection for its whole lifetime; call [`ReportStore::close`]
//! when done.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use medsum_core::{MedicalReport, ReportRepository, ReportStats, StorageError, StoredReport};
use medsum_entities::reports;
use rayon::prelude::*;
use sea_orm::sea_query::Index;
use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Schema, Set,
};
use tracing::{debug, info};

use crate::convert;

type Result<T> = std::result::Result<T, StorageError>;

/// Idle timeout and max lifetime of the single pooled connection. Recycling
/// it would drop a `sqlite::memory:` database, so it lives for the session.
const CONNECTION_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 100);

fn connect_options(database_url: &str) -> ConnectOptions {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(CONNECTION_LIFETIME)
        .max_lifetime(CONNECTION_LIFETIME)
        .sqlx_logging(false);
    options
}

pub struct ReportStore {
    db: DatabaseConnection,
}

impl ReportStore {
    /// Connect to `database_url` and create the `reports` table if needed.
    ///
    /// Use `sqlite:<path>?mode=rwc` for a file database or `sqlite::memory:`
    /// for a throwaway one.
    pub async fn open(database_url: &str) -> Result<Self> {
        info!("Connecting to database: {}", database_url);

        let db = Database::connect(connect_options(database_url))
            .await
            .map_err(StorageError::unavailable)?;

        Self::ensure_schema(&db).await?;

        info!("ReportStore initialized");
        Ok(Self { db })
    }

    async fn ensure_schema(db: &DatabaseConnection) -> Result<()> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);

        let mut table = schema.create_table_from_entity(reports::Entity);
        table.if_not_exists();
        db.execute(backend.build(&table))
            .await
            .map_err(StorageError::unavailable)?;

        let index = Index::create()
            .if_not_exists()
            .name("idx_reports_patient_id")
            .table(reports::Entity)
            .col(reports::Column::PatientId)
            .to_owned();
        db.execute(backend.build(&index))
            .await
            .map_err(StorageError::unavailable)?;

        debug!("Schema for reports table is in place");
        Ok(())
    }

    /// Close the connection, consuming the store.
    pub async fn close(self) -> Result<()> {
        self.db.close().await.map_err(StorageError::unavailable)?;
        info!("ReportStore closed");
        Ok(())
    }

    async fn all_ordered(&self) -> Result<Vec<StoredReport>> {
        let models = reports::Entity::find()
            .order_by_asc(reports::Column::ReportDate)
            .order_by_asc(reports::Column::Id)
            .all(&self.db)
            .await
            .map_err(StorageError::unavailable)?;

        models
            .into_par_iter()
            .map(convert::stored_report_from_model)
            .collect()
    }
}

#[async_trait]
impl ReportRepository for ReportStore {
    async fn save(&self, report: &MedicalReport) -> Result<i64> {
        let model = reports::ActiveModel {
            patient_id: Set(report.patient_id.clone()),
            report_date: Set(report.report_date.clone()),
            report_type: Set(report.report_type.clone()),
            diagnosis: Set(report.diagnosis.clone()),
            symptoms: Set(serde_json::to_string(&report.symptoms)?),
            medications: Set(serde_json::to_string(&report.medications)?),
            lab_values: Set(serde_json::to_string(&report.lab_values)?),
            summary: Set(report.summary.clone()),
            raw_text: Set(report.raw_text.clone()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let inserted = reports::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(StorageError::unavailable)?;

        info!(
            "Saved report {} for patient {}",
            inserted.last_insert_id, report.patient_id
        );
        Ok(i64::from(inserted.last_insert_id))
    }

    async fn get_report(&self, id: i64) -> Result<Option<StoredReport>> {
        let Ok(id) = i32::try_from(id) else {
            return Ok(None);
        };

        reports::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(StorageError::unavailable)?
            .map(convert::stored_report_from_model)
            .transpose()
    }

    async fn get_patient_reports(&self, patient_id: &str) -> Result<Vec<StoredReport>> {
        let models = reports::Entity::find()
            .filter(reports::Column::PatientId.eq(patient_id))
            .order_by_asc(reports::Column::ReportDate)
            .order_by_asc(reports::Column::Id)
            .all(&self.db)
            .await
            .map_err(StorageError::unavailable)?;

        debug!("Found {} reports for patient {}", models.len(), patient_id);
        models
            .into_iter()
            .map(convert::stored_report_from_model)
            .collect()
    }

    async fn search_reports(&self, term: &str) -> Result<Vec<StoredReport>> {
        // SQL LIKE only folds ASCII case, so matching happens on decoded rows.
        let needle = term.to_lowercase();
        let matches: Vec<StoredReport> = self
            .all_ordered()
            .await?
            .into_par_iter()
            .filter(|stored| stored.report.mentions(&needle))
            .collect();

        debug!("Search '{}' matched {} reports", term, matches.len());
        Ok(matches)
    }

    async fn get_stats(&self) -> Result<ReportStats> {
        let total_reports = reports::Entity::find()
            .count(&self.db)
            .await
            .map_err(StorageError::unavailable)?;

        let patients: Vec<String> = reports::Entity::find()
            .select_only()
            .column(reports::Column::PatientId)
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(StorageError::unavailable)?;

        let by_type: Vec<(String, i64)> = reports::Entity::find()
            .select_only()
            .column(reports::Column::ReportType)
            .column_as(reports::Column::Id.count(), "count")
            .group_by(reports::Column::ReportType)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(StorageError::unavailable)?;

        let report_types: BTreeMap<String, u64> = by_type
            .into_iter()
            .map(|(report_type, count)| (report_type, u64::try_from(count).unwrap_or_default()))
            .collect();

        Ok(ReportStats {
            total_reports,
            unique_patients: patients.len() as u64,
            report_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_connection_is_never_recycled() {
        let options = connect_options("sqlite::memory:");
        assert_eq!(options.get_max_connections(), Some(1));
        assert_eq!(options.get_min_connections(), Some(1));
        assert_eq!(options.get_idle_timeout(), Some(CONNECTION_LIFETIME));
        assert_eq!(options.get_max_lifetime(), Some(CONNECTION_LIFETIME));
    }
}

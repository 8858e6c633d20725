use medsum_config::Config;
use medsum_core::ReportRepository;

/// Strategy that lists one patient's reports, oldest first.
#[derive(Debug, Clone, Copy)]
pub struct PatientStrategy;

impl super::CommandStrategy for PatientStrategy {
    type Input = String;

    async fn execute(&self, patient_id: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let store = super::open_store(&config).await?;

        let reports = store.get_patient_reports(&patient_id).await;
        store.close().await?;

        let reports = reports?;
        if reports.is_empty() {
            println!("No reports for patient {patient_id}");
        }
        for stored in &reports {
            super::print_report(stored);
        }
        Ok(())
    }
}

/// Strategy that lists reports mentioning a keyword.
#[derive(Debug, Clone, Copy)]
pub struct SearchStrategy;

impl super::CommandStrategy for SearchStrategy {
    type Input = String;

    async fn execute(&self, term: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let store = super::open_store(&config).await?;

        let reports = store.search_reports(&term).await;
        store.close().await?;

        let reports = reports?;
        println!("{} reports match '{term}'", reports.len());
        for stored in &reports {
            super::print_report(stored);
        }
        Ok(())
    }
}

/// Strategy that prints database statistics.
#[derive(Debug, Clone, Copy)]
pub struct StatsStrategy;

impl super::CommandStrategy for StatsStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let store = super::open_store(&config).await?;

        let stats = store.get_stats().await;
        store.close().await?;

        println!("Database Stats: {}", stats?);
        Ok(())
    }
}

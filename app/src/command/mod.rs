//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use medsum_config::Config;
use medsum_core::StoredReport;
use medsum_store::ReportStore;
use tracing::info;

mod ingest;
mod init;
mod query;
mod version;

pub use ingest::{IngestInput, IngestStrategy};
pub use init::InitStrategy;
pub use query::{PatientStrategy, SearchStrategy, StatsStrategy};
pub use version::VersionStrategy;

/// Contract shared by all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Open the configured report database.
async fn open_store(config: &Config) -> anyhow::Result<ReportStore> {
    info!("Opening report database");
    Ok(ReportStore::open(&config.database.url).await?)
}

fn print_report(stored: &StoredReport) {
    println!("[{}] {}", stored.id, stored.report.summary);
}

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

mod command;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use command::{
    CommandStrategy, IngestInput, IngestStrategy, InitStrategy, PatientStrategy, SearchStrategy,
    StatsStrategy, VersionStrategy,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "medsum")]
#[command(about = "Medical report summarizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and store every report in a file, then print database stats
    Demo {
        /// Reports file, `---` between reports (defaults to demo.reports_file)
        file: Option<PathBuf>,
    },
    /// Extract and store every report in a file
    Process {
        file: PathBuf,

        /// Report type label
        #[arg(short = 't', long = "type")]
        report_type: Option<String>,
    },
    /// List a patient's reports, oldest first
    Patient { patient_id: String },
    /// Find reports mentioning a keyword
    Search { term: String },
    /// Show database statistics
    Stats,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Demo { file: None }) {
        Commands::Demo { file } => {
            IngestStrategy
                .execute(IngestInput {
                    file,
                    report_type: None,
                    show_stats: true,
                })
                .await
        }
        Commands::Process { file, report_type } => {
            IngestStrategy
                .execute(IngestInput {
                    file: Some(file),
                    report_type,
                    show_stats: false,
                })
                .await
        }
        Commands::Patient { patient_id } => PatientStrategy.execute(patient_id).await,
        Commands::Search { term } => SearchStrategy.execute(term).await,
        Commands::Stats => StatsStrategy.execute(()).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}

//! Command-line interface components.

use crate::config::IngestConfig;
use crate::constants::DEFAULT_HEADER_LENGTH;
use crate::ingest::TideIngestor;
use crate::models::IngestReport;
use crate::repository::{database_path, TideRepository};
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "bodc-tide-db")]
#[command(about = "Load BODC tide-gauge observation files into a SQLite database")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory containing the annual tide files (<year><code>.txt)
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Target database; ".db" is appended when missing
    #[arg(value_name = "DATABASE")]
    pub database: PathBuf,

    /// Number of header lines before the data rows
    #[arg(long, default_value_t = DEFAULT_HEADER_LENGTH)]
    pub header_length: usize,

    /// Strip trailing non-data lines from the source files, keeping .bak copies
    #[arg(long)]
    pub clean_in_place: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors, and hide the progress bar
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Build the ingestion configuration from the parsed arguments
    pub fn ingest_config(&self) -> IngestConfig {
        let mut config = IngestConfig::default().with_header_length(self.header_length);
        if self.clean_in_place {
            config = config.with_clean_in_place();
        }
        if self.quiet {
            config = config.without_progress();
        }
        config
    }
}

/// Set up structured logging based on CLI arguments
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bodc_tide_db={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Run a batch ingestion and print the summary
pub fn run(args: &Args) -> Result<IngestReport> {
    let db_path = database_path(&args.database);

    println!("{}", "Starting BODC tide ingestion".bright_green().bold());
    println!("  {} {}", "Input:".bright_cyan(), args.input_dir.display());
    println!("  {} {}", "Database:".bright_cyan(), db_path.display());

    let mut repository = TideRepository::open(&db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    repository
        .initialize_schema()
        .context("Failed to initialize database schema")?;

    let mut ingestor = TideIngestor::with_config(&mut repository, args.ingest_config())
        .context("Invalid ingestion configuration")?;
    let report = ingestor
        .ingest_directory(&args.input_dir)
        .with_context(|| format!("Failed to list tide files in {}", args.input_dir.display()))?;

    print_summary(&report);
    Ok(report)
}

/// Print the files loaded, rows inserted and per-file failures
pub fn print_summary(report: &IngestReport) {
    println!("\n{}", "Ingestion Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        report.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files loaded:".bright_cyan(),
        report.loaded.len().to_string().bright_white()
    );
    for loaded in &report.loaded {
        println!(
            "    {} {} (site {} #{}, {} rows)",
            "+".bright_green(),
            loaded.path.display(),
            loaded.site_code,
            loaded.site_id,
            loaded.rows_inserted
        );
    }
    println!(
        "  {} {}",
        "Rows inserted:".bright_cyan(),
        report.total_rows.to_string().bright_white().bold()
    );

    if report.has_failures() {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            report.failed.len().to_string().bright_red().bold()
        );
        for failed in &report.failed {
            println!(
                "    {} {}: {}",
                "x".bright_red(),
                failed.path.display(),
                failed.error
            );
        }
    }
}

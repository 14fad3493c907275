use bodc_tide_db::cli::{self, Args};
use clap::Parser;
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    cli::setup_logging(&args);

    match cli::run(&args) {
        Ok(report) if report.has_failures() => {
            // Per-file failures have already been reported in the summary
            process::exit(1);
        }
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

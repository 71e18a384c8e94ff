//! Code documentation generator - entry point
//!
//! Invokes the extraction-annotation-merge pipeline over a root
//! directory and prints the run report as JSON on stdout. Follow-up
//! steps (branch creation, pull requests) are external consumers of
//! that report.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Command line interface for the code documentation generator
#[derive(Parser, Debug)]
#[command(name = "cdg")]
#[command(about = "Annotates a codebase with model-generated docstrings")]
#[command(version)]
pub struct Cli {
    /// Root directory of the codebase to document
    pub root: PathBuf,

    /// Path to configuration file (default: ./cdg.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cdg::run(&cli.root, cli.config.as_deref()).await {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("failed to serialize run report: {e}");
                    return ExitCode::FAILURE;
                }
            }
            if report.is_fatal() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

//! CLI entry point for confluence-export.

use std::process::ExitCode;

use clap::Parser;

mod app;
mod cli;

use app::exit::ProcessExit;
use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    match app::runtime::run_export(args).await {
        Ok(exit) => exit.into(),
        Err(error) => {
            eprintln!("error: {error:#}");
            ProcessExit::Failure.into()
        }
    }
}

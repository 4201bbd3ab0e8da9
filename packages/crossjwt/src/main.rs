//! `crossjwt` entry point

use clap::Parser;
use crossjwt::{cli::Cli, Orchestrator};
use crossjwt_common::LoggingTransformer;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    LoggingTransformer::init();

    let outcome = match Cli::parse().resolve().and_then(Orchestrator::new) {
        Ok(orchestrator) => orchestrator.run().await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("crossjwt: {e}");
            ExitCode::FAILURE
        }
    }
}

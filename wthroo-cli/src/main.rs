//! Binary crate for the `wthroo` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments, environment variables and the config file
//! - Interactive configuration
//! - Deciding exit codes

use clap::Parser;
use std::process::ExitCode;

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cmd = match cli::Cli::try_parse() {
        Ok(cmd) => cmd,
        Err(e) => {
            // Nothing is left to report to if stdout/stderr are gone.
            let _ = e.print();
            return cli::parse_failure_code(&e);
        }
    };

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(cmd.log_level)
            .with_writer(std::io::stderr)
            .finish(),
    )
    .expect("failed to set tracing subscriber");

    match cmd.run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

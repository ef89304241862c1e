//! # Soloserve CLI
//!
//! Runs exactly one inference-server route in-process and exits.

use std::process::ExitCode;

use color_eyre::eyre::Result;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let argv: Vec<String> = std::env::args().skip(1).collect();
    Ok(ExitCode::from(soloserve::app::run(argv).await))
}

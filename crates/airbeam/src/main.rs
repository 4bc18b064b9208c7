//! `airbeam` -- keeps AirBeam recorders recording and collects their files.
//!
//! Entry point: argument parsing, config loading, logging setup, and the
//! supervisor loop. Runs until interrupted.

mod cli;
mod error;
mod logging;

use clap::Parser;
use tracing::info;

use airbeam_core::Supervisor;

use crate::cli::Cli;
use crate::error::{CliError, exit_code};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => exit_code::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            exit_code::GENERAL
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = airbeam_config::load_config(&cli.config)?;

    if cli.check {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Held until `run` returns so the file sink flushes
    let _log_guard = logging::init(&config.log, cli.debug)?;
    if cli.debug {
        println!("Debugging to log file");
    }

    let supervisor = Supervisor::new(config.to_supervisor_config()?)?;
    info!(
        config = %cli.config.display(),
        devices = supervisor.config().devices.len(),
        rotate_after_secs = supervisor.config().rotate_after_secs,
        max_dir_size_mb = supervisor.config().max_dir_size_mb,
        "starting airbeam"
    );

    tokio::select! {
        () = supervisor.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            println!("Quitting");
            info!("interrupted, shutting down");
        }
    }

    Ok(())
}

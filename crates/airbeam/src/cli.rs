//! Clap derive structures for the `airbeam` binary.

use std::path::PathBuf;

use clap::Parser;

/// airbeam -- keep AirBeam recorders recording and collect their files
#[derive(Debug, Parser)]
#[command(
    name = "airbeam",
    version,
    about = "Ensure AirBeam devices are recording and download their recordings periodically",
    long_about = "Polls every configured AirBeam device in turn: powers the camera on,\n\
        keeps a recording running and rotates it at the configured duration,\n\
        downloads finished recordings and deletes them from the device, and\n\
        keeps each local storage directory under its size limit."
)]
pub struct Cli {
    /// YAML configuration file
    #[arg(long, short = 'c', env = "AIRBEAM_CONFIG")]
    pub config: PathBuf,

    /// Log debugging information to the log file
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Validate the configuration, print it, and exit
    #[arg(long)]
    pub check: bool,
}

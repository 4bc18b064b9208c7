// airbeam-api: Async Rust client for the AirBeam recorder HTTP API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{DeviceClient, DownloadOutcome, RECORD_START_SETTLE};
pub use error::Error;
pub use models::{DeviceStatus, RecordingDuration};
pub use transport::TransportConfig;

// ── Recording supervisor ──
//
// Drives every configured device through the same sequence, one device at a
// time: make sure the camera is on, keep a recording running and rotate it
// when it gets too long, hold local storage under quota, then pull finished
// recordings off the device. A failing device is reported and backed off
// without affecting the others.

use std::path::PathBuf;

use airbeam_api::{DeviceClient, DownloadOutcome, TransportConfig};
use tracing::{debug, error, info, warn};

use crate::config::SupervisorConfig;
use crate::error::CoreError;
use crate::policy::RotationAction;
use crate::storage::{LocalStore, QuotaReport};

/// Why a device cycle was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The device could not be reached.
    Connection,
    /// Anything else: bad status, malformed payload, local filesystem.
    Other,
}

impl From<&CoreError> for FailureKind {
    fn from(err: &CoreError) -> Self {
        if err.is_connection() {
            Self::Connection
        } else {
            Self::Other
        }
    }
}

/// Recording transfers attempted during one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// Downloaded and deleted from the device: (remote name, local path).
    pub downloaded: Vec<(String, PathBuf)>,
    /// Refused by the device; left in place remotely.
    pub rejected: Vec<String>,
    /// Not attempted because the device was not recording.
    pub skipped: Vec<String>,
}

/// Everything that happened to one device in one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub camera_started: bool,
    pub action: RotationAction,
    pub quota: QuotaReport,
    pub transfers: TransferReport,
}

/// Outcome of one device's cycle.
#[derive(Debug)]
pub enum DeviceOutcome {
    Completed {
        device: String,
        report: CycleReport,
    },
    Failed {
        device: String,
        kind: FailureKind,
        error: CoreError,
    },
}

impl DeviceOutcome {
    pub fn device(&self) -> &str {
        match self {
            Self::Completed { device, .. } | Self::Failed { device, .. } => device,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// A device client paired with its local store.
struct Station {
    client: DeviceClient,
    store: LocalStore,
}

/// Sequential supervisor over every configured device.
pub struct Supervisor {
    config: SupervisorConfig,
    stations: Vec<Station>,
}

impl Supervisor {
    /// Build one HTTP client per device.
    pub fn new(config: SupervisorConfig) -> Result<Self, CoreError> {
        let mut transport = TransportConfig::default();
        if let Some(timeout) = config.http_timeout {
            transport = transport.with_timeout(timeout);
        }

        let stations = config
            .devices
            .iter()
            .map(|spec| -> Result<Station, CoreError> {
                let client = DeviceClient::new(spec.id.clone(), spec.base_url.clone(), &transport)?
                    .with_record_settle(config.pacing.record_start_settle);
                Ok(Station {
                    client,
                    store: LocalStore::new(spec.store_path.clone()),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { config, stations })
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Poll every device, forever.
    pub async fn run(&self) {
        info!(devices = self.stations.len(), "supervisor started");
        loop {
            self.run_cycle().await;
        }
    }

    /// One pass over all devices, in configuration order.
    ///
    /// Each device is followed by the per-device interval on success or the
    /// failure back-off on error.
    pub async fn run_cycle(&self) -> Vec<DeviceOutcome> {
        let mut outcomes = Vec::with_capacity(self.stations.len());

        for station in &self.stations {
            let device = station.client.id().to_owned();
            debug!(device = %device, "init");

            let outcome = match self.tend(station).await {
                Ok(report) => {
                    debug!(device = %device, "sleeping");
                    tokio::time::sleep(self.config.pacing.device_interval).await;
                    DeviceOutcome::Completed { device, report }
                }
                Err(error) => {
                    let kind = FailureKind::from(&error);
                    match kind {
                        FailureKind::Connection => {
                            error!(device = %device, %error, "problem connecting to camera");
                        }
                        FailureKind::Other => {
                            error!(device = %device, error = ?error, "device cycle failed");
                        }
                    }
                    tokio::time::sleep(self.config.pacing.failure_backoff).await;
                    DeviceOutcome::Failed { device, kind, error }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Run the full per-device sequence once.
    async fn tend(&self, station: &Station) -> Result<CycleReport, CoreError> {
        let client = &station.client;

        // Camera must be on before anything can record
        let status = client.status().await?;
        let camera_started = !status.is_recording_available();
        if camera_started {
            client.start_camera().await?;
        }

        let duration = client.recording_duration_secs().await?;
        let action = RotationAction::decide(duration, self.config.rotate_after_secs);
        match action {
            RotationAction::Start => {
                debug!(device = %client.id(), "not recording");
                client.start_recording().await?;
            }
            RotationAction::Rotate => {
                info!(device = %client.id(), duration, "rotating file");
                client.stop_recording().await?;
                client.start_recording().await?;
            }
            RotationAction::Keep => {}
        }

        let quota = station
            .store
            .enforce_quota(self.config.max_dir_size_mb, self.config.pacing.eviction_pause)
            .await?;

        let transfers = Self::collect_recordings(station).await?;

        Ok(CycleReport {
            camera_started,
            action,
            quota,
            transfers,
        })
    }

    /// Download every remote recording and delete each one that arrived
    /// intact. Nothing is transferred while the device is idle, so that a
    /// long download never delays the next recording start.
    async fn collect_recordings(station: &Station) -> Result<TransferReport, CoreError> {
        let client = &station.client;
        let mut report = TransferReport::default();

        let files = client.list_recordings().await?;
        if files.is_empty() {
            return Ok(report);
        }

        if client.recording_duration_secs().await? == 0 {
            debug!(
                device = %client.id(),
                count = files.len(),
                "not recording, leaving files on device"
            );
            report.skipped.extend(files);
            return Ok(report);
        }

        station.store.ensure_exists()?;
        for file in files {
            info!(device = %client.id(), file = %file, "downloading");
            match client.download_recording(&file, station.store.path()).await? {
                DownloadOutcome::Complete(path) => {
                    client.delete_recording(&file).await?;
                    report.downloaded.push((file, path));
                }
                DownloadOutcome::Rejected(status) => {
                    warn!(
                        device = %client.id(),
                        file = %file,
                        status,
                        "download refused, keeping remote copy"
                    );
                    report.rejected.push(file);
                }
            }
        }

        Ok(report)
    }
}

// AirBeam device HTTP client
//
// Wraps `reqwest::Client` with device-relative URL construction and the
// handful of GET endpoints the recorder exposes. Nothing here retries or
// sleeps on failure; errors go straight back to the caller.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};
use url::Url;

use crate::error::Error;
use crate::models::{self, DeviceStatus, RecordingDuration};
use crate::transport::TransportConfig;

/// How long a device needs after `/record` before the new recording shows
/// up in `/info`.
pub const RECORD_START_SETTLE: Duration = Duration::from_secs(10);

/// Result of a recording transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The whole body was written and flushed to this path.
    Complete(PathBuf),
    /// The device refused the transfer; nothing was written.
    Rejected(u16),
}

/// HTTP client for a single AirBeam recorder.
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: Url,
    id: String,
    record_settle: Duration,
}

impl DeviceClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `id` is the filesystem-safe device identifier; it prefixes log lines
    /// and downloaded filenames.
    pub fn new(id: impl Into<String>, base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, id, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, id: impl Into<String>, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            id: id.into(),
            record_settle: RECORD_START_SETTLE,
        }
    }

    /// Override the pause after starting a recording.
    pub fn with_record_settle(mut self, settle: Duration) -> Self {
        self.record_settle = settle;
        self
    }

    /// The device identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    // ── Transport ────────────────────────────────────────────────────

    /// Build `{base}/{path}`.
    fn url(&self, path: &str) -> Result<Url, Error> {
        let full = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path);
        Ok(Url::parse(&full)?)
    }

    /// GET `{base}/{path}`, accepting only HTTP 200.
    pub async fn fetch(&self, path: &str) -> Result<reqwest::Response, Error> {
        let url = self.url(path)?;
        debug!(device = %self.id, "GET {}", url);

        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if status == reqwest::StatusCode::OK {
            return Ok(resp);
        }

        error!(device = %self.id, %url, status = status.as_u16(), "device request failed");
        Err(Error::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }

    // ── Status ───────────────────────────────────────────────────────

    /// Fetch and parse `/info`.
    pub async fn status(&self) -> Result<DeviceStatus, Error> {
        let body = self.fetch("info").await?.text().await?;
        DeviceStatus::from_xml(&body)
    }

    /// Current recording length in seconds, `0` when not recording or when
    /// the device reports something unparseable.
    pub async fn recording_duration_secs(&self) -> Result<u64, Error> {
        let status = self.status().await?;
        debug!(device = %self.id, raw = %status.recording_duration, "raw duration");

        let duration = status.duration();
        if let RecordingDuration::Unknown(ref raw) = duration {
            debug!(device = %self.id, raw = %raw, "duration not parseable, treating as idle");
        } else {
            debug!(device = %self.id, %duration, "current duration");
        }
        Ok(duration.secs())
    }

    // ── Control ──────────────────────────────────────────────────────

    /// Start recording, then wait for the device to catch up.
    pub async fn start_recording(&self) -> Result<(), Error> {
        self.fetch("record").await?;
        info!(device = %self.id, "recording started");
        tokio::time::sleep(self.record_settle).await;
        Ok(())
    }

    pub async fn stop_recording(&self) -> Result<(), Error> {
        self.fetch("stoprecord").await?;
        info!(device = %self.id, "recording stopped");
        Ok(())
    }

    /// Power the camera on. Required before a recording can start.
    pub async fn start_camera(&self) -> Result<(), Error> {
        self.fetch("startcamera").await?;
        debug!(device = %self.id, "camera turned on");
        Ok(())
    }

    pub async fn stop_camera(&self) -> Result<(), Error> {
        self.fetch("stopcamera").await?;
        info!(device = %self.id, "camera turned off");
        Ok(())
    }

    // ── Recordings ───────────────────────────────────────────────────

    /// Names of the recordings currently held on the device.
    pub async fn list_recordings(&self) -> Result<BTreeSet<String>, Error> {
        let body = self.fetch("recordings.html").await?.text().await?;
        let files = models::recordings_from_index(&body)?;
        debug!(device = %self.id, ?files, "current files");
        Ok(files)
    }

    /// Local name for a downloaded recording:
    /// `{device_id}_{unix_timestamp}_{original_filename}`.
    pub fn local_file_name(&self, file_name: &str) -> String {
        format!("{}_{}_{}", self.id, chrono::Utc::now().timestamp(), file_name)
    }

    /// Stream `/recording/{file_name}` into `dir`.
    ///
    /// The local file is only created once the device has accepted the
    /// request. A transport failure mid-stream is returned as an error and
    /// leaves the partial file in place.
    pub async fn download_recording(&self, file_name: &str, dir: &Path) -> Result<DownloadOutcome, Error> {
        let url = self.url(&format!("recording/{file_name}"))?;
        let mut resp = self.http.get(url.clone()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            error!(device = %self.id, %url, status = status.as_u16(), "could not download file");
            return Ok(DownloadOutcome::Rejected(status.as_u16()));
        }

        let path = dir.join(self.local_file_name(file_name));
        let mut file = tokio::fs::File::create(&path).await?;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        info!(device = %self.id, file = file_name, path = %path.display(), "downloaded file");
        Ok(DownloadOutcome::Complete(path))
    }

    /// Remove a recording from the device.
    pub async fn delete_recording(&self, file_name: &str) -> Result<(), Error> {
        self.fetch(&format!("delete/{file_name}")).await?;
        info!(device = %self.id, file = file_name, "deleted file on remote device");
        Ok(())
    }
}

// ── Runtime supervisor configuration ──
//
// These types describe *what* to supervise and how fast. They never touch
// disk: the binary loads the YAML file through `airbeam-config` and hands a
// `SupervisorConfig` in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// One recorder to supervise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSpec {
    /// Filesystem-safe identifier (display name with spaces replaced by `_`).
    pub id: String,
    /// Device root URL (e.g., `http://10.0.0.20`).
    pub base_url: Url,
    /// Directory that receives this device's recordings.
    pub store_path: PathBuf,
}

/// Fixed delays of the supervision loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after `/record` so the new recording is visible in `/info`.
    pub record_start_settle: Duration,
    /// Pause between two quota evictions.
    pub eviction_pause: Duration,
    /// Pause after a device's cycle completes.
    pub device_interval: Duration,
    /// Pause after a device's cycle fails.
    pub failure_backoff: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            record_start_settle: airbeam_api::RECORD_START_SETTLE,
            eviction_pause: Duration::from_secs(1),
            device_interval: Duration::from_secs(5),
            failure_backoff: Duration::from_secs(60),
        }
    }
}

impl Pacing {
    /// No waits at all. Used by tests and dry runs.
    pub fn immediate() -> Self {
        Self {
            record_start_settle: Duration::ZERO,
            eviction_pause: Duration::ZERO,
            device_interval: Duration::ZERO,
            failure_backoff: Duration::ZERO,
        }
    }
}

/// Everything the supervisor needs for its lifetime.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Devices, in polling order.
    pub devices: Vec<DeviceSpec>,
    /// Recordings longer than this many seconds are rotated.
    pub rotate_after_secs: u64,
    /// Per-device storage budget in whole megabytes.
    pub max_dir_size_mb: u64,
    pub pacing: Pacing,
    /// Whole-request HTTP timeout. `None` keeps the client default.
    pub http_timeout: Option<Duration>,
}

// airbeam-core: Recording supervisor between airbeam-api and the binary.

pub mod config;
pub mod error;
pub mod policy;
pub mod storage;
pub mod supervisor;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DeviceSpec, Pacing, SupervisorConfig};
pub use error::CoreError;
pub use policy::RotationAction;
pub use storage::{LocalStore, QuotaReport};
pub use supervisor::{CycleReport, DeviceOutcome, FailureKind, Supervisor, TransferReport};

// ── Recording rotation policy ──

/// What to do with a device's recording, given how long it has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAction {
    /// Not recording: start one.
    Start,
    /// Over the rotation limit: stop, then start a fresh file.
    Rotate,
    /// Recording within the allowed window.
    Keep,
}

impl RotationAction {
    /// Decide from the current duration and the rotation limit, both in
    /// seconds. A duration of exactly `rotate_after` is kept.
    pub fn decide(duration_secs: u64, rotate_after_secs: u64) -> Self {
        if duration_secs == 0 {
            Self::Start
        } else if duration_secs > rotate_after_secs {
            Self::Rotate
        } else {
            Self::Keep
        }
    }
}

use thiserror::Error;

/// Rejected engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f32 },
    #[error("close threshold {close} is above open threshold {open}")]
    InvertedHysteresis { open: f32, close: f32 },
    #[error("min blink duration {min}ms exceeds max {max}ms")]
    InvertedDurationBounds { min: u64, max: u64 },
    #[error("normal rate range {min}..={max} is inverted")]
    InvertedRateRange { min: u32, max: u32 },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// A lifecycle call that does not apply to the current state.
///
/// These are no-ops, never panics: the host lifecycle can race with user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("session already running")]
    AlreadyRunning,
    #[error("session is not running")]
    NotRunning,
    #[error("session is not paused")]
    NotPaused,
    #[error("session has been stopped")]
    Stopped,
}

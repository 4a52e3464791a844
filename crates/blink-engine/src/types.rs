//! Common Types and Constants
//!
//! Data structures shared by the detection stages and the session engine.

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Openness probability above which an eye counts as open
pub const EYE_OPEN_THRESHOLD: f32 = 0.3;

/// Shortest close→open transition that counts as a blink (ms)
pub const MIN_BLINK_DURATION_MS: u64 = 80;

/// Longest close→open transition that counts as a blink (ms)
pub const MAX_BLINK_DURATION_MS: u64 = 500;

/// Max distance between left/right close times for a merged blink (ms)
pub const SIMULTANEITY_WINDOW_MS: u64 = 100;

/// Minimum spacing between two counted blinks (ms)
pub const DEBOUNCE_MS: u64 = 200;

/// Consecutive face detections required before output is trusted
pub const STABILITY_THRESHOLD: u32 = 5;

/// Face absence longer than this resets the stability gate (ms)
pub const ABSENCE_RESET_MS: u64 = 1_000;

/// Sliding window used for the blink rate (ms)
pub const WINDOW_MS: u64 = 60_000;

/// Lower edge of the normal blink rate band (blinks/min)
pub const NORMAL_RATE_MIN: u32 = 15;

/// Upper edge of the normal blink rate band (blinks/min)
pub const NORMAL_RATE_MAX: u32 = 20;

// ==================== Input ====================

/// One frame worth of detector output.
///
/// Backends with incompatible native outputs are expected to map into this
/// shape before handing frames to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub timestamp_ms: u64,
    pub left_open_probability: f32,
    pub right_open_probability: f32,
    pub face_present: bool,
}

impl Sample {
    pub fn new(timestamp_ms: u64, left: f32, right: f32, face_present: bool) -> Self {
        Self {
            timestamp_ms,
            left_open_probability: left,
            right_open_probability: right,
            face_present,
        }
    }

    /// A frame in which the detector found no face.
    pub fn absent(timestamp_ms: u64) -> Self {
        Self::new(timestamp_ms, 1.0, 1.0, false)
    }
}

// ==================== Eye / Blink Types ====================

/// A single eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Which eye(s) a counted blink is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EyesInvolved {
    Left,
    Right,
    Both,
}

impl EyesInvolved {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Both => "both",
        }
    }

    pub fn includes_left(&self) -> bool {
        matches!(self, Self::Left | Self::Both)
    }

    pub fn includes_right(&self) -> bool {
        matches!(self, Self::Right | Self::Both)
    }
}

impl From<Eye> for EyesInvolved {
    fn from(eye: Eye) -> Self {
        match eye {
            Eye::Left => Self::Left,
            Eye::Right => Self::Right,
        }
    }
}

/// Closed→open edge of a single eye. Not retained past classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeTransition {
    pub eye: Eye,
    pub closed_at_ms: u64,
    pub opened_at_ms: u64,
    pub duration_ms: u64,
}

/// A counted blink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlinkEvent {
    /// Time the eye(s) reopened
    pub timestamp_ms: u64,
    pub eyes_involved: EyesInvolved,
    pub duration_ms: u64,
}

// ==================== Output ====================

/// Blink rate relative to the configured normal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateBand {
    /// Not enough session time or no blinks yet
    #[default]
    Unknown,
    Low,
    Normal,
    High,
}

impl RateBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

/// Aggregated statistics, computed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub blink_rate_per_minute: u32,
    pub total_blinks: u32,
    pub left_blinks: u32,
    pub right_blinks: u32,
    /// 1.0 = perfectly even left/right attribution
    pub symmetry_score: f32,
    pub session_seconds: u32,
    pub is_stable: bool,
    pub average_duration_ms: u32,
    pub rate_band: RateBand,
}

/// Final report handed back by `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub snapshot: Snapshot,
    /// Lifetime blinks divided by session minutes
    pub average_rate_per_minute: f32,
    pub started_at_ms: u64,
    pub stopped_at_ms: u64,
}

// ==================== Ingest Results ====================

/// Why a sample was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    NotStarted,
    Paused,
    Stopped,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "not running ({})", self.as_str())
    }
}

/// What one accepted sample produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngestOutcome {
    pub is_stable: bool,
    /// Blinks counted by this call, in arrival order
    pub blinks: Vec<BlinkEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestResult {
    Accepted(IngestOutcome),
    RejectedOutOfOrder { last_ms: u64, got_ms: u64 },
    Ignored(IgnoreReason),
}

impl IngestResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn is_stable(&self) -> bool {
        match self {
            Self::Accepted(outcome) => outcome.is_stable,
            _ => false,
        }
    }

    /// Blinks produced by this call; empty unless accepted.
    pub fn blinks(&self) -> &[BlinkEvent] {
        match self {
            Self::Accepted(outcome) => &outcome.blinks,
            _ => &[],
        }
    }
}

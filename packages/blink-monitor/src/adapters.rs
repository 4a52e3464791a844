//! Detector backend adapters
//!
//! Each face-detection backend reports eyes differently. An adapter maps one
//! backend's native frame onto the engine's `Sample`; nothing backend-specific
//! reaches the engine.
//!
//! - open probability: classification-style per-eye open probabilities
//! - blendshape: per-eye blink scores, openness = 1 - score
//! - ear: eye aspect ratio from landmarks, normalized between closed/open references

use std::fmt;
use std::str::FromStr;

use blink_engine::Sample;
use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Reading a backend produced no value for; the engine treats it as "assume open".
const MISSING: f32 = f32::NAN;

pub trait SampleAdapter {
    type Frame;

    fn to_sample(&self, frame: &Self::Frame) -> Sample;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    OpenProbability,
    Blendshape,
    Ear,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenProbability => "open_probability",
            Self::Blendshape => "blendshape",
            Self::Ear => "ear",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open_probability" | "probability" => Ok(Self::OpenProbability),
            "blendshape" | "blendshapes" => Ok(Self::Blendshape),
            "ear" | "landmarks" => Ok(Self::Ear),
            other => Err(MonitorError::UnknownBackend(other.to_string())),
        }
    }
}

// ==================== Open probability ====================

#[derive(Debug, Clone, Deserialize)]
pub struct OpenProbabilityFrame {
    pub timestamp_ms: u64,
    #[serde(default = "default_true")]
    pub face_detected: bool,
    pub left_eye_open_probability: Option<f32>,
    pub right_eye_open_probability: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenProbabilityAdapter;

impl SampleAdapter for OpenProbabilityAdapter {
    type Frame = OpenProbabilityFrame;

    fn to_sample(&self, frame: &OpenProbabilityFrame) -> Sample {
        let left = frame.left_eye_open_probability;
        let right = frame.right_eye_open_probability;
        let face_present = frame.face_detected && (left.is_some() || right.is_some());

        Sample::new(
            frame.timestamp_ms,
            left.unwrap_or(MISSING),
            right.unwrap_or(MISSING),
            face_present,
        )
    }
}

// ==================== Blendshape ====================

#[derive(Debug, Clone, Deserialize)]
pub struct BlendshapeFrame {
    pub timestamp_ms: u64,
    pub eye_blink_left: Option<f32>,
    pub eye_blink_right: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlendshapeAdapter;

impl SampleAdapter for BlendshapeAdapter {
    type Frame = BlendshapeFrame;

    fn to_sample(&self, frame: &BlendshapeFrame) -> Sample {
        let openness = |score: Option<f32>| score.map_or(MISSING, |s| 1.0 - s);
        // no blendshapes at all means no face
        let face_present = frame.eye_blink_left.is_some() || frame.eye_blink_right.is_some();

        Sample::new(
            frame.timestamp_ms,
            openness(frame.eye_blink_left),
            openness(frame.eye_blink_right),
            face_present,
        )
    }
}

// ==================== EAR ====================

#[derive(Debug, Clone, Deserialize)]
pub struct EarFrame {
    pub timestamp_ms: u64,
    pub left_ear: Option<f64>,
    pub right_ear: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct EarAdapter {
    pub closed_ear: f64,
    pub open_ear: f64,
}

impl Default for EarAdapter {
    fn default() -> Self {
        Self {
            closed_ear: 0.12,
            open_ear: 0.30,
        }
    }
}

impl EarAdapter {
    fn openness(&self, ear: f64) -> f32 {
        let span = (self.open_ear - self.closed_ear).max(1e-6);
        ((ear - self.closed_ear) / span).clamp(0.0, 1.0) as f32
    }
}

impl SampleAdapter for EarAdapter {
    type Frame = EarFrame;

    fn to_sample(&self, frame: &EarFrame) -> Sample {
        // landmark models report 0.0 when the eye region was not found
        let valid = |ear: Option<f64>| ear.filter(|e| e.is_finite() && *e > 0.0);
        let left = valid(frame.left_ear);
        let right = valid(frame.right_ear);

        Sample::new(
            frame.timestamp_ms,
            left.map_or(MISSING, |e| self.openness(e)),
            right.map_or(MISSING, |e| self.openness(e)),
            left.is_some() || right.is_some(),
        )
    }
}

fn default_true() -> bool {
    true
}

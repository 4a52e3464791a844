use tracing::trace;

use crate::config::EyeEdgeParams;
use crate::types::{Eye, EyeTransition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeState {
    pub is_open: bool,
    pub last_close_timestamp_ms: Option<u64>,
}

impl Default for EyeState {
    fn default() -> Self {
        Self {
            is_open: true,
            last_close_timestamp_ms: None,
        }
    }
}

/// Turns one eye's openness stream into closed→open transitions.
///
/// Duration bounds are not applied here; every completed closure is reported.
#[derive(Debug, Clone)]
pub struct EyeEdgeDetector {
    eye: Eye,
    params: EyeEdgeParams,
    state: EyeState,
}

impl EyeEdgeDetector {
    pub fn new(eye: Eye, params: EyeEdgeParams) -> Self {
        Self {
            eye,
            params,
            state: EyeState::default(),
        }
    }

    pub fn ingest(&mut self, probability: f32, now_ms: u64) -> Option<EyeTransition> {
        let is_open_now = self.is_open_reading(probability);

        match (self.state.is_open, is_open_now) {
            (true, false) => {
                self.state.is_open = false;
                self.state.last_close_timestamp_ms = Some(now_ms);
                trace!(eye = self.eye.as_str(), at_ms = now_ms, "eye closed");
                None
            }
            (false, true) => {
                self.state.is_open = true;
                let closed_at_ms = self.state.last_close_timestamp_ms.take()?;
                let transition = EyeTransition {
                    eye: self.eye,
                    closed_at_ms,
                    opened_at_ms: now_ms,
                    duration_ms: now_ms.saturating_sub(closed_at_ms),
                };
                trace!(
                    eye = self.eye.as_str(),
                    duration_ms = transition.duration_ms,
                    "eye reopened"
                );
                Some(transition)
            }
            _ => None,
        }
    }

    /// With the default single threshold this is `p > open_threshold`.
    /// A configured close threshold adds a hysteresis band.
    fn is_open_reading(&self, probability: f32) -> bool {
        if self.state.is_open {
            probability > self.params.effective_close_threshold()
        } else {
            probability > self.params.open_threshold
        }
    }

    pub fn reset(&mut self) {
        self.state = EyeState::default();
    }

    pub fn state(&self) -> EyeState {
        self.state
    }
}

//! Stability gate
//!
//! Counts consecutive face detections and only trusts eye readings once the
//! face has been tracked for a few frames. Right after (re)acquisition the
//! detector tends to report garbage openness values.

use crate::config::StabilityParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StabilityState {
    pub consecutive_detections: u32,
    pub last_face_seen_ms: Option<u64>,
}

/// Result of one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateSignal {
    pub is_stable: bool,
    /// The face was lost long enough that in-flight eye state is stale.
    pub reset_detectors: bool,
}

#[derive(Debug, Clone)]
pub struct StabilityGate {
    params: StabilityParams,
    state: StabilityState,
}

impl StabilityGate {
    pub fn new(params: StabilityParams) -> Self {
        Self {
            params,
            state: StabilityState::default(),
        }
    }

    pub fn observe(&mut self, face_present: bool, now_ms: u64) -> GateSignal {
        let within_grace = self
            .state
            .last_face_seen_ms
            .is_some_and(|seen| now_ms.saturating_sub(seen) <= self.params.absence_reset_ms);

        if face_present {
            let mut reset_detectors = false;
            if within_grace {
                self.state.consecutive_detections =
                    self.state.consecutive_detections.saturating_add(1);
            } else {
                // fresh acquisition, counting starts over
                reset_detectors = self.state.consecutive_detections > 0;
                self.state.consecutive_detections = 0;
            }
            self.state.last_face_seen_ms = Some(now_ms);

            return GateSignal {
                is_stable: self.is_stable(),
                reset_detectors,
            };
        }

        if within_grace {
            // brief dropout: keep the count, but this frame has nothing to trust
            return GateSignal {
                is_stable: false,
                reset_detectors: false,
            };
        }

        let reset_detectors = self.state.consecutive_detections > 0;
        self.state.consecutive_detections = 0;
        GateSignal {
            is_stable: false,
            reset_detectors,
        }
    }

    pub fn is_stable(&self) -> bool {
        self.state.consecutive_detections >= self.params.threshold
    }

    pub fn state(&self) -> StabilityState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = StabilityState::default();
    }
}

impl Default for StabilityGate {
    fn default() -> Self {
        Self::new(StabilityParams::default())
    }
}

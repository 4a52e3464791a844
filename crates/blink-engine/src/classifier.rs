//! Blink classification
//!
//! Decides whether eye transitions form a countable blink:
//! - duration gate: `min_duration_ms <= duration <= max_duration_ms`
//! - simultaneity merge: both eyes closing within the window become one `Both` event
//! - debounce: a candidate too close to the previous counted blink is dropped

use crate::config::ClassifierParams;
use crate::types::{BlinkEvent, EyeTransition, EyesInvolved};

#[derive(Debug, Clone, Default)]
pub struct BlinkClassifier {
    params: ClassifierParams,
}

impl BlinkClassifier {
    pub fn new(params: ClassifierParams) -> Self {
        Self { params }
    }

    pub fn within_duration_bounds(&self, transition: &EyeTransition) -> bool {
        (self.params.min_duration_ms..=self.params.max_duration_ms)
            .contains(&transition.duration_ms)
    }

    /// Whether two transitions started close enough to be one physical blink.
    pub fn is_simultaneous(&self, a: &EyeTransition, b: &EyeTransition) -> bool {
        a.eye != b.eye && a.closed_at_ms.abs_diff(b.closed_at_ms) < self.params.simultaneity_window_ms
    }

    /// Classify the transitions produced by one sample.
    ///
    /// Returns at most one event. When two qualifying transitions are not
    /// simultaneous only the earliest is classified; callers wanting both
    /// classify them one at a time.
    pub fn classify(
        &self,
        transitions: &[EyeTransition],
        last_event_timestamp_ms: Option<u64>,
    ) -> Option<BlinkEvent> {
        let mut qualifying: Vec<&EyeTransition> = transitions
            .iter()
            .filter(|t| self.within_duration_bounds(t))
            .collect();
        qualifying.sort_by_key(|t| (t.opened_at_ms, t.closed_at_ms));

        let candidate = match qualifying.as_slice() {
            [] => return None,
            [a, b, ..] if self.is_simultaneous(a, b) => BlinkEvent {
                timestamp_ms: a.opened_at_ms.max(b.opened_at_ms),
                eyes_involved: EyesInvolved::Both,
                duration_ms: a.duration_ms.max(b.duration_ms),
            },
            [first, ..] => BlinkEvent {
                timestamp_ms: first.opened_at_ms,
                eyes_involved: first.eye.into(),
                duration_ms: first.duration_ms,
            },
        };

        if self.is_debounced(&candidate, last_event_timestamp_ms) {
            return None;
        }
        Some(candidate)
    }

    fn is_debounced(&self, candidate: &BlinkEvent, last_event_timestamp_ms: Option<u64>) -> bool {
        last_event_timestamp_ms.is_some_and(|last| {
            candidate.timestamp_ms.saturating_sub(last) < self.params.debounce_ms
        })
    }
}

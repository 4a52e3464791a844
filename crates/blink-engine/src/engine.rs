//! Blink session engine
//!
//! Owns the per-session detection pipeline:
//! sample → stability gate → per-eye edge detectors → classifier → window.
//!
//! The engine is single-threaded and never reads a clock; every timestamp
//! comes from the caller. Hosts that read snapshots from another thread must
//! wrap the engine in their own lock.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classifier::BlinkClassifier;
use crate::clock::SessionClock;
use crate::config::BlinkEngineConfig;
use crate::edge::EyeEdgeDetector;
use crate::error::{ConfigError, LifecycleError};
use crate::sanitize::{is_out_of_range, sanitize_sample};
use crate::stability::StabilityGate;
use crate::types::{
    BlinkEvent, Eye, EyeTransition, IgnoreReason, IngestOutcome, IngestResult, Sample,
    SessionSummary, Snapshot,
};
use crate::window::BlinkWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    #[default]
    Idle,
    Running,
    Paused,
    Stopped,
}

impl EngineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

#[derive(Debug)]
pub struct BlinkSessionEngine {
    config: BlinkEngineConfig,
    state: EngineState,
    gate: StabilityGate,
    left: EyeEdgeDetector,
    right: EyeEdgeDetector,
    classifier: BlinkClassifier,
    window: BlinkWindow,
    clock: SessionClock,
    is_stable: bool,
    last_sample_ms: Option<u64>,
    last_event_ms: Option<u64>,
    paused_at_ms: Option<u64>,
    started_at_ms: Option<u64>,
    /// Latest timestamp seen from samples or lifecycle calls
    latest_ms: u64,
}

impl BlinkSessionEngine {
    pub fn new(config: BlinkEngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    pub fn with_defaults() -> Self {
        Self::build(BlinkEngineConfig::default())
    }

    fn build(config: BlinkEngineConfig) -> Self {
        Self {
            config,
            state: EngineState::Idle,
            gate: StabilityGate::new(config.stability),
            left: EyeEdgeDetector::new(Eye::Left, config.eye),
            right: EyeEdgeDetector::new(Eye::Right, config.eye),
            classifier: BlinkClassifier::new(config.classifier),
            window: BlinkWindow::new(config.window),
            clock: SessionClock::default(),
            is_stable: false,
            last_sample_ms: None,
            last_event_ms: None,
            paused_at_ms: None,
            started_at_ms: None,
            latest_ms: 0,
        }
    }

    // ==================== Lifecycle ====================

    pub fn start(&mut self, now_ms: u64) -> Result<(), LifecycleError> {
        match self.state {
            EngineState::Idle => {}
            EngineState::Running | EngineState::Paused => {
                return self.reject("start", LifecycleError::AlreadyRunning)
            }
            EngineState::Stopped => return self.reject("start", LifecycleError::Stopped),
        }

        self.reset_pipeline();
        self.clock.start(now_ms);
        self.started_at_ms = Some(now_ms);
        self.latest_ms = now_ms;
        self.state = EngineState::Running;
        info!(at_ms = now_ms, "blink session started");
        Ok(())
    }

    pub fn pause(&mut self, now_ms: u64) -> Result<(), LifecycleError> {
        match self.state {
            EngineState::Running => {}
            EngineState::Idle | EngineState::Paused => {
                return self.reject("pause", LifecycleError::NotRunning)
            }
            EngineState::Stopped => return self.reject("pause", LifecycleError::Stopped),
        }

        let now_ms = self.advance(now_ms);
        self.clock.pause(now_ms);
        self.paused_at_ms = Some(now_ms);
        self.is_stable = false;
        self.state = EngineState::Paused;
        info!(at_ms = now_ms, "blink session paused");
        Ok(())
    }

    /// Resuming behaves like a fresh face acquisition: in-flight eye state is
    /// dropped and stability must be re-earned. Session time is preserved.
    pub fn resume(&mut self, now_ms: u64) -> Result<(), LifecycleError> {
        match self.state {
            EngineState::Paused => {}
            EngineState::Idle | EngineState::Running => {
                return self.reject("resume", LifecycleError::NotPaused)
            }
            EngineState::Stopped => return self.reject("resume", LifecycleError::Stopped),
        }

        let now_ms = self.advance(now_ms);
        self.gate.reset();
        self.reset_detectors();
        self.clock.resume(now_ms);
        self.paused_at_ms = None;
        self.state = EngineState::Running;
        info!(at_ms = now_ms, "blink session resumed");
        Ok(())
    }

    /// Ends the session and returns its final figures. All detection state is
    /// discarded; the engine cannot be restarted.
    pub fn stop(&mut self, now_ms: u64) -> Result<SessionSummary, LifecycleError> {
        match self.state {
            EngineState::Running | EngineState::Paused => {}
            EngineState::Idle => return self.reject("stop", LifecycleError::NotRunning),
            EngineState::Stopped => return self.reject("stop", LifecycleError::Stopped),
        }

        let now_ms = self.advance(now_ms);
        let snapshot = self.snapshot_at(now_ms);
        let session_ms = self.clock.elapsed_ms(self.evaluation_ms(now_ms));
        let average_rate_per_minute = if session_ms > 0 {
            snapshot.total_blinks as f32 * 60_000.0 / session_ms as f32
        } else {
            0.0
        };
        let summary = SessionSummary {
            snapshot,
            average_rate_per_minute,
            started_at_ms: self.started_at_ms.unwrap_or(now_ms),
            stopped_at_ms: now_ms,
        };

        self.reset_pipeline();
        self.clock = SessionClock::default();
        self.started_at_ms = None;
        self.state = EngineState::Stopped;
        info!(
            at_ms = now_ms,
            total_blinks = snapshot.total_blinks,
            session_seconds = snapshot.session_seconds,
            "blink session stopped"
        );
        Ok(summary)
    }

    // ==================== Ingest ====================

    pub fn ingest(&mut self, sample: Sample) -> IngestResult {
        match self.state {
            EngineState::Running => {}
            EngineState::Idle => return IngestResult::Ignored(IgnoreReason::NotStarted),
            EngineState::Paused => return IngestResult::Ignored(IgnoreReason::Paused),
            EngineState::Stopped => return IngestResult::Ignored(IgnoreReason::Stopped),
        }

        if let Some(last_ms) = self.last_sample_ms {
            if sample.timestamp_ms < last_ms {
                warn!(last_ms, got_ms = sample.timestamp_ms, "out-of-order sample rejected");
                return IngestResult::RejectedOutOfOrder {
                    last_ms,
                    got_ms: sample.timestamp_ms,
                };
            }
        }

        if is_out_of_range(sample.left_open_probability)
            || is_out_of_range(sample.right_open_probability)
        {
            debug!(
                left = sample.left_open_probability,
                right = sample.right_open_probability,
                "clamping out-of-range probability"
            );
        }
        let sample = sanitize_sample(&sample);
        let now_ms = sample.timestamp_ms;
        self.last_sample_ms = Some(now_ms);
        self.advance(now_ms);

        let signal = self.gate.observe(sample.face_present, now_ms);
        if signal.reset_detectors {
            debug!(at_ms = now_ms, "face tracking lost, resetting eye detectors");
            self.reset_detectors();
        }
        self.is_stable = signal.is_stable;

        let mut blinks = Vec::new();
        if signal.is_stable {
            let transitions: Vec<EyeTransition> = [
                self.left.ingest(sample.left_open_probability, now_ms),
                self.right.ingest(sample.right_open_probability, now_ms),
            ]
            .into_iter()
            .flatten()
            .collect();

            if !transitions.is_empty() {
                blinks = self.classify(transitions);
            }
            for event in &blinks {
                debug!(
                    at_ms = event.timestamp_ms,
                    eyes = event.eyes_involved.as_str(),
                    duration_ms = event.duration_ms,
                    "blink counted"
                );
                self.window.push(*event, now_ms);
            }
        }
        self.window.evict(now_ms);

        IngestResult::Accepted(IngestOutcome {
            is_stable: signal.is_stable,
            blinks,
        })
    }

    /// A simultaneous pair is classified together; otherwise each eye's
    /// transition is classified on its own, earliest closure first.
    fn classify(&mut self, mut transitions: Vec<EyeTransition>) -> Vec<BlinkEvent> {
        let merge = match transitions.as_slice() {
            [a, b] => self.classifier.is_simultaneous(a, b),
            _ => true,
        };

        let groups: Vec<Vec<EyeTransition>> = if merge {
            vec![transitions]
        } else {
            transitions.sort_by_key(|t| (t.opened_at_ms, t.closed_at_ms));
            transitions.into_iter().map(|t| vec![t]).collect()
        };

        let mut events = Vec::new();
        for group in groups {
            if let Some(event) = self.classifier.classify(&group, self.last_event_ms) {
                self.last_event_ms = Some(event.timestamp_ms);
                events.push(event);
            }
        }
        events
    }

    // ==================== Read side ====================

    /// Statistics at the latest timestamp the engine has seen.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_at(self.latest_ms)
    }

    /// Statistics evaluated at `now_ms`. Never mutates the engine.
    pub fn snapshot_at(&self, now_ms: u64) -> Snapshot {
        if matches!(self.state, EngineState::Idle | EngineState::Stopped) {
            return Snapshot::default();
        }

        let at_ms = self.evaluation_ms(now_ms);
        let stats = self.window.snapshot(at_ms);
        let session_ms = self.clock.elapsed_ms(at_ms);

        Snapshot {
            blink_rate_per_minute: stats.rate,
            total_blinks: stats.total,
            left_blinks: stats.left_count,
            right_blinks: stats.right_count,
            symmetry_score: stats.symmetry,
            session_seconds: self.clock.elapsed_seconds(at_ms),
            is_stable: self.state == EngineState::Running && self.is_stable,
            average_duration_ms: stats.average_duration_ms,
            rate_band: self.window.rate_band(stats.rate, session_ms),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &BlinkEngineConfig {
        &self.config
    }

    /// Blinks still inside the rate window, oldest first.
    pub fn recent_events(&self) -> impl Iterator<Item = &BlinkEvent> {
        self.window.events()
    }

    // ==================== Internals ====================

    /// While paused, statistics stay frozen at the pause instant.
    fn evaluation_ms(&self, now_ms: u64) -> u64 {
        self.paused_at_ms.unwrap_or(now_ms)
    }

    fn advance(&mut self, now_ms: u64) -> u64 {
        self.latest_ms = self.latest_ms.max(now_ms);
        self.latest_ms
    }

    fn reset_detectors(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    fn reset_pipeline(&mut self) {
        self.gate.reset();
        self.reset_detectors();
        self.window.clear();
        self.is_stable = false;
        self.last_sample_ms = None;
        self.last_event_ms = None;
        self.paused_at_ms = None;
    }

    fn reject<T>(&self, op: &'static str, err: LifecycleError) -> Result<T, LifecycleError> {
        warn!(op, state = self.state.as_str(), error = %err, "lifecycle call ignored");
        Err(err)
    }
}

impl Default for BlinkSessionEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

//! # blink-engine - blink detection and blink-rate aggregation
//!
//! Turns a noisy, variable-rate stream of per-eye openness probabilities into
//! discrete blink events and a stable blink-rate / session statistic.
//!
//! ## Pipeline
//!
//! - [`stability`] - trusts eye readings only after the face is tracked steadily
//! - [`edge`] - per-eye closed→open edge detection
//! - [`classifier`] - duration gate, left/right merge, debounce
//! - [`window`] - 60 s sliding window plus lifetime counters
//! - [`engine`] - the session façade that owns all of the above
//!
//! The crate does no I/O and never reads a clock: all time comes from the
//! caller's sample timestamps, so sessions replay deterministically.
//!
//! ## Usage
//!
//! ```rust
//! use blink_engine::{BlinkSessionEngine, Sample};
//!
//! let mut engine = BlinkSessionEngine::with_defaults();
//! engine.start(0).unwrap();
//! for t in (0..=500).step_by(100) {
//!     engine.ingest(Sample::new(t, 0.9, 0.9, true));
//! }
//! engine.ingest(Sample::new(600, 0.1, 0.1, true));
//! let result = engine.ingest(Sample::new(750, 0.9, 0.9, true));
//! assert_eq!(result.blinks().len(), 1);
//! assert_eq!(engine.snapshot().total_blinks, 1);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod classifier;
pub mod clock;
pub mod config;
pub mod edge;
pub mod engine;
pub mod error;
pub mod sanitize;
pub mod stability;
pub mod types;
pub mod window;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use classifier::BlinkClassifier;
pub use clock::SessionClock;
pub use config::{BlinkEngineConfig, ClassifierParams, EyeEdgeParams, StabilityParams, WindowParams};
pub use edge::{EyeEdgeDetector, EyeState};
pub use engine::{BlinkSessionEngine, EngineState};
pub use error::{ConfigError, LifecycleError};
pub use stability::{GateSignal, StabilityGate, StabilityState};
pub use window::{BlinkWindow, WindowStats};

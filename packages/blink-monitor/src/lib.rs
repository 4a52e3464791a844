//! Host side of the blink engine: backend adapters, configuration, logging
//! and a replay runner for recorded detector output.

pub mod adapters;
pub mod config;
pub mod error;
pub mod logging;
pub mod replay;

pub use adapters::{Backend, SampleAdapter};
pub use config::MonitorConfig;
pub use error::MonitorError;
pub use replay::{replay, ReplayReport};

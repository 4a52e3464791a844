//! Replay of recorded detector output through a blink session.
//!
//! Input is NDJSON, one object per line:
//!
//! ```text
//! {"backend":"open_probability","timestamp_ms":0,"left_eye_open_probability":0.9,"right_eye_open_probability":0.9}
//! {"backend":"blendshape","timestamp_ms":33,"eye_blink_left":0.1,"eye_blink_right":0.1}
//! {"backend":"ear","timestamp_ms":66,"left_ear":0.28,"right_ear":0.27}
//! {"control":"pause","timestamp_ms":5000}
//! ```
//!
//! Frames without a `backend` tag use the configured default backend.

use std::io::BufRead;

use blink_engine::{
    BlinkEvent, BlinkSessionEngine, IngestResult, Sample, SessionSummary, Snapshot,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::adapters::{
    Backend, BlendshapeAdapter, BlendshapeFrame, EarFrame, OpenProbabilityAdapter,
    OpenProbabilityFrame, SampleAdapter,
};
use crate::config::MonitorConfig;
use crate::error::MonitorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Pause,
    Resume,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct ControlLine {
    control: Control,
    timestamp_ms: u64,
}

/// One decoded input line.
#[derive(Debug, Clone, Copy)]
pub enum ReplayLine {
    Frame(Sample),
    Control { control: Control, timestamp_ms: u64 },
}

impl ReplayLine {
    fn timestamp_ms(&self) -> u64 {
        match self {
            Self::Frame(sample) => sample.timestamp_ms,
            Self::Control { timestamp_ms, .. } => *timestamp_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimedSnapshot {
    pub at_ms: u64,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayReport {
    pub frames: u32,
    pub rejected_out_of_order: u32,
    pub ignored: u32,
    /// Pause/resume lines the session refused, e.g. a resume while running
    pub rejected_controls: u32,
    pub blinks: Vec<BlinkEvent>,
    pub snapshots: Vec<TimedSnapshot>,
    /// `None` when the input held no lines at all
    pub summary: Option<SessionSummary>,
}

/// Decode one line into a sample or a control command.
pub fn decode_line(raw: &str, config: &MonitorConfig) -> Result<ReplayLine, serde_json::Error> {
    let value: Value = serde_json::from_str(raw)?;

    if value.get("control").is_some() {
        let line: ControlLine = serde_json::from_value(value)?;
        return Ok(ReplayLine::Control {
            control: line.control,
            timestamp_ms: line.timestamp_ms,
        });
    }

    let backend = match value.get("backend") {
        Some(tag) => Backend::deserialize(tag)?,
        None => config.default_backend,
    };

    let sample = match backend {
        Backend::OpenProbability => {
            let frame: OpenProbabilityFrame = serde_json::from_value(value)?;
            OpenProbabilityAdapter.to_sample(&frame)
        }
        Backend::Blendshape => {
            let frame: BlendshapeFrame = serde_json::from_value(value)?;
            BlendshapeAdapter.to_sample(&frame)
        }
        Backend::Ear => {
            let frame: EarFrame = serde_json::from_value(value)?;
            config.ear.to_sample(&frame)
        }
    };
    Ok(ReplayLine::Frame(sample))
}

/// Periodic snapshot points in sample time.
#[derive(Debug)]
struct SnapshotSchedule {
    /// `None` once the next point would overflow the timestamp range
    next_ms: Option<u64>,
    interval_ms: u64,
}

impl SnapshotSchedule {
    fn starting_at(start_ms: u64, interval_ms: u64) -> Self {
        let interval_ms = interval_ms.max(1);
        Self {
            next_ms: start_ms.checked_add(interval_ms),
            interval_ms,
        }
    }

    /// Records every snapshot due before `at_ms`, plus the one due exactly at
    /// `at_ms` when `inclusive`.
    fn flush(
        &mut self,
        engine: &BlinkSessionEngine,
        report: &mut ReplayReport,
        at_ms: u64,
        inclusive: bool,
    ) {
        while let Some(due_ms) = self
            .next_ms
            .filter(|due| *due < at_ms || (inclusive && *due == at_ms))
        {
            let snapshot = engine.snapshot_at(due_ms);
            info!(
                at_ms = due_ms,
                rate = snapshot.blink_rate_per_minute,
                band = snapshot.rate_band.as_str(),
                total = snapshot.total_blinks,
                stable = snapshot.is_stable,
                "blink snapshot"
            );
            report.snapshots.push(TimedSnapshot {
                at_ms: due_ms,
                snapshot,
            });
            self.next_ms = due_ms.checked_add(self.interval_ms);
        }
    }
}

pub fn replay<R: BufRead>(reader: R, config: &MonitorConfig) -> Result<ReplayReport, MonitorError> {
    let mut engine = BlinkSessionEngine::new(config.engine)?;
    let mut report = ReplayReport::default();
    let mut schedule: Option<SnapshotSchedule> = None;
    let mut last_ms: Option<u64> = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let decoded = decode_line(trimmed, config).map_err(|source| MonitorError::Decode {
            line: index + 1,
            source,
        })?;
        let at_ms = decoded.timestamp_ms();

        if schedule.is_none() {
            engine.start(at_ms)?;
        }
        let schedule = schedule
            .get_or_insert_with(|| SnapshotSchedule::starting_at(at_ms, config.snapshot_interval_ms));
        last_ms = Some(last_ms.map_or(at_ms, |last| last.max(at_ms)));

        // snapshots due before this line must not see it
        schedule.flush(&engine, &mut report, at_ms, false);

        match decoded {
            ReplayLine::Control { control, timestamp_ms } => {
                let applied = match control {
                    Control::Pause => engine.pause(timestamp_ms),
                    Control::Resume => engine.resume(timestamp_ms),
                };
                if applied.is_err() {
                    report.rejected_controls += 1;
                }
            }
            ReplayLine::Frame(sample) => {
                report.frames += 1;
                match engine.ingest(sample) {
                    IngestResult::Accepted(outcome) => report.blinks.extend(outcome.blinks),
                    IngestResult::RejectedOutOfOrder { .. } => report.rejected_out_of_order += 1,
                    IngestResult::Ignored(reason) => {
                        debug!(at_ms, %reason, "frame ignored");
                        report.ignored += 1;
                    }
                }
            }
        }

        schedule.flush(&engine, &mut report, at_ms, true);
    }

    if let Some(end_ms) = last_ms {
        report.summary = Some(engine.stop(end_ms)?);
    } else {
        warn!("replay input was empty");
    }
    Ok(report)
}

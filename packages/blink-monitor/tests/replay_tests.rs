//! Replay tests: recorded NDJSON streams from each backend end up as the same
//! blink statistics.

use std::io::{Cursor, Write};

use blink_engine::EyesInvolved;
use blink_monitor::config::MonitorConfig;
use blink_monitor::{replay, MonitorError};

/// 100 ms frames, open eyes, one both-eye blink closing at 1000 and
/// reopening at 1200, then open until 4000.
fn probability_stream() -> String {
    let mut out = String::new();
    for t in (0..=4_000u64).step_by(100) {
        let p = if (1_000..1_200).contains(&t) { 0.05 } else { 0.95 };
        out.push_str(&format!(
            "{{\"backend\":\"open_probability\",\"timestamp_ms\":{t},\"left_eye_open_probability\":{p},\"right_eye_open_probability\":{p}}}\n"
        ));
    }
    out
}

#[test]
fn replays_probability_frames_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(probability_stream().as_bytes()).unwrap();

    let reader = std::io::BufReader::new(std::fs::File::open(file.path()).unwrap());
    let report = replay(reader, &MonitorConfig::default()).unwrap();

    assert_eq!(report.frames, 41);
    assert_eq!(report.blinks.len(), 1);
    assert_eq!(report.blinks[0].eyes_involved, EyesInvolved::Both);
    assert_eq!(report.blinks[0].duration_ms, 200);

    // snapshots every 2 s of sample time
    let stamps: Vec<u64> = report.snapshots.iter().map(|s| s.at_ms).collect();
    assert_eq!(stamps, vec![2_000, 4_000]);
    assert_eq!(report.snapshots[0].snapshot.total_blinks, 1);

    let summary = report.summary.unwrap();
    assert_eq!(summary.snapshot.total_blinks, 1);
    assert_eq!(summary.started_at_ms, 0);
    assert_eq!(summary.stopped_at_ms, 4_000);
    assert_eq!(summary.snapshot.session_seconds, 4);
}

#[test]
fn blendshape_and_ear_backends_agree() {
    let mut blend = String::new();
    let mut ear = String::new();
    for t in (0..=2_000u64).step_by(100) {
        let closed = (1_000..1_200).contains(&t);
        let score = if closed { 0.9 } else { 0.05 };
        let ratio = if closed { 0.08 } else { 0.31 };
        blend.push_str(&format!(
            "{{\"backend\":\"blendshape\",\"timestamp_ms\":{t},\"eye_blink_left\":{score},\"eye_blink_right\":{score}}}\n"
        ));
        ear.push_str(&format!(
            "{{\"backend\":\"ear\",\"timestamp_ms\":{t},\"left_ear\":{ratio},\"right_ear\":{ratio}}}\n"
        ));
    }

    let config = MonitorConfig::default();
    let a = replay(Cursor::new(blend), &config).unwrap();
    let b = replay(Cursor::new(ear), &config).unwrap();
    assert_eq!(a.blinks, b.blinks);
    assert_eq!(a.blinks.len(), 1);
}

#[test]
fn pause_lines_suspend_ingest() {
    let mut input = String::new();
    for t in (0..=1_000u64).step_by(100) {
        input.push_str(&format!(
            "{{\"timestamp_ms\":{t},\"left_eye_open_probability\":0.9,\"right_eye_open_probability\":0.9}}\n"
        ));
    }
    input.push_str("{\"control\":\"pause\",\"timestamp_ms\":1000}\n");
    input.push_str(
        "{\"timestamp_ms\":1100,\"left_eye_open_probability\":0.1,\"right_eye_open_probability\":0.1}\n",
    );
    input.push_str("{\"control\":\"resume\",\"timestamp_ms\":3000}\n");
    input.push_str("\n");
    input.push_str(
        "{\"timestamp_ms\":3100,\"left_eye_open_probability\":0.9,\"right_eye_open_probability\":0.9}\n",
    );

    let report = replay(Cursor::new(input), &MonitorConfig::default()).unwrap();
    assert_eq!(report.ignored, 1);
    assert!(report.blinks.is_empty());

    // 1 s before the pause, 0.1 s after resuming
    let summary = report.summary.unwrap();
    assert_eq!(summary.snapshot.session_seconds, 1);
    assert_eq!(summary.stopped_at_ms, 3_100);
}

#[test]
fn counts_out_of_order_frames() {
    let input = "\
{\"timestamp_ms\":500,\"left_eye_open_probability\":0.9,\"right_eye_open_probability\":0.9}
{\"timestamp_ms\":400,\"left_eye_open_probability\":0.9,\"right_eye_open_probability\":0.9}
{\"timestamp_ms\":600,\"left_eye_open_probability\":0.9,\"right_eye_open_probability\":0.9}
";
    let report = replay(Cursor::new(input), &MonitorConfig::default()).unwrap();
    assert_eq!(report.frames, 3);
    assert_eq!(report.rejected_out_of_order, 1);
}

#[test]
fn decode_error_reports_line_number() {
    let input = "{\"timestamp_ms\":0,\"left_eye_open_probability\":0.9}\nnot json\n";
    let err = replay(Cursor::new(input), &MonitorConfig::default()).unwrap_err();
    assert!(matches!(err, MonitorError::Decode { line: 2, .. }));
}

#[test]
fn empty_input_has_no_summary() {
    let report = replay(Cursor::new(""), &MonitorConfig::default()).unwrap();
    assert_eq!(report.frames, 0);
    assert!(report.summary.is_none());
}

fn probability_line(t: u64, p: f32) -> String {
    format!(
        "{{\"timestamp_ms\":{t},\"left_eye_open_probability\":{p},\"right_eye_open_probability\":{p}}}\n"
    )
}

#[test]
fn snapshot_excludes_blinks_after_its_due_time() {
    // eyes close at 1900; the next frame arrives at 2150, past the 2000 snapshot
    let mut input = String::new();
    for t in (0..1_900u64).step_by(100) {
        input.push_str(&probability_line(t, 0.95));
    }
    input.push_str(&probability_line(1_900, 0.05));
    input.push_str(&probability_line(2_150, 0.95));
    input.push_str(&probability_line(4_000, 0.95));

    let report = replay(Cursor::new(input), &MonitorConfig::default()).unwrap();
    assert_eq!(report.blinks.len(), 1);
    assert_eq!(report.blinks[0].timestamp_ms, 2_150);

    let stamps: Vec<u64> = report.snapshots.iter().map(|s| s.at_ms).collect();
    assert_eq!(stamps, vec![2_000, 4_000]);
    assert_eq!(report.snapshots[0].snapshot.total_blinks, 0);
    assert_eq!(report.snapshots[0].snapshot.session_seconds, 2);
    assert_eq!(report.snapshots[1].snapshot.total_blinks, 1);
}

#[test]
fn counts_rejected_control_lines() {
    let mut input = String::new();
    input.push_str(&probability_line(0, 0.9));
    input.push_str("{\"control\":\"resume\",\"timestamp_ms\":100}\n");
    input.push_str("{\"control\":\"pause\",\"timestamp_ms\":200}\n");
    input.push_str("{\"control\":\"pause\",\"timestamp_ms\":300}\n");
    input.push_str("{\"control\":\"resume\",\"timestamp_ms\":400}\n");
    input.push_str(&probability_line(500, 0.9));

    let report = replay(Cursor::new(input), &MonitorConfig::default()).unwrap();
    assert_eq!(report.rejected_controls, 2);
    assert_eq!(report.frames, 2);
    assert_eq!(report.ignored, 0);
}

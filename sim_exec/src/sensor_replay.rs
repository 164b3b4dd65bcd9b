//! # Sensor replay
//!
//! Replays a recorded stream of fused sensor snapshots from a JSON-lines
//! file, standing in for the live vehicle feed during bench runs. Each line
//! holds one snapshot in the wire format; pacing is reconstructed from the
//! snapshot timestamps, with the first snapshot due at session time zero.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use comms_if::sensor::AllSensorData;
use util::session::get_elapsed_seconds;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A snapshot scheduled at a session-relative time.
struct TimedSnapshot {
    /// Units: seconds
    due_time_s: f64,

    snapshot: AllSensorData,
}

/// A recorded sensor stream replay.
pub struct SensorReplay {
    _replay_path: PathBuf,
    snapshots: VecDeque<TimedSnapshot>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Could not find the replay file at {0}")]
    FileNotFound(String),

    #[error("Could not load the replay file: {0}")]
    FileLoadError(std::io::Error),

    #[error("The replay file contains no snapshots")]
    FileEmpty,

    #[error("Invalid snapshot on line {0}: {1}")]
    InvalidSnapshot(usize, serde_json::Error),
}

/// Snapshots due at the current session time.
pub enum PendingSnapshots {
    None,
    Some(Vec<AllSensorData>),
    EndOfStream,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SensorReplay {
    /// Create a new replay from the given file path.
    pub fn new<P: AsRef<Path>>(replay_path: P) -> Result<Self, ReplayError> {
        let path = PathBuf::from(replay_path.as_ref());

        if !path.exists() {
            return Err(ReplayError::FileNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        let content = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => return Err(ReplayError::FileLoadError(e)),
        };

        let snapshots = parse_stream(&content)?;

        Ok(SensorReplay {
            _replay_path: path,
            snapshots,
        })
    }

    /// Return the snapshots due now, or `PendingSnapshots::None` if none are
    /// due yet.
    ///
    /// Once the stream has been drained `PendingSnapshots::EndOfStream` is
    /// returned on every call.
    pub fn get_pending(&mut self) -> PendingSnapshots {
        if self.snapshots.is_empty() {
            return PendingSnapshots::EndOfStream;
        }

        let current_time_s = get_elapsed_seconds();
        let mut due = vec![];

        while self
            .snapshots
            .front()
            .map(|s| s.due_time_s <= current_time_s)
            .unwrap_or(false)
        {
            // Unwrap is safe, front has just been peeked
            due.push(self.snapshots.pop_front().unwrap().snapshot);
        }

        if due.is_empty() {
            PendingSnapshots::None
        }
        else {
            PendingSnapshots::Some(due)
        }
    }

    /// Get the number of snapshots remaining in the stream.
    pub fn get_num_snapshots(&self) -> usize {
        self.snapshots.len()
    }

    /// Get the length of the stream in seconds.
    pub fn get_duration(&self) -> f64 {
        match self.snapshots.back() {
            Some(s) => s.due_time_s,
            None => 0f64,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse a JSON-lines body into a time-ordered snapshot queue.
///
/// The recorded wall-clock timestamps are rebased so the first snapshot is
/// due immediately.
fn parse_stream(content: &str) -> Result<VecDeque<TimedSnapshot>, ReplayError> {
    let mut queue: VecDeque<TimedSnapshot> = VecDeque::new();
    let mut epoch_ms: Option<i64> = None;

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let snapshot: AllSensorData = serde_json::from_str(line)
            .map_err(|e| ReplayError::InvalidSnapshot(line_num + 1, e))?;

        let epoch = *epoch_ms.get_or_insert(snapshot.timestamp_ms);
        let due_time_s = (snapshot.timestamp_ms - epoch) as f64 / 1000.0;

        queue.push_back(TimedSnapshot {
            due_time_s,
            snapshot,
        });
    }

    if queue.is_empty() {
        return Err(ReplayError::FileEmpty);
    }

    Ok(queue)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_stream_rebases_timestamps() {
        let content = r#"
            {"timestampMs": 5000, "mpuData": {"accelX": 0.1, "accelY": 0.0, "accelZ": 1.0, "gyroX": 0.0, "gyroY": 0.0, "gyroZ": 0.0, "temperature": 25.0, "timestampMs": 5000}, "urmData": null}
            {"timestampMs": 5020, "mpuData": null, "urmData": {"distanceCm": 120.0, "temperature": 21.0, "timestampMs": 5015}}
        "#;

        let queue = parse_stream(content).unwrap();

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.front().unwrap().due_time_s, 0.0);
        assert_eq!(queue.back().unwrap().due_time_s, 0.02);
        assert!(queue.front().unwrap().snapshot.has_mpu_data());
        assert!(queue.back().unwrap().snapshot.has_urm_data());
    }

    #[test]
    fn test_empty_stream_is_an_error() {
        assert!(matches!(parse_stream("\n\n"), Err(ReplayError::FileEmpty)));
    }

    #[test]
    fn test_bad_line_names_its_number() {
        let content = "\n{\"timestampMs\": \"not a number\"}";

        match parse_stream(content) {
            Err(ReplayError::InvalidSnapshot(line, _)) => assert_eq!(line, 2),
            _ => panic!("expected InvalidSnapshot"),
        }
    }
}

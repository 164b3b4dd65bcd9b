//! # Controller script replay
//!
//! Replays a pre-recorded driving session from a script file, standing in
//! for the live controller transport during bench runs. Each line of the
//! script pairs an execution time with a controller message:
//!
//! ```text
//! 0.5: {"streer": 0, "throttle": 60, "brake": -100};
//! ```
//!
//! After initialising with the path to the script use [`CtrlScript::get_pending`]
//! to acquire the messages that are due at the current session time.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use comms_if::ctrl::{CtrlMessage, CtrlParseError};
use util::session::get_elapsed_seconds;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A controller message scripted to arrive at a specific time.
struct TimedMsg {
    /// Session-relative time the message is due at.
    ///
    /// Units: seconds
    due_time_s: f64,

    msg: CtrlMessage,
}

/// A controller replay script.
pub struct CtrlScript {
    _script_path: PathBuf,
    msgs: VecDeque<TimedMsg>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script contains no messages")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid message at {0} s: {1}")]
    InvalidMsg(f64, CtrlParseError),
}

/// Messages due at the current session time.
pub enum PendingMsgs {
    None,
    Some(Vec<CtrlMessage>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CtrlScript {
    /// Create a new replay from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        let script = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => return Err(ScriptError::ScriptLoadError(e)),
        };

        let msgs = parse_script(&script)?;

        Ok(CtrlScript {
            _script_path: path,
            msgs,
        })
    }

    /// Return the messages due now, or `PendingMsgs::None` if none are due.
    ///
    /// Once the queue has been drained `PendingMsgs::EndOfScript` is
    /// returned on every call.
    pub fn get_pending(&mut self) -> PendingMsgs {
        if self.msgs.is_empty() {
            return PendingMsgs::EndOfScript;
        }

        let current_time_s = get_elapsed_seconds();
        let mut due = vec![];

        while self
            .msgs
            .front()
            .map(|m| m.due_time_s < current_time_s)
            .unwrap_or(false)
        {
            // Unwrap is safe, front has just been peeked
            due.push(self.msgs.pop_front().unwrap().msg);
        }

        if due.is_empty() {
            PendingMsgs::None
        }
        else {
            PendingMsgs::Some(due)
        }
    }

    /// Get the number of messages remaining in the script.
    pub fn get_num_msgs(&self) -> usize {
        self.msgs.len()
    }

    /// Get the length of the script in seconds.
    pub fn get_duration(&self) -> f64 {
        match self.msgs.back() {
            Some(m) => m.due_time_s,
            None => 0f64,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse the body of a script into a time-ordered message queue.
fn parse_script(script: &str) -> Result<VecDeque<TimedMsg>, ScriptError> {
    let mut queue: VecDeque<TimedMsg> = VecDeque::new();

    let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
        .multi_line(true)
        .build()
        .unwrap();

    for cap in re.captures_iter(script) {
        let due_time_s: f64 = match cap.get(1).unwrap().as_str().parse() {
            Ok(t) => t,
            Err(e) => return Err(ScriptError::InvalidTimestamp(format!("{}", e))),
        };

        let msg = match CtrlMessage::from_json(cap.get(3).unwrap().as_str()) {
            Ok(m) => m,
            Err(e) => return Err(ScriptError::InvalidMsg(due_time_s, e)),
        };

        queue.push_back(TimedMsg { due_time_s, msg });
    }

    if queue.is_empty() {
        return Err(ScriptError::ScriptEmpty);
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
    fn test_parse_script() {
        let script = r#"
            0.0: {"streer": 0, "throttle": -100, "brake": -100};
            0.5: {"streer": 20, "throttle": 60, "brake": -100};
            1.5: {"streer": 0, "throttle": -100, "brake": 60};
        "#;

        let queue = parse_script(script).unwrap();

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.front().unwrap().due_time_s, 0.0);
        assert_eq!(queue.back().unwrap().due_time_s, 1.5);
        assert_eq!(queue.back().unwrap().msg.brake, 60);
    }

    #[test]
    fn test_empty_script_is_an_error() {
        assert!(matches!(
            parse_script("nothing to see here"),
            Err(ScriptError::ScriptEmpty)
        ));
    }

    #[test]
    fn test_bad_message_names_its_time() {
        let script = r#"2.0: {"streer": "sideways"};"#;

        match parse_script(script) {
            Err(ScriptError::InvalidMsg(t, _)) => assert_eq!(t, 2.0),
            _ => panic!("expected InvalidMsg"),
        }
    }
}

//! # Controller message definitions
//!
//! The payload sent by the cockpit at each input event: signed-byte axis
//! values for steering/throttle/brake and the assistant camera pan, plus a
//! camera recentre flag.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One driving input message from the cockpit.
///
/// Axis values are in the range [-100, 100]. The wire names below (including
/// the misspellings `streer` and `horirontalPanAssistantCamera`) are a
/// compatibility contract with the deployed web clients and must not be
/// corrected.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct CtrlMessage {
    /// Steering axis value.
    #[serde(rename = "streer")]
    pub steer: i8,

    /// Throttle pedal axis value.
    #[serde(rename = "throttle")]
    pub throttle: i8,

    /// Brake pedal axis value.
    #[serde(rename = "brake")]
    pub brake: i8,

    /// Horizontal pan axis for the assistant camera.
    #[serde(rename = "horirontalPanAssistantCamera")]
    pub horizontal_pan: i8,

    /// Vertical pan axis for the assistant camera.
    #[serde(rename = "verticalPanAssistantCamera")]
    pub vertical_pan: i8,

    /// Recentre the assistant camera when true.
    #[serde(rename = "resetPanAssistantCamera")]
    pub reset_pan: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error which occurs when parsing a [`CtrlMessage`] from JSON.
#[derive(Debug, Error)]
pub enum CtrlParseError {
    #[error("Could not parse the controller message: {0}")]
    JsonError(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CtrlMessage {
    /// Parse a message from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, CtrlParseError> {
        serde_json::from_str(json_str).map_err(CtrlParseError::JsonError)
    }

    /// Serialize the message into a JSON string.
    pub fn to_json(&self) -> Result<String, CtrlParseError> {
        serde_json::to_string(self).map_err(CtrlParseError::JsonError)
    }
}

impl Default for CtrlMessage {
    fn default() -> Self {
        CtrlMessage {
            steer: 0,
            throttle: 0,
            brake: 0,
            horizontal_pan: 0,
            vertical_pan: 0,
            reset_pan: false,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let msg = CtrlMessage {
            steer: -40,
            throttle: 75,
            brake: 0,
            horizontal_pan: 10,
            vertical_pan: -10,
            reset_pan: true,
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["streer"], -40);
        assert_eq!(json["throttle"], 75);
        assert_eq!(json["horirontalPanAssistantCamera"], 10);
        assert_eq!(json["verticalPanAssistantCamera"], -10);
        assert_eq!(json["resetPanAssistantCamera"], true);
    }

    #[test]
    fn test_from_json() {
        let msg = CtrlMessage::from_json(
            r#"{"streer": 12, "throttle": 100, "brake": -100,
                "horirontalPanAssistantCamera": 0,
                "verticalPanAssistantCamera": 0,
                "resetPanAssistantCamera": false}"#,
        )
        .unwrap();

        assert_eq!(msg.steer, 12);
        assert_eq!(msg.throttle, 100);
        assert_eq!(msg.brake, -100);
        assert!(!msg.reset_pan);
    }
}

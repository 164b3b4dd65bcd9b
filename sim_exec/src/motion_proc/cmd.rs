//! Motion platform command structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use util::maths::clamp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Limits of the normalised attitude axes.
pub const NORMALISED_RANGE: (f32, f32) = (-1.0, 1.0);

/// Hard rpm ceiling of the platform's haptic channel, independent of the
/// configured engine model.
///
/// Units: revolutions/minute
pub const RPM_RANGE: (f32, f32) = (0.0, 10000.0);

/// Hard torque ceiling of the platform's haptic channel.
///
/// Units: newton metres
pub const TORQUE_RANGE: (f32, f32) = (0.0, 1000.0);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One processed command for the motion platform.
///
/// Fields are clamped at construction, so a command always lies within the
/// platform's envelope no matter what the pipeline produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionCmd {
    /// Time of the raw sample this command was derived from (milliseconds
    /// since the UNIX epoch)
    timestamp_ms: i64,

    roll: f32,
    pitch: f32,
    heave: f32,
    rpm: f32,
    torque: f32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionCmd {
    /// Build a new command, clamping every field to its documented range.
    pub fn new(
        timestamp_ms: i64,
        roll: f32,
        pitch: f32,
        heave: f32,
        rpm: f32,
        torque: f32,
    ) -> Self {
        MotionCmd {
            timestamp_ms,
            roll: clamp(roll, NORMALISED_RANGE.0, NORMALISED_RANGE.1),
            pitch: clamp(pitch, NORMALISED_RANGE.0, NORMALISED_RANGE.1),
            heave: clamp(heave, NORMALISED_RANGE.0, NORMALISED_RANGE.1),
            rpm: clamp(rpm, RPM_RANGE.0, RPM_RANGE.1),
            torque: clamp(torque, TORQUE_RANGE.0, TORQUE_RANGE.1),
        }
    }

    /// The neutral command: platform level, engine silent.
    ///
    /// Used as the filter memory seed after a reset.
    pub fn neutral() -> Self {
        MotionCmd {
            timestamp_ms: 0,
            roll: 0.0,
            pitch: 0.0,
            heave: 0.0,
            rpm: 0.0,
            torque: 0.0,
        }
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    /// Roll attitude in [-1, 1], positive rolls the seat right.
    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// Pitch attitude in [-1, 1], positive pitches the seat back.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Heave in [-1, 1], positive lifts the seat.
    pub fn heave(&self) -> f32 {
        self.heave
    }

    /// Simulated engine speed.
    ///
    /// Units: revolutions/minute
    pub fn rpm(&self) -> f32 {
        self.rpm
    }

    /// Simulated engine torque.
    ///
    /// Units: newton metres
    pub fn torque(&self) -> f32 {
        self.torque
    }
}

impl Default for MotionCmd {
    fn default() -> Self {
        Self::neutral()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_construction_clamps_all_fields() {
        let cmd = MotionCmd::new(0, 3.0, -3.0, 0.5, 20000.0, -10.0);

        assert_eq!(cmd.roll(), 1.0);
        assert_eq!(cmd.pitch(), -1.0);
        assert_eq!(cmd.heave(), 0.5);
        assert_eq!(cmd.rpm(), 10000.0);
        assert_eq!(cmd.torque(), 0.0);
    }

    #[test]
    fn test_neutral_is_all_zero() {
        let cmd = MotionCmd::neutral();

        assert_eq!(cmd.roll(), 0.0);
        assert_eq!(cmd.pitch(), 0.0);
        assert_eq!(cmd.heave(), 0.0);
        assert_eq!(cmd.rpm(), 0.0);
        assert_eq!(cmd.torque(), 0.0);
    }
}

//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::NUM_MODES;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- HYSTERESIS ----

    /// Duty magnitude below which the vehicle is considered stopped.
    ///
    /// Units: percent
    pub stopped_threshold: i32,

    // ---- MODES ----

    /// Motor duty cap applied in each drive mode.
    ///
    /// Units: percent
    pub mode_duty_caps: [i32; NUM_MODES],

    /// Drive mode selected at startup.
    pub initial_mode: usize,

    // ---- SHUTDOWN ----

    /// Duty magnitude of the forced brake applied during close, in the
    /// direction opposite to the last commanded motion.
    ///
    /// Units: percent
    pub shutdown_brake_duty: i32,

    /// Time the forced brake duty is held during close.
    ///
    /// Units: milliseconds
    pub shutdown_brake_hold_ms: u64,

    /// Time the neutral duty is held during close before the driver is
    /// released.
    ///
    /// Units: milliseconds
    pub shutdown_neutral_hold_ms: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Params {
            stopped_threshold: 5,
            mode_duty_caps: [15, 30, 50, 100],
            initial_mode: 3,
            shutdown_brake_duty: 80,
            shutdown_brake_hold_ms: 300,
            shutdown_neutral_hold_ms: 175,
        }
    }
}

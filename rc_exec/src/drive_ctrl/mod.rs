//! Drive control module
//!
//! Converts driver input into motor and steering duty commands, including the
//! braking/reverse transition. The controller starts in an idle state with
//! actuation disabled, and is enabled by a rising edge of the start flag -
//! there is no way back to idle short of process shutdown.
//!
//! A reverse pedal press while the vehicle is moving forward is ambiguous: it
//! must first stop the vehicle (dynamic braking) before the same pedal may
//! command true reverse, so a direct forward-to-reverse duty inversion never
//! reaches the gearbox. The `ready_for_reverse` flag tracks the
//! brake-then-release cycle that arms true reverse.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod input;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use input::*;
pub use params::*;
pub use state::*;

use crate::act_driver::ActError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of drive modes.
pub const NUM_MODES: usize = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Controller has been closed, actuation is no longer possible")]
    Closed,

    #[error("Actuator write failed: {0}")]
    Actuator(#[from] ActError),
}

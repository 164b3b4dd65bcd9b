//! # Motion platform interfaces
//!
//! Capability trait for the haptic motion platform under the driver's seat.
//! Updates are fire-and-forget: the platform firmware interpolates between
//! the commanded attitudes itself, so the caller never waits on motion
//! completion. The native SDK binding lives behind this trait; only the
//! logging implementation in [`sim`] is provided in this crate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Simulated platform implementation for bench runs without the seat.
pub mod sim;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use thiserror::Error;

use crate::motion_proc::MotionCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by the motion platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("The platform is not connected")]
    NotConnected,

    #[error("Platform update rejected: {0}")]
    UpdateRejected(String),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Capability trait for the motion platform.
pub trait MotionPlatform: Send {
    /// Command the platform to the given attitude and haptic state.
    fn update(&mut self, cmd: &MotionCmd) -> Result<(), PlatformError>;

    /// Level the platform and silence the haptic channel.
    fn reset_to_neutral(&mut self) -> Result<(), PlatformError>;

    /// Release the platform, leaving it levelled.
    fn close(&mut self) -> Result<(), PlatformError>;
}

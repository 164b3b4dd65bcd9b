//! Motion processing module
//!
//! Converts raw inertial samples from the vehicle into commands for the
//! motion platform under the driver's seat: roll, pitch and heave attitudes
//! plus a simulated engine rpm and torque for the haptic channel.
//!
//! The processing pipeline, applied in order to every sample:
//!
//! 1. Validation (invalid samples produce no command)
//! 2. Deadzone with continuous remapping
//! 3. Axis mapping with a weighted accelerometer/gyroscope blend
//! 4. S-curve response shaping
//! 5. Configurable gains
//! 6. Low-pass filtering (optional)
//! 7. Rate limiting (optional)
//! 8. Rpm/torque derivation from acceleration magnitude
//! 9. Final clamp
//!
//! All stages are driven by [`MotionConfig`], whose setters clamp their
//! inputs so a bad configuration can never push the platform outside its
//! envelope.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod config;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use config::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during MotionProc operation.
#[derive(Debug, thiserror::Error)]
pub enum MotionProcError {
    #[error("The processor is not ready to accept samples")]
    NotReady,
}

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Gravitational offset removed from the vertical axis.
///
/// Units: g
pub const GRAVITY: f32 = 1.0;

/// Conversion factor from angular rate to normalised motion contribution.
pub const GYRO_SCALE: f32 = 0.02;

/// Full scale of the accelerometer, used as the deadzone remap range.
///
/// Units: g
pub const ACCEL_MAX_RANGE: f32 = 2.0;

/// Full scale of the gyroscope, used as the deadzone remap range.
///
/// Units: degrees/second
pub const GYRO_MAX_RANGE: f32 = 250.0;

/// Conversion factor from acceleration magnitude to engine rpm.
pub const RPM_FACTOR: f32 = 300.0;

/// Conversion factor from acceleration magnitude to engine torque.
pub const TORQUE_FACTOR: f32 = 30.0;

/// Maximum rpm change per processed sample, looser than the axis rate limit
/// so the haptic engine channel stays lively.
pub const RPM_RATE_LIMIT: f32 = 500.0;

/// Maximum torque change per processed sample.
pub const TORQUE_RATE_LIMIT: f32 = 50.0;

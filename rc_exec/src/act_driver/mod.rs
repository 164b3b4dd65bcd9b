//! # Actuator driver interfaces
//!
//! Capability traits for the vehicle's actuators: the drive motor ESC, the
//! steering servo and the assistant camera pan servos. The PWM hat's
//! register-level duty writes live behind these traits; only the simulated
//! implementations in [`sim`] are provided in this crate.
//!
//! Driver handles are owned by the module that commands them and passed in at
//! construction - there is no process-wide driver singleton.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Simulated actuator implementations for bench runs without hardware.
pub mod sim;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by actuator drivers.
#[derive(Debug, Error)]
pub enum ActError {
    #[error("Duty percent must be between -100 and 100, got {0}")]
    InvalidDuty(i32),

    #[error("PWM bus write failed: {0}")]
    BusError(String),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Capability trait for the motor ESC and steering servo.
///
/// Duty values are percentages in [-100, 100]. A negative motor duty is
/// interpreted by the ESC firmware as dynamic braking while the motor is
/// turning forward, and as reverse once it has stopped - the drive controller
/// is responsible for sequencing the two safely.
pub trait ActuatorDriver: Send {
    /// Set the motor ESC duty cycle.
    fn set_motor_duty(&mut self, percent: i32) -> Result<(), ActError>;

    /// Set the steering servo duty cycle.
    fn set_steering_duty(&mut self, percent: i32) -> Result<(), ActError>;

    /// Release the driver, leaving all channels in their last commanded state.
    fn close(&mut self) -> Result<(), ActError>;
}

/// Capability trait for the assistant camera pan servos.
///
/// Pan positions are raw servo pulse widths in microseconds.
pub trait CamPanDriver: Send {
    /// Set the horizontal pan servo pulse width.
    fn set_pan_pulse_hor(&mut self, pulse_us: i32) -> Result<(), ActError>;

    /// Set the vertical pan servo pulse width.
    fn set_pan_pulse_ver(&mut self, pulse_us: i32) -> Result<(), ActError>;
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that a duty percentage lies within [-100, 100].
pub fn check_duty(percent: i32) -> Result<(), ActError> {
    if percent < -100 || percent > 100 {
        Err(ActError::InvalidDuty(percent))
    }
    else {
        Ok(())
    }
}

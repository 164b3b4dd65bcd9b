//! Simulated actuator drivers
//!
//! Log-only implementations of the actuator traits, recording the last
//! commanded values so bench runs can be inspected.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use super::{check_duty, ActError, ActuatorDriver, CamPanDriver};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated ESC + steering servo.
#[derive(Default)]
pub struct SimActuator {
    last_motor_duty: Option<i32>,
    last_steering_duty: Option<i32>,
    closed: bool,
}

/// Simulated camera pan servo pair.
#[derive(Default)]
pub struct SimCamPan {
    last_pulse_hor: Option<i32>,
    last_pulse_ver: Option<i32>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last motor duty written, or `None` if no write has happened yet.
    pub fn last_motor_duty(&self) -> Option<i32> {
        self.last_motor_duty
    }

    /// Last steering duty written, or `None` if no write has happened yet.
    pub fn last_steering_duty(&self) -> Option<i32> {
        self.last_steering_duty
    }
}

impl ActuatorDriver for SimActuator {
    fn set_motor_duty(&mut self, percent: i32) -> Result<(), ActError> {
        check_duty(percent)?;
        self.last_motor_duty = Some(percent);
        trace!("SimActuator: motor duty set to {}%", percent);
        Ok(())
    }

    fn set_steering_duty(&mut self, percent: i32) -> Result<(), ActError> {
        check_duty(percent)?;
        self.last_steering_duty = Some(percent);
        trace!("SimActuator: steering duty set to {}%", percent);
        Ok(())
    }

    fn close(&mut self) -> Result<(), ActError> {
        self.closed = true;
        trace!("SimActuator: closed");
        Ok(())
    }
}

impl SimCamPan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_pulse_hor(&self) -> Option<i32> {
        self.last_pulse_hor
    }

    pub fn last_pulse_ver(&self) -> Option<i32> {
        self.last_pulse_ver
    }
}

impl CamPanDriver for SimCamPan {
    fn set_pan_pulse_hor(&mut self, pulse_us: i32) -> Result<(), ActError> {
        self.last_pulse_hor = Some(pulse_us);
        trace!("SimCamPan: horizontal pulse set to {} us", pulse_us);
        Ok(())
    }

    fn set_pan_pulse_ver(&mut self, pulse_us: i32) -> Result<(), ActError> {
        self.last_pulse_ver = Some(pulse_us);
        trace!("SimCamPan: vertical pulse set to {} us", pulse_us);
        Ok(())
    }
}

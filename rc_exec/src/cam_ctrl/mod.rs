//! Assistant camera pan control module
//!
//! Nudges the camera's pan servos from a controller axis. Axis values are
//! quantised in steps of 20 so small stick noise does not creep the camera,
//! and the resulting pulse increment is applied to the held position, which
//! is clamped to the servos' mechanical range. The axis sense is inverted so
//! that pushing the stick right pans the camera right.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use crate::act_driver::{ActError, CamPanDriver};
use comms_if::ctrl::CtrlMessage;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Shortest servo pulse accepted by either pan axis.
///
/// Units: microseconds
const PULSE_MIN_US: i32 = 1100;

/// Longest servo pulse accepted by either pan axis.
///
/// Units: microseconds
const PULSE_MAX_US: i32 = 1900;

/// Centre pulse of the horizontal axis.
///
/// Units: microseconds
const CENTRE_HOR_US: i32 = 1500;

/// Centre pulse of the vertical axis. The camera mount sits slightly nose
/// down, so centre is offset from the servo midpoint.
///
/// Units: microseconds
const CENTRE_VER_US: i32 = 1600;

/// Quantisation step applied to the incoming axis value.
const AXIS_STEP: i32 = 20;

/// Pulse increment per quantisation step.
///
/// Units: microseconds
const PULSE_PER_STEP_US: i32 = 40;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Camera pan control module state.
pub struct CamCtrl<C: CamPanDriver> {
    driver: C,

    pos_hor_us: i32,
    pos_ver_us: i32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C: CamPanDriver> CamCtrl<C> {
    /// Create a new camera controller and centre both axes.
    pub fn new(driver: C) -> Result<Self, ActError> {
        let mut ctrl = CamCtrl {
            driver,
            pos_hor_us: CENTRE_HOR_US,
            pos_ver_us: CENTRE_VER_US,
        };

        ctrl.driver.set_pan_pulse_hor(ctrl.pos_hor_us)?;
        ctrl.driver.set_pan_pulse_ver(ctrl.pos_ver_us)?;

        Ok(ctrl)
    }

    /// Apply a controller message to the pan servos.
    ///
    /// A reset request takes priority over the axis values.
    pub fn apply(&mut self, msg: &CtrlMessage) -> Result<(), ActError> {
        if msg.reset_pan {
            return self.reset_position();
        }

        self.pan_hor(msg.horizontal_pan as i32)?;
        self.pan_ver(msg.vertical_pan as i32)?;

        Ok(())
    }

    /// Nudge the horizontal axis by the given axis value.
    pub fn pan_hor(&mut self, value: i32) -> Result<(), ActError> {
        self.pos_hor_us = clamp_pulse(self.pos_hor_us + axis_to_pulse_increment(-value));
        self.driver.set_pan_pulse_hor(self.pos_hor_us)?;

        debug!("Horizontal pan at {} us", self.pos_hor_us);
        Ok(())
    }

    /// Nudge the vertical axis by the given axis value.
    pub fn pan_ver(&mut self, value: i32) -> Result<(), ActError> {
        self.pos_ver_us = clamp_pulse(self.pos_ver_us + axis_to_pulse_increment(-value));
        self.driver.set_pan_pulse_ver(self.pos_ver_us)?;

        debug!("Vertical pan at {} us", self.pos_ver_us);
        Ok(())
    }

    /// Recentre both axes.
    pub fn reset_position(&mut self) -> Result<(), ActError> {
        self.pos_hor_us = CENTRE_HOR_US;
        self.pos_ver_us = CENTRE_VER_US;

        self.driver.set_pan_pulse_hor(self.pos_hor_us)?;
        self.driver.set_pan_pulse_ver(self.pos_ver_us)?;

        debug!("Camera pan recentred");
        Ok(())
    }

    /// Current held positions as (horizontal, vertical) pulses.
    ///
    /// Units: microseconds
    pub fn positions_us(&self) -> (i32, i32) {
        (self.pos_hor_us, self.pos_ver_us)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert an axis value in [-100, 100] into a pulse increment.
///
/// Quantisation truncates towards zero, so values inside the first step are
/// ignored entirely.
fn axis_to_pulse_increment(value: i32) -> i32 {
    (value.clamp(-100, 100) / AXIS_STEP) * PULSE_PER_STEP_US
}

fn clamp_pulse(pulse_us: i32) -> i32 {
    pulse_us.clamp(PULSE_MIN_US, PULSE_MAX_US)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::act_driver::sim::SimCamPan;

    #[test]
    fn test_starts_centred() {
        let ctrl = CamCtrl::new(SimCamPan::new()).unwrap();
        assert_eq!(ctrl.positions_us(), (CENTRE_HOR_US, CENTRE_VER_US));
    }

    #[test]
    fn test_axis_sense_is_inverted() {
        let mut ctrl = CamCtrl::new(SimCamPan::new()).unwrap();

        // Full positive axis moves the pulse down by 5 steps
        ctrl.pan_hor(100).unwrap();
        assert_eq!(ctrl.positions_us().0, CENTRE_HOR_US - 5 * PULSE_PER_STEP_US);
    }

    #[test]
    fn test_small_values_are_quantised_away() {
        let mut ctrl = CamCtrl::new(SimCamPan::new()).unwrap();

        ctrl.pan_hor(19).unwrap();
        ctrl.pan_ver(-19).unwrap();

        assert_eq!(ctrl.positions_us(), (CENTRE_HOR_US, CENTRE_VER_US));
    }

    #[test]
    fn test_positions_clamp_at_travel_limits() {
        let mut ctrl = CamCtrl::new(SimCamPan::new()).unwrap();

        for _ in 0..10 {
            ctrl.pan_hor(-100).unwrap();
            ctrl.pan_ver(100).unwrap();
        }

        assert_eq!(ctrl.positions_us(), (PULSE_MAX_US, PULSE_MIN_US));
    }

    #[test]
    fn test_reset_recentres_and_writes_through() {
        let mut ctrl = CamCtrl::new(SimCamPan::new()).unwrap();

        ctrl.pan_hor(-100).unwrap();

        let msg = CtrlMessage {
            reset_pan: true,
            ..Default::default()
        };
        ctrl.apply(&msg).unwrap();

        assert_eq!(ctrl.positions_us(), (CENTRE_HOR_US, CENTRE_VER_US));
    }
}

//! Driver input structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::ctrl::CtrlMessage;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How the controller's pedals are presented to the drive controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisInputType {
    /// One signed pedal value: positive accelerates, negative brakes/reverses.
    SingleAxis,

    /// Separate accelerate and brake pedals, each in their native
    /// [-100, 100] range with -100 meaning fully released.
    DualAxis,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Input data to drive control for one tick.
///
/// A persistent structure owned by the exec: controller messages mutate it as
/// they arrive, and the controller samples it once per tick.
#[derive(Debug, Clone)]
pub struct DriverInput {
    /// Enables actuation on its first rising edge.
    pub start: bool,

    /// Accelerate pedal, native range (dual-axis only).
    pub accelerate: i32,

    /// Brake/reverse pedal, native range (dual-axis only).
    pub reverse: i32,

    /// Combined signed pedal value (single-axis only).
    pub accel_reverse: i32,

    /// Steering demand in [-100, 100].
    pub direction: i32,

    /// Mode increment control, an edge to a positive value steps the mode up.
    pub mode_up: i32,

    /// Mode decrement control, an edge to a positive value steps the mode
    /// down.
    pub mode_down: i32,

    pub axis_input_type: AxisInputType,

    /// Swap the sense of the pedals for controllers wired the other way
    /// round.
    pub invert_accel: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DriverInput {
    fn default() -> Self {
        DriverInput {
            start: false,
            accelerate: -100,
            reverse: -100,
            accel_reverse: 0,
            direction: 0,
            mode_up: 0,
            mode_down: 0,
            axis_input_type: AxisInputType::DualAxis,
            invert_accel: false,
        }
    }
}

impl DriverInput {
    /// Apply a controller message to the pedal and steering fields.
    ///
    /// In dual-axis mode the throttle maps to the accelerate pedal and the
    /// brake to the reverse pedal; in single-axis mode the throttle alone
    /// carries the signed pedal value. `invert_accel` swaps the pedals (or
    /// negates the single-axis value).
    pub fn update_from_ctrl(&mut self, msg: &CtrlMessage) {
        self.direction = msg.steer as i32;

        match self.axis_input_type {
            AxisInputType::DualAxis => {
                let (accel, reverse) = if self.invert_accel {
                    (msg.brake as i32, msg.throttle as i32)
                }
                else {
                    (msg.throttle as i32, msg.brake as i32)
                };

                self.accelerate = accel;
                self.reverse = reverse;
            }
            AxisInputType::SingleAxis => {
                let value = msg.throttle as i32;

                self.accel_reverse = if self.invert_accel {
                    -value
                }
                else {
                    value
                };
            }
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
    fn test_dual_axis_mapping() {
        let mut input = DriverInput::default();

        let msg = CtrlMessage {
            steer: -30,
            throttle: 60,
            brake: -100,
            ..Default::default()
        };

        input.update_from_ctrl(&msg);

        assert_eq!(input.direction, -30);
        assert_eq!(input.accelerate, 60);
        assert_eq!(input.reverse, -100);
    }

    #[test]
    fn test_invert_swaps_pedals() {
        let mut input = DriverInput {
            invert_accel: true,
            ..Default::default()
        };

        let msg = CtrlMessage {
            throttle: 60,
            brake: -100,
            ..Default::default()
        };

        input.update_from_ctrl(&msg);

        assert_eq!(input.accelerate, -100);
        assert_eq!(input.reverse, 60);
    }

    #[test]
    fn test_single_axis_negation() {
        let mut input = DriverInput {
            axis_input_type: AxisInputType::SingleAxis,
            invert_accel: true,
            ..Default::default()
        };

        let msg = CtrlMessage {
            throttle: 40,
            ..Default::default()
        };

        input.update_from_ctrl(&msg);

        assert_eq!(input.accel_reverse, -40);
    }
}

//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, info, warn};
use serde::Serialize;
use std::time::Duration;

// Internal
use super::{AxisInputType, DriveCtrlError, DriverInput, Params, NUM_MODES};
use crate::act_driver::ActuatorDriver;
use util::{
    maths::lin_map,
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state.
pub struct DriveCtrl<D: ActuatorDriver> {
    driver: D,

    pub(crate) params: Params,

    act_state: ActState,

    closed: bool,
}

/// Actuation state carried between ticks.
#[derive(Debug, Clone)]
struct ActState {
    started: bool,

    mode: usize,

    /// Last duty sent to the motor, `None` before the first write.
    last_motor_duty: Option<i32>,

    /// Last duty sent to the steering servo, `None` before the first write.
    last_steering_duty: Option<i32>,

    /// Set once a brake-then-release cycle has completed while stopped,
    /// arming the reverse pedal for true reverse.
    ready_for_reverse: bool,

    /// Mode control values seen on the previous tick, for edge detection.
    prev_mode_up: i32,
    prev_mode_down: i32,
}

/// Output data from one drive control tick.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TickReport {
    pub started: bool,
    pub mode: usize,
    pub motor_duty: i32,
    pub steering_duty: i32,
    pub ready_for_reverse: bool,
}

/// Status report for DriveCtrl processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub motor_write_suppressed: bool,
    pub steering_write_suppressed: bool,

    /// True when the mode cap limited the demanded duty this tick.
    pub duty_capped: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ActState {
    fn default() -> Self {
        ActState {
            started: false,
            mode: 0,
            last_motor_duty: None,
            last_steering_duty: None,
            ready_for_reverse: false,
            prev_mode_up: 0,
            prev_mode_down: 0,
        }
    }
}

impl<D: ActuatorDriver> DriveCtrl<D> {
    /// Create a new controller owning the given actuator driver.
    ///
    /// The controller starts idle with default parameters; call
    /// [`State::init`] to load parameters from the session's param file.
    pub fn new(driver: D) -> Self {
        let params = Params::default();
        let mode = params.initial_mode.min(NUM_MODES - 1);

        DriveCtrl {
            driver,
            params,
            act_state: ActState {
                mode,
                ..Default::default()
            },
            closed: false,
        }
    }

    /// Whether actuation has been enabled by a start edge.
    pub fn is_started(&self) -> bool {
        self.act_state.started
    }

    /// Direct motor duty passthrough for bench calibration.
    ///
    /// Bypasses the state machine but not the write suppression.
    pub fn send_manual_motor_duty(&mut self, duty: i32) -> Result<bool, DriveCtrlError> {
        if self.closed {
            return Err(DriveCtrlError::Closed);
        }
        self.write_motor(duty)
    }

    /// Direct steering duty passthrough for bench calibration.
    pub fn send_manual_steering_duty(&mut self, duty: i32) -> Result<bool, DriveCtrlError> {
        if self.closed {
            return Err(DriveCtrlError::Closed);
        }
        self.write_steering(duty)
    }

    /// Check the age of the last controller input against the timeout, and
    /// stop the vehicle if it is stale.
    ///
    /// The failsafe only arms once actuation has started - before that there
    /// is no motion to stop and no driver expected. A stale input forces the
    /// full close sequence, whatever pedal values were last received.
    ///
    /// Returns true when the failsafe engaged.
    pub fn enforce_input_timeout(&mut self, input_age: Duration, timeout: Duration) -> bool {
        if !self.act_state.started || self.closed || input_age <= timeout {
            return false;
        }

        error!(
            "No controller input for {} ms (timeout {} ms), stopping the vehicle",
            input_age.as_millis(),
            timeout.as_millis()
        );

        self.close();
        true
    }

    /// Stop the vehicle and release the actuator driver.
    ///
    /// Forces a brake sequence when the vehicle was last commanded into
    /// motion: a strong duty opposite to the motion direction held briefly,
    /// then neutral. Errors during the sequence are logged and cleanup
    /// proceeds regardless. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let last_duty = self.act_state.last_motor_duty.unwrap_or(0);
        let threshold = self.params.stopped_threshold;

        let brake_duty = if last_duty > threshold {
            -self.params.shutdown_brake_duty
        }
        else if last_duty < -threshold {
            self.params.shutdown_brake_duty
        }
        else {
            0
        };

        if brake_duty != 0 {
            info!("Shutdown brake sequence: {}% for {} ms",
                brake_duty, self.params.shutdown_brake_hold_ms);

            if let Err(e) = self.driver.set_motor_duty(brake_duty) {
                warn!("Shutdown brake write failed: {}", e);
            }
            std::thread::sleep(std::time::Duration::from_millis(
                self.params.shutdown_brake_hold_ms,
            ));
        }

        if let Err(e) = self.driver.set_motor_duty(0) {
            warn!("Shutdown neutral write failed: {}", e);
        }
        self.act_state.last_motor_duty = Some(0);

        std::thread::sleep(std::time::Duration::from_millis(
            self.params.shutdown_neutral_hold_ms,
        ));

        if let Err(e) = self.driver.close() {
            warn!("Actuator driver close failed: {}", e);
        }

        info!("DriveCtrl closed");
    }

    /// Write a motor duty unless it matches the last written value.
    ///
    /// Returns true when the write was suppressed.
    fn write_motor(&mut self, duty: i32) -> Result<bool, DriveCtrlError> {
        if self.act_state.last_motor_duty == Some(duty) {
            return Ok(true);
        }

        self.driver.set_motor_duty(duty)?;
        self.act_state.last_motor_duty = Some(duty);
        Ok(false)
    }

    /// Write a steering duty unless it matches the last written value.
    ///
    /// Returns true when the write was suppressed.
    fn write_steering(&mut self, duty: i32) -> Result<bool, DriveCtrlError> {
        if self.act_state.last_steering_duty == Some(duty) {
            return Ok(true);
        }

        self.driver.set_steering_duty(duty)?;
        self.act_state.last_steering_duty = Some(duty);
        Ok(false)
    }

    /// Convert the pedal fields of the input into (accelerate, reverse)
    /// percentages, each in [0, 100].
    fn pedal_percentages(&self, input: &DriverInput) -> (i32, i32) {
        match input.axis_input_type {
            AxisInputType::DualAxis => {
                let accel = lin_map(
                    (-100.0, 100.0),
                    (0.0, 100.0),
                    input.accelerate.clamp(-100, 100) as f64,
                )
                .round() as i32;
                let reverse = lin_map(
                    (-100.0, 100.0),
                    (0.0, 100.0),
                    input.reverse.clamp(-100, 100) as f64,
                )
                .round() as i32;
                (accel, reverse)
            }
            AxisInputType::SingleAxis => {
                let value = input.accel_reverse.clamp(-100, 100);
                (value.max(0), (-value).max(0))
            }
        }
    }
}

impl<D: ActuatorDriver> State for DriveCtrl<D> {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = DriverInput;
    type OutputData = TickReport;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the DriveCtrl module.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(init_data)?;
        self.act_state.mode = self.params.initial_mode.min(NUM_MODES - 1);

        Ok(())
    }

    /// Advance the drive state machine by one tick.
    ///
    /// Evaluation order matters: mode edges first so the new cap applies to
    /// this tick's pedals, then pedals, then duty writes.
    fn proc(&mut self, input: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        if self.closed {
            return Err(DriveCtrlError::Closed);
        }

        let mut report = StatusReport::default();

        // Start gating. The enabling edge consumes the tick, actuation
        // begins on the next one.
        if !self.act_state.started {
            if input.start {
                self.act_state.started = true;
                info!("Drive control started");
            }

            return Ok((self.tick_report(), report));
        }

        // Mode edges
        if input.mode_down > 0 && input.mode_down != self.act_state.prev_mode_down {
            self.act_state.mode = self.act_state.mode.saturating_sub(1);
            info!("Drive mode down to {}", self.act_state.mode);
        }
        if input.mode_up > 0 && input.mode_up != self.act_state.prev_mode_up {
            self.act_state.mode = (self.act_state.mode + 1).min(NUM_MODES - 1);
            info!("Drive mode up to {}", self.act_state.mode);
        }
        self.act_state.prev_mode_up = input.mode_up;
        self.act_state.prev_mode_down = input.mode_down;

        let cap = self.params.mode_duty_caps[self.act_state.mode];

        // Pedals
        let (accel, reverse) = self.pedal_percentages(input);

        // Steering
        let steering_duty = input.direction.clamp(-100, 100);
        report.steering_write_suppressed = self.write_steering(steering_duty)?;

        // Drive/brake/reverse hysteresis
        let threshold = self.params.stopped_threshold;
        let current_duty = self.act_state.last_motor_duty.unwrap_or(0);

        let motor_duty = if accel > threshold {
            self.act_state.ready_for_reverse = false;

            if accel > cap {
                report.duty_capped = true;
            }
            accel.min(cap)
        }
        else if reverse > threshold {
            if current_duty > threshold {
                // Moving forward, apply proportional dynamic braking
                self.act_state.ready_for_reverse = false;
                -reverse
            }
            else if self.act_state.ready_for_reverse {
                // Stopped and armed, true reverse
                if reverse > cap {
                    report.duty_capped = true;
                }
                -reverse.min(cap)
            }
            else {
                // Not yet confirmed stopped, keep braking
                -reverse
            }
        }
        else {
            // Brake released while stopped arms reverse
            if current_duty < -threshold {
                self.act_state.ready_for_reverse = true;
            }
            0
        };

        report.motor_write_suppressed = self.write_motor(motor_duty)?;

        Ok((self.tick_report(), report))
    }
}

impl<D: ActuatorDriver> DriveCtrl<D> {
    fn tick_report(&self) -> TickReport {
        TickReport {
            started: self.act_state.started,
            mode: self.act_state.mode,
            motor_duty: self.act_state.last_motor_duty.unwrap_or(0),
            steering_duty: self.act_state.last_steering_duty.unwrap_or(0),
            ready_for_reverse: self.act_state.ready_for_reverse,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::act_driver::sim::SimActuator;

    fn single_axis_input(accel_reverse: i32) -> DriverInput {
        DriverInput {
            start: true,
            accel_reverse,
            axis_input_type: AxisInputType::SingleAxis,
            ..Default::default()
        }
    }

    /// Step the mode down by `n` through distinct edge values.
    fn mode_down(ctrl: &mut DriveCtrl<SimActuator>, n: i32) {
        for i in 1..=n {
            let input = DriverInput {
                start: true,
                mode_down: i,
                axis_input_type: AxisInputType::SingleAxis,
                ..Default::default()
            };
            ctrl.proc(&input).unwrap();
        }
    }

    #[test]
    fn test_start_gating() {
        let mut ctrl = DriveCtrl::new(SimActuator::new());

        // Pedal input before the start edge does nothing
        let mut input = single_axis_input(60);
        input.start = false;

        let (report, _) = ctrl.proc(&input).unwrap();
        assert!(!report.started);
        assert!(!ctrl.is_started());
        assert_eq!(report.motor_duty, 0);

        // The start edge consumes its tick
        input.start = true;
        let (report, _) = ctrl.proc(&input).unwrap();
        assert!(report.started);
        assert_eq!(report.motor_duty, 0);

        // Actuation begins on the next tick
        let (report, _) = ctrl.proc(&input).unwrap();
        assert_eq!(report.motor_duty, 60);
    }

    #[test]
    fn test_hysteresis_brake_then_reverse() {
        let mut ctrl = DriveCtrl::new(SimActuator::new());

        // Start and drop to mode 0 (cap 15%) so brake and true reverse
        // duties are distinguishable
        ctrl.proc(&single_axis_input(0)).unwrap();
        mode_down(&mut ctrl, 3);

        // Accelerate, forward duty capped by mode
        for _ in 0..5 {
            let (report, _) = ctrl.proc(&single_axis_input(60)).unwrap();
            assert_eq!(report.motor_duty, 15);
            assert!(!report.ready_for_reverse);
        }

        // Reverse pedal while moving forward: dynamic brake, uncapped
        for _ in 0..5 {
            let (report, _) = ctrl.proc(&single_axis_input(-60)).unwrap();
            assert_eq!(report.motor_duty, -60);
            assert!(!report.ready_for_reverse);
        }

        // Release both pedals: brake released while stopped arms reverse
        let (report, _) = ctrl.proc(&single_axis_input(0)).unwrap();
        assert_eq!(report.motor_duty, 0);
        assert!(report.ready_for_reverse);

        // Reverse pedal again: true reverse, capped by mode
        let (report, _) = ctrl.proc(&single_axis_input(-60)).unwrap();
        assert_eq!(report.motor_duty, -15);
        assert!(report.ready_for_reverse);

        // Accelerating clears the armed flag
        let (report, _) = ctrl.proc(&single_axis_input(60)).unwrap();
        assert_eq!(report.motor_duty, 15);
        assert!(!report.ready_for_reverse);
    }

    #[test]
    fn test_mode_capping() {
        let mut ctrl = DriveCtrl::new(SimActuator::new());

        ctrl.proc(&single_axis_input(0)).unwrap();
        mode_down(&mut ctrl, 3);

        let (report, status) = ctrl.proc(&single_axis_input(100)).unwrap();
        assert_eq!(report.mode, 0);
        assert_eq!(report.motor_duty, 15);
        assert!(status.duty_capped);
    }

    #[test]
    fn test_mode_edge_requires_change() {
        let mut ctrl = DriveCtrl::new(SimActuator::new());
        ctrl.proc(&single_axis_input(0)).unwrap();

        let input = DriverInput {
            start: true,
            mode_down: 1,
            axis_input_type: AxisInputType::SingleAxis,
            ..Default::default()
        };

        // Holding the same value is one edge, not one per tick
        let (report, _) = ctrl.proc(&input).unwrap();
        assert_eq!(report.mode, 2);
        let (report, _) = ctrl.proc(&input).unwrap();
        assert_eq!(report.mode, 2);
    }

    #[test]
    fn test_write_suppression() {
        let mut ctrl = DriveCtrl::new(SimActuator::new());
        ctrl.proc(&single_axis_input(0)).unwrap();

        let input = DriverInput {
            start: true,
            accel_reverse: 40,
            direction: 20,
            axis_input_type: AxisInputType::SingleAxis,
            ..Default::default()
        };

        let (_, status) = ctrl.proc(&input).unwrap();
        assert!(!status.motor_write_suppressed);
        assert!(!status.steering_write_suppressed);

        // Unchanged demand is not rewritten
        let (_, status) = ctrl.proc(&input).unwrap();
        assert!(status.motor_write_suppressed);
        assert!(status.steering_write_suppressed);
    }

    #[test]
    fn test_dual_axis_released_pedals_are_neutral() {
        let mut ctrl = DriveCtrl::new(SimActuator::new());

        let input = DriverInput {
            start: true,
            ..Default::default()
        };

        ctrl.proc(&input).unwrap();
        let (report, _) = ctrl.proc(&input).unwrap();
        assert_eq!(report.motor_duty, 0);

        // Full throttle maps to full forward
        let input = DriverInput {
            start: true,
            accelerate: 100,
            ..Default::default()
        };
        let (report, _) = ctrl.proc(&input).unwrap();
        assert_eq!(report.motor_duty, 100);
    }

    #[test]
    fn test_stale_input_forces_stop() {
        let mut ctrl = DriveCtrl::new(SimActuator::new());
        ctrl.params.shutdown_brake_hold_ms = 1;
        ctrl.params.shutdown_neutral_hold_ms = 1;

        let timeout = Duration::from_millis(1000);

        // Not armed before the start edge
        assert!(!ctrl.enforce_input_timeout(Duration::from_secs(60), timeout));

        ctrl.proc(&single_axis_input(60)).unwrap();
        ctrl.proc(&single_axis_input(60)).unwrap();

        // Fresh input does not trip the failsafe
        assert!(!ctrl.enforce_input_timeout(Duration::from_millis(200), timeout));

        // Stale input stops the vehicle even though the last pedal value
        // was full ahead
        assert!(ctrl.enforce_input_timeout(Duration::from_millis(1001), timeout));
        assert!(matches!(
            ctrl.proc(&single_axis_input(60)),
            Err(DriveCtrlError::Closed)
        ));

        // Already stopped, nothing further to engage
        assert!(!ctrl.enforce_input_timeout(Duration::from_secs(60), timeout));
    }

    #[test]
    fn test_manual_passthrough_bypasses_state_machine() {
        let mut ctrl = DriveCtrl::new(SimActuator::new());

        // Works without a start edge, but still suppresses repeats
        assert!(!ctrl.send_manual_motor_duty(30).unwrap());
        assert!(ctrl.send_manual_motor_duty(30).unwrap());
        assert!(!ctrl.send_manual_steering_duty(-10).unwrap());

        assert!(matches!(
            ctrl.send_manual_motor_duty(200),
            Err(DriveCtrlError::Actuator(_))
        ));
    }

    #[test]
    fn test_close_is_idempotent_and_final() {
        let mut ctrl = DriveCtrl::new(SimActuator::new());
        ctrl.params.shutdown_brake_hold_ms = 1;
        ctrl.params.shutdown_neutral_hold_ms = 1;

        ctrl.proc(&single_axis_input(0)).unwrap();
        ctrl.proc(&single_axis_input(60)).unwrap();

        ctrl.close();
        ctrl.close();

        assert!(matches!(
            ctrl.proc(&single_axis_input(60)),
            Err(DriveCtrlError::Closed)
        ));
    }
}

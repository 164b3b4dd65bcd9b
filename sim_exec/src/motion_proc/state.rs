//! Implementations for the MotionProc state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Serialize;

// Internal
use super::{
    MotionCmd, MotionConfig, MotionProcError, ACCEL_MAX_RANGE, GRAVITY, GYRO_MAX_RANGE,
    GYRO_SCALE, RPM_FACTOR, RPM_RATE_LIMIT, TORQUE_FACTOR, TORQUE_RATE_LIMIT,
};
use comms_if::sensor::MpuData;
use util::{
    maths::{clamp, norm},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motion processing module state.
#[derive(Default)]
pub struct MotionProc {
    pub(crate) config: MotionConfig,

    ready: bool,

    /// Last command produced, the memory of the low-pass and rate limiting
    /// stages.
    last_cmd: MotionCmd,
}

/// Status report for MotionProc processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// False when the sample was rejected by validation.
    pub input_valid: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionProc {
    /// Create a new processor with the given configuration.
    pub fn new(config: MotionConfig) -> Self {
        MotionProc {
            config,
            ready: true,
            last_cmd: MotionCmd::neutral(),
        }
    }

    /// Whether the processor is able to accept samples.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Restore the filter memory to the neutral command.
    ///
    /// Must be called whenever the upstream sensor feed reconnects, so the
    /// first samples of the new session are not filtered against stale
    /// memory.
    pub fn reset(&mut self) {
        self.last_cmd = MotionCmd::neutral();
        info!("MotionProc reset to neutral");
    }

    /// Process one raw inertial sample into a platform command.
    ///
    /// Returns `None` when the sample fails validation - the platform simply
    /// holds its last attitude for that frame.
    pub fn process(&mut self, raw: &MpuData) -> Option<MotionCmd> {
        if !raw.is_valid() {
            warn!("Rejecting invalid inertial sample: {:?}", raw);
            return None;
        }

        // Axis mapping, deadzoned and shaped
        let mut roll = self.convert_to_roll(raw.accel_y, raw.gyro_x);
        let mut pitch = self.convert_to_pitch(raw.accel_x, raw.gyro_y);
        let mut heave = self.convert_to_heave(raw.accel_z);

        // Engine channel from the horizontal acceleration magnitude
        let mut rpm = self.convert_to_rpm(raw.accel_x, raw.accel_y);
        let mut torque = self.convert_to_torque(raw.accel_x, raw.accel_y);

        // Gains
        roll *= self.config.roll_gain();
        pitch *= self.config.pitch_gain();
        heave *= self.config.heave_gain();

        // Low-pass filtering
        if self.config.filtering_enabled() {
            let alpha = self.config.smoothing_factor();
            roll = low_pass(roll, self.last_cmd.roll(), alpha);
            pitch = low_pass(pitch, self.last_cmd.pitch(), alpha);
            heave = low_pass(heave, self.last_cmd.heave(), alpha);
            rpm = low_pass(rpm, self.last_cmd.rpm(), alpha);
            torque = low_pass(torque, self.last_cmd.torque(), alpha);
        }

        // Rate limiting, with looser bounds for the engine channel
        if self.config.rate_limiting_enabled() {
            let max_delta = self.config.max_rate_of_change();
            roll = rate_limit(roll, self.last_cmd.roll(), max_delta);
            pitch = rate_limit(pitch, self.last_cmd.pitch(), max_delta);
            heave = rate_limit(heave, self.last_cmd.heave(), max_delta);

            rpm = rate_limit(rpm, self.last_cmd.rpm(), RPM_RATE_LIMIT);
            torque = rate_limit(torque, self.last_cmd.torque(), TORQUE_RATE_LIMIT);
        }

        // Construction clamps every field as the final guarantee
        let cmd = MotionCmd::new(raw.timestamp_ms, roll, pitch, heave, rpm, torque);

        self.last_cmd = cmd;

        Some(cmd)
    }

    /// Lateral acceleration and roll rate into a roll attitude.
    ///
    /// The sign is inverted so a right-hand corner (positive lateral
    /// acceleration) rolls the seat into the corner.
    fn convert_to_roll(&self, accel_y: f32, gyro_x: f32) -> f32 {
        let clean_accel = apply_deadzone(accel_y, self.config.accel_deadzone(), ACCEL_MAX_RANGE);
        let clean_gyro = apply_deadzone(gyro_x, self.config.gyro_deadzone(), GYRO_MAX_RANGE);

        let accel_component = clean_accel / self.config.accel_y_range();
        let gyro_component = clean_gyro * GYRO_SCALE;

        let accel_w = self.config.accel_weight();
        let roll = accel_w * accel_component + (1.0 - accel_w) * gyro_component;

        let roll = apply_s_curve(roll, self.config.s_curve_intensity());

        clamp(-roll, -1.0, 1.0)
    }

    /// Longitudinal acceleration and pitch rate into a pitch attitude.
    ///
    /// Braking (negative longitudinal acceleration) pitches the seat
    /// forward.
    fn convert_to_pitch(&self, accel_x: f32, gyro_y: f32) -> f32 {
        let clean_accel = apply_deadzone(accel_x, self.config.accel_deadzone(), ACCEL_MAX_RANGE);
        let clean_gyro = apply_deadzone(gyro_y, self.config.gyro_deadzone(), GYRO_MAX_RANGE);

        let accel_component = -clean_accel / self.config.accel_x_range();
        let gyro_component = clean_gyro * GYRO_SCALE;

        let accel_w = self.config.accel_weight();
        let pitch = accel_w * accel_component + (1.0 - accel_w) * gyro_component;

        let pitch = apply_s_curve(pitch, self.config.s_curve_intensity());

        clamp(pitch, -1.0, 1.0)
    }

    /// Net vertical acceleration into heave.
    ///
    /// The gravity offset is removed first, and the deadzone is halved to
    /// keep the channel sensitive to small bumps.
    fn convert_to_heave(&self, accel_z: f32) -> f32 {
        let net_accel = accel_z - GRAVITY;

        let clean_accel = apply_deadzone(net_accel, self.config.accel_deadzone() * 0.5, 1.0);

        let heave = clean_accel / self.config.accel_z_range();

        let heave = apply_s_curve(heave, self.config.s_curve_intensity());

        clamp(heave, -1.0, 1.0)
    }

    /// Simulated engine speed from the horizontal acceleration magnitude.
    fn convert_to_rpm(&self, accel_x: f32, accel_y: f32) -> f32 {
        let magnitude = norm(&[accel_x, accel_y]);

        let rpm = self.config.engine_idle_rpm() + magnitude * RPM_FACTOR;

        clamp(rpm, 0.0, self.config.engine_max_rpm())
    }

    /// Simulated engine torque from the horizontal acceleration magnitude.
    fn convert_to_torque(&self, accel_x: f32, accel_y: f32) -> f32 {
        let magnitude = norm(&[accel_x, accel_y]);

        let torque = self.config.engine_base_torque() + magnitude * TORQUE_FACTOR;

        clamp(torque, 0.0, self.config.engine_max_torque())
    }
}

impl State for MotionProc {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = MpuData;
    type OutputData = Option<MotionCmd>;
    type StatusReport = StatusReport;
    type ProcError = MotionProcError;

    /// Initialise the MotionProc module.
    ///
    /// Expected init data is the path to the configuration file.
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        self.config = params::load(init_data)?;
        self.last_cmd = MotionCmd::neutral();
        self.ready = true;

        Ok(())
    }

    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        if !self.ready {
            return Err(MotionProcError::NotReady);
        }

        let cmd = self.process(input_data);

        Ok((
            cmd,
            StatusReport {
                input_valid: cmd.is_some(),
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Zero values inside the deadzone and remap the rest linearly, so the
/// output is continuous at the deadzone boundary.
fn apply_deadzone(value: f32, deadzone: f32, max_range: f32) -> f32 {
    let abs_value = value.abs();

    if abs_value <= deadzone {
        return 0.0;
    }

    let remapped = (abs_value - deadzone) / (max_range - deadzone) * max_range;

    value.signum() * remapped
}

/// Non-linear response shaping: soft near the extremes, more aggressive
/// through the middle of the range.
///
/// `output = sign(x) * |x|^(1 + intensity * (1 - |x|))`, which is the
/// identity when intensity is zero.
fn apply_s_curve(value: f32, intensity: f32) -> f32 {
    if intensity <= 0.0 {
        return value;
    }

    let abs_value = value.abs();
    let exponent = 1.0 + intensity * (1.0 - abs_value);

    value.signum() * abs_value.powf(exponent)
}

/// Exponential smoothing: `alpha * input + (1 - alpha) * previous`.
fn low_pass(current: f32, previous: f32, alpha: f32) -> f32 {
    alpha * current + (1.0 - alpha) * previous
}

/// Limit the change from the previous value to `max_delta`.
fn rate_limit(current: f32, previous: f32, max_delta: f32) -> f32 {
    let delta = current - previous;

    if delta.abs() > max_delta {
        previous + delta.signum() * max_delta
    }
    else {
        current
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(accel_x: f32, accel_y: f32, accel_z: f32) -> MpuData {
        MpuData {
            accel_x,
            accel_y,
            accel_z,
            gyro_x: 0.0,
            gyro_y: 0.0,
            gyro_z: 0.0,
            temperature: 25.0,
            timestamp_ms: 1_700_000_000_000,
        }
    }

    /// Config with the memory stages disabled, to test the mapping alone.
    fn direct_config() -> MotionConfig {
        let mut config = MotionConfig::default();
        config.set_filtering_enabled(false);
        config.set_rate_limiting_enabled(false);
        config
    }

    #[test]
    fn test_invalid_sample_produces_no_command() {
        let mut proc = MotionProc::new(direct_config());

        let mut bad = sample(0.0, 0.0, 1.0);
        bad.accel_x = f32::NAN;
        assert!(proc.process(&bad).is_none());

        let mut bad = sample(0.0, 0.0, 1.0);
        bad.gyro_z = 3000.0;
        assert!(proc.process(&bad).is_none());
    }

    #[test]
    fn test_outputs_always_in_range() {
        let mut proc = MotionProc::new(direct_config());

        let extremes = [
            sample(39.0, -39.0, 39.0),
            sample(-39.0, 39.0, -39.0),
            sample(0.0, 0.0, 1.0),
        ];

        for s in extremes.iter() {
            let cmd = proc.process(s).unwrap();

            assert!(cmd.roll() >= -1.0 && cmd.roll() <= 1.0);
            assert!(cmd.pitch() >= -1.0 && cmd.pitch() <= 1.0);
            assert!(cmd.heave() >= -1.0 && cmd.heave() <= 1.0);
            assert!(cmd.rpm() >= 0.0 && cmd.rpm() <= proc.config.engine_max_rpm());
            assert!(cmd.torque() >= 0.0 && cmd.torque() <= proc.config.engine_max_torque());
        }
    }

    #[test]
    fn test_deadzone_is_continuous_at_boundary() {
        let deadzone = 0.05;

        assert_eq!(apply_deadzone(0.03, deadzone, ACCEL_MAX_RANGE), 0.0);
        assert_eq!(apply_deadzone(deadzone, deadzone, ACCEL_MAX_RANGE), 0.0);

        // Just past the boundary the remapped output tends to zero
        let just_outside = apply_deadzone(deadzone + 1e-4, deadzone, ACCEL_MAX_RANGE);
        assert!(just_outside.abs() < 1e-3);

        // Sign is preserved
        assert!(apply_deadzone(-0.1, deadzone, ACCEL_MAX_RANGE) < 0.0);
    }

    #[test]
    fn test_s_curve_identity_at_zero_intensity() {
        for i in -10..=10 {
            let x = i as f32 / 10.0;
            assert_eq!(apply_s_curve(x, 0.0), x);
        }
    }

    #[test]
    fn test_s_curve_preserves_endpoints() {
        assert_relative_eq!(apply_s_curve(1.0, 0.7), 1.0);
        assert_relative_eq!(apply_s_curve(-1.0, 0.7), -1.0);
        assert_eq!(apply_s_curve(0.0, 0.7), 0.0);
    }

    #[test]
    fn test_filter_converges_geometrically() {
        let mut config = direct_config();
        let mut proc = MotionProc::new(config.clone());

        // Target value of the mapping for this sample
        let s = sample(0.3, 0.0, 1.0);
        let target = proc.process(&s).unwrap();

        // Same sample through a filtering processor converges to the target
        config.set_filtering_enabled(true);
        let mut proc = MotionProc::new(config);

        let mut last = MotionCmd::neutral();
        for _ in 0..50 {
            last = proc.process(&s).unwrap();
        }

        assert_relative_eq!(last.pitch(), target.pitch(), epsilon = 1e-4);
        assert_relative_eq!(last.rpm(), target.rpm(), epsilon = 1e-1);
    }

    #[test]
    fn test_rate_limit_bounds_per_frame_change() {
        assert_eq!(rate_limit(1.0, 0.0, 0.15), 0.15);
        assert_eq!(rate_limit(-1.0, 0.0, 0.15), -0.15);
        assert_eq!(rate_limit(0.1, 0.0, 0.15), 0.1);
    }

    #[test]
    fn test_roll_sign_is_inverted() {
        let mut proc = MotionProc::new(direct_config());

        // Positive lateral acceleration rolls the seat negative
        let cmd = proc.process(&sample(0.0, 0.5, 1.0)).unwrap();
        assert!(cmd.roll() < 0.0);

        // Braking pitches the seat forward (positive, by the sign inversion
        // of the longitudinal axis)
        let cmd = proc.process(&sample(-0.5, 0.0, 1.0)).unwrap();
        assert!(cmd.pitch() > 0.0);
    }

    #[test]
    fn test_reset_restores_neutral_memory() {
        let mut proc = MotionProc::new(MotionConfig::default());

        for _ in 0..20 {
            proc.process(&sample(0.5, 0.5, 1.5));
        }

        proc.reset();

        // With alpha = 0.4 and neutral memory, the first output after reset
        // is well below the settled value
        let settled = {
            let mut p = MotionProc::new(direct_config());
            p.process(&sample(0.5, 0.5, 1.5)).unwrap()
        };
        let first = proc.process(&sample(0.5, 0.5, 1.5)).unwrap();

        assert!(first.rpm() < settled.rpm());
    }
}

//! Motion processing configuration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Configuration of the motion processing pipeline.
///
/// Fields are private so every write goes through a clamping setter, keeping
/// a bad value from ever driving the platform outside its envelope. The
/// defaults are tuned for the MPU-6050 at its +/-2 g and +/-250 deg/s full
/// scales.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionConfig {
    // ---- GAINS ----
    roll_gain: f32,
    pitch_gain: f32,
    heave_gain: f32,

    // ---- LOW-PASS FILTER ----
    filtering_enabled: bool,
    smoothing_factor: f32,

    // ---- RESPONSE SHAPING ----
    s_curve_intensity: f32,

    // ---- DEADZONES ----
    accel_deadzone: f32,
    gyro_deadzone: f32,

    // ---- RATE LIMITING ----
    rate_limiting_enabled: bool,
    max_rate_of_change: f32,

    // ---- SENSOR BLEND ----
    accel_weight: f32,

    // ---- NORMALISATION RANGES ----
    accel_x_range: f32,
    accel_y_range: f32,
    accel_z_range: f32,

    // ---- ENGINE MODEL ----
    engine_idle_rpm: f32,
    engine_max_rpm: f32,
    engine_base_torque: f32,
    engine_max_torque: f32,
}

/// Unvalidated mirror of [`MotionConfig`] used during deserialisation, so
/// file values pass through the same clamping setters as programmatic ones.
#[derive(Debug, Deserialize)]
struct RawMotionConfig {
    roll_gain: f32,
    pitch_gain: f32,
    heave_gain: f32,
    filtering_enabled: bool,
    smoothing_factor: f32,
    s_curve_intensity: f32,
    accel_deadzone: f32,
    gyro_deadzone: f32,
    rate_limiting_enabled: bool,
    max_rate_of_change: f32,
    accel_weight: f32,
    accel_x_range: f32,
    accel_y_range: f32,
    accel_z_range: f32,
    engine_idle_rpm: f32,
    engine_max_rpm: f32,
    engine_base_torque: f32,
    engine_max_torque: f32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MotionConfig {
    fn default() -> Self {
        MotionConfig {
            // Unity gains, no amplification
            roll_gain: 1.0,
            pitch_gain: 1.0,
            heave_gain: 1.0,

            // Filtering on by default for a smoother ride
            filtering_enabled: true,
            smoothing_factor: 0.4,

            s_curve_intensity: 0.7,

            // Roughly the RMS noise floor of the MPU-6050
            accel_deadzone: 0.05,
            gyro_deadzone: 5.0,

            rate_limiting_enabled: true,
            max_rate_of_change: 0.15,

            // Mostly accelerometer, gyro fills in transients
            accel_weight: 0.9,

            accel_x_range: 0.8,
            accel_y_range: 0.8,
            accel_z_range: 0.3,

            engine_idle_rpm: 0.0,
            engine_max_rpm: 6000.0,
            engine_base_torque: 0.0,
            engine_max_torque: 450.0,
        }
    }
}

impl MotionConfig {
    // ---- GAINS ----

    pub fn roll_gain(&self) -> f32 {
        self.roll_gain
    }

    pub fn set_roll_gain(&mut self, gain: f32) {
        self.roll_gain = clamp(gain, 0.0, 2.0);
    }

    pub fn pitch_gain(&self) -> f32 {
        self.pitch_gain
    }

    pub fn set_pitch_gain(&mut self, gain: f32) {
        self.pitch_gain = clamp(gain, 0.0, 2.0);
    }

    pub fn heave_gain(&self) -> f32 {
        self.heave_gain
    }

    pub fn set_heave_gain(&mut self, gain: f32) {
        self.heave_gain = clamp(gain, 0.0, 2.0);
    }

    // ---- LOW-PASS FILTER ----

    pub fn filtering_enabled(&self) -> bool {
        self.filtering_enabled
    }

    pub fn set_filtering_enabled(&mut self, enabled: bool) {
        self.filtering_enabled = enabled;
    }

    /// Filter alpha: 1.0 passes samples straight through, 0.0 freezes the
    /// output.
    pub fn smoothing_factor(&self) -> f32 {
        self.smoothing_factor
    }

    pub fn set_smoothing_factor(&mut self, factor: f32) {
        self.smoothing_factor = clamp(factor, 0.0, 1.0);
    }

    // ---- RESPONSE SHAPING ----

    pub fn s_curve_intensity(&self) -> f32 {
        self.s_curve_intensity
    }

    pub fn set_s_curve_intensity(&mut self, intensity: f32) {
        self.s_curve_intensity = clamp(intensity, 0.0, 1.0);
    }

    // ---- DEADZONES ----

    /// Acceleration magnitude treated as noise.
    ///
    /// Units: g
    pub fn accel_deadzone(&self) -> f32 {
        self.accel_deadzone
    }

    pub fn set_accel_deadzone(&mut self, deadzone: f32) {
        self.accel_deadzone = clamp(deadzone, 0.0, 0.5);
    }

    /// Angular rate magnitude treated as drift.
    ///
    /// Units: degrees/second
    pub fn gyro_deadzone(&self) -> f32 {
        self.gyro_deadzone
    }

    pub fn set_gyro_deadzone(&mut self, deadzone: f32) {
        self.gyro_deadzone = clamp(deadzone, 0.0, 50.0);
    }

    // ---- RATE LIMITING ----

    pub fn rate_limiting_enabled(&self) -> bool {
        self.rate_limiting_enabled
    }

    pub fn set_rate_limiting_enabled(&mut self, enabled: bool) {
        self.rate_limiting_enabled = enabled;
    }

    /// Maximum change of a normalised axis per processed sample.
    pub fn max_rate_of_change(&self) -> f32 {
        self.max_rate_of_change
    }

    pub fn set_max_rate_of_change(&mut self, max_delta: f32) {
        self.max_rate_of_change = clamp(max_delta, 0.01, 1.0);
    }

    // ---- SENSOR BLEND ----

    /// Weight of the accelerometer in the accel/gyro blend, the gyro gets
    /// the complement.
    pub fn accel_weight(&self) -> f32 {
        self.accel_weight
    }

    pub fn set_accel_weight(&mut self, weight: f32) {
        self.accel_weight = clamp(weight, 0.0, 1.0);
    }

    // ---- NORMALISATION RANGES ----

    /// Longitudinal acceleration mapped to full pitch.
    ///
    /// Units: g
    pub fn accel_x_range(&self) -> f32 {
        self.accel_x_range
    }

    pub fn set_accel_x_range(&mut self, range: f32) {
        self.accel_x_range = clamp(range, 0.1, 2.0);
    }

    /// Lateral acceleration mapped to full roll.
    ///
    /// Units: g
    pub fn accel_y_range(&self) -> f32 {
        self.accel_y_range
    }

    pub fn set_accel_y_range(&mut self, range: f32) {
        self.accel_y_range = clamp(range, 0.1, 2.0);
    }

    /// Net vertical acceleration mapped to full heave.
    ///
    /// Units: g
    pub fn accel_z_range(&self) -> f32 {
        self.accel_z_range
    }

    pub fn set_accel_z_range(&mut self, range: f32) {
        self.accel_z_range = clamp(range, 0.05, 1.0);
    }

    // ---- ENGINE MODEL ----

    pub fn engine_idle_rpm(&self) -> f32 {
        self.engine_idle_rpm
    }

    pub fn set_engine_idle_rpm(&mut self, rpm: f32) {
        self.engine_idle_rpm = clamp(rpm, 0.0, 2000.0);
    }

    pub fn engine_max_rpm(&self) -> f32 {
        self.engine_max_rpm
    }

    pub fn set_engine_max_rpm(&mut self, rpm: f32) {
        self.engine_max_rpm = clamp(rpm, 1000.0, 10000.0);
    }

    pub fn engine_base_torque(&self) -> f32 {
        self.engine_base_torque
    }

    pub fn set_engine_base_torque(&mut self, torque: f32) {
        self.engine_base_torque = clamp(torque, 0.0, 500.0);
    }

    pub fn engine_max_torque(&self) -> f32 {
        self.engine_max_torque
    }

    pub fn set_engine_max_torque(&mut self, torque: f32) {
        self.engine_max_torque = clamp(torque, 50.0, 1000.0);
    }
}

impl<'de> Deserialize<'de> for MotionConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawMotionConfig::deserialize(deserializer)?;

        let mut config = MotionConfig::default();
        config.set_roll_gain(raw.roll_gain);
        config.set_pitch_gain(raw.pitch_gain);
        config.set_heave_gain(raw.heave_gain);
        config.set_filtering_enabled(raw.filtering_enabled);
        config.set_smoothing_factor(raw.smoothing_factor);
        config.set_s_curve_intensity(raw.s_curve_intensity);
        config.set_accel_deadzone(raw.accel_deadzone);
        config.set_gyro_deadzone(raw.gyro_deadzone);
        config.set_rate_limiting_enabled(raw.rate_limiting_enabled);
        config.set_max_rate_of_change(raw.max_rate_of_change);
        config.set_accel_weight(raw.accel_weight);
        config.set_accel_x_range(raw.accel_x_range);
        config.set_accel_y_range(raw.accel_y_range);
        config.set_accel_z_range(raw.accel_z_range);
        config.set_engine_idle_rpm(raw.engine_idle_rpm);
        config.set_engine_max_rpm(raw.engine_max_rpm);
        config.set_engine_base_torque(raw.engine_base_torque);
        config.set_engine_max_torque(raw.engine_max_torque);

        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_setters_clamp() {
        let mut config = MotionConfig::default();

        config.set_roll_gain(5.0);
        assert_eq!(config.roll_gain(), 2.0);

        config.set_smoothing_factor(-0.3);
        assert_eq!(config.smoothing_factor(), 0.0);

        config.set_max_rate_of_change(0.0);
        assert_eq!(config.max_rate_of_change(), 0.01);

        config.set_engine_max_rpm(100.0);
        assert_eq!(config.engine_max_rpm(), 1000.0);
    }

    #[test]
    fn test_deserialised_values_are_clamped() {
        let toml_str = r#"
            roll_gain = 9.0
            pitch_gain = 1.0
            heave_gain = 1.0
            filtering_enabled = false
            smoothing_factor = 0.4
            s_curve_intensity = 0.7
            accel_deadzone = 0.05
            gyro_deadzone = 5.0
            rate_limiting_enabled = true
            max_rate_of_change = 0.15
            accel_weight = 3.0
            accel_x_range = 0.8
            accel_y_range = 0.8
            accel_z_range = 0.3
            engine_idle_rpm = 0.0
            engine_max_rpm = 6000.0
            engine_base_torque = 0.0
            engine_max_torque = 450.0
        "#;

        let config: MotionConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.roll_gain(), 2.0);
        assert_eq!(config.accel_weight(), 1.0);
        assert!(!config.filtering_enabled());
    }
}

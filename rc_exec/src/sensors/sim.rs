//! Simulated sensor sources
//!
//! Synthetic signal generators standing in for the IMU and the ultrasonic
//! ranger, used for bench runs of the full control chain without hardware.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Instant;

use chrono::Utc;
use comms_if::sensor::{MpuData, UrmData};

use super::{InertialSensor, RangingSensor, SensorError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Sinusoidal inertial source.
///
/// Produces gentle cornering/braking accelerations with the gravity offset on
/// the vertical axis, so the downstream motion pipeline sees realistic
/// magnitudes.
pub struct SimInertial {
    epoch: Instant,
}

/// Slowly varying ranging source.
pub struct SimRanging {
    epoch: Instant,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimInertial {
    pub fn new() -> Self {
        SimInertial {
            epoch: Instant::now(),
        }
    }
}

impl Default for SimInertial {
    fn default() -> Self {
        Self::new()
    }
}

impl InertialSensor for SimInertial {
    fn read(&mut self) -> Result<MpuData, SensorError> {
        let t = self.epoch.elapsed().as_secs_f32();

        let accel_x = (t * 0.5).sin() * 0.4;
        let accel_y = (t * 0.3).cos() * 0.6;
        let accel_z = 1.0 + (t * 2.0).sin() * 0.15;

        Ok(MpuData {
            accel_x,
            accel_y,
            accel_z,
            gyro_x: accel_y * 20.0,
            gyro_y: accel_x * 20.0,
            gyro_z: 0.0,
            temperature: 25.0,
            timestamp_ms: Utc::now().timestamp_millis(),
        })
    }
}

impl SimRanging {
    pub fn new() -> Self {
        SimRanging {
            epoch: Instant::now(),
        }
    }
}

impl Default for SimRanging {
    fn default() -> Self {
        Self::new()
    }
}

impl RangingSensor for SimRanging {
    fn read(&mut self) -> Result<UrmData, SensorError> {
        let t = self.epoch.elapsed().as_secs_f32();

        Ok(UrmData {
            distance_cm: 150.0 + (t * 0.2).sin() * 100.0,
            temperature: 21.0,
            timestamp_ms: Utc::now().timestamp_millis(),
        })
    }
}

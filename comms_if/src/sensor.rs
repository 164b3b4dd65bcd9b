//! # Sensor data definitions
//!
//! Raw samples produced by the vehicle's inertial (MPU6050 class IMU) and
//! ranging (URM37 class ultrasonic) sensors, and the fused snapshot combining
//! the two.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::Utc;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Largest plausible acceleration magnitude on any axis.
///
/// Units: g
pub const ACCEL_ABS_LIMIT: f32 = 40.0;

/// Largest plausible angular rate magnitude on any axis.
///
/// Units: degrees/second
pub const GYRO_ABS_LIMIT: f32 = 2000.0;

/// Operating temperature range of the IMU.
///
/// Units: degrees Celsius
pub const TEMP_RANGE: (f32, f32) = (-40.0, 85.0);

/// Distance value indicating an invalid ranging measurement.
///
/// Units: centimeters
pub const DISTANCE_INVALID_CM: f32 = -1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One raw inertial sample read from the IMU.
///
/// Immutable once read from the sensor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MpuData {
    /// Longitudinal acceleration (front-back of the vehicle).
    ///
    /// Units: g
    pub accel_x: f32,

    /// Lateral acceleration (left-right of the vehicle).
    ///
    /// Units: g
    pub accel_y: f32,

    /// Vertical acceleration (up-down of the vehicle).
    ///
    /// Units: g
    pub accel_z: f32,

    /// Roll rate.
    ///
    /// Units: degrees/second
    pub gyro_x: f32,

    /// Pitch rate.
    ///
    /// Units: degrees/second
    pub gyro_y: f32,

    /// Yaw rate.
    ///
    /// Units: degrees/second
    pub gyro_z: f32,

    /// Die temperature of the sensor.
    ///
    /// Units: degrees Celsius
    pub temperature: f32,

    /// Time of the measurement (milliseconds since the UNIX epoch)
    pub timestamp_ms: i64,
}

/// One raw ranging sample read from the ultrasonic sensor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UrmData {
    /// Measured distance, or [`DISTANCE_INVALID_CM`] if no echo was received.
    ///
    /// Units: centimeters
    pub distance_cm: f32,

    /// Ambient temperature reported by the sensor.
    ///
    /// Units: degrees Celsius
    pub temperature: f32,

    /// Time of the measurement (milliseconds since the UNIX epoch)
    pub timestamp_ms: i64,
}

/// Fused snapshot combining the latest inertial and ranging samples.
///
/// Either channel may be absent when its sensor is in error, but never both -
/// [`AllSensorData::new`] refuses to build a snapshot with no data at all, so
/// downstream consumers can never mistake a total sensor failure for a valid
/// all-zero reading.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllSensorData {
    /// Time of the aggregation (milliseconds since the UNIX epoch)
    pub timestamp_ms: i64,

    /// Inertial data, or `None` if the IMU is in error.
    pub mpu_data: Option<MpuData>,

    /// Ranging data, or `None` if no ranging sample has been cached yet.
    pub urm_data: Option<UrmData>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MpuData {
    /// Determine if the sample lies within sane physical bounds for the
    /// sensor and vehicle.
    pub fn is_valid(&self) -> bool {
        // NaN compares false against the limits, so check finiteness first
        let fields = [
            self.accel_x,
            self.accel_y,
            self.accel_z,
            self.gyro_x,
            self.gyro_y,
            self.gyro_z,
            self.temperature,
        ];
        if fields.iter().any(|f| !f.is_finite()) {
            return false;
        }

        if self.accel_x.abs() > ACCEL_ABS_LIMIT
            || self.accel_y.abs() > ACCEL_ABS_LIMIT
            || self.accel_z.abs() > ACCEL_ABS_LIMIT
        {
            return false;
        }

        if self.gyro_x.abs() > GYRO_ABS_LIMIT
            || self.gyro_y.abs() > GYRO_ABS_LIMIT
            || self.gyro_z.abs() > GYRO_ABS_LIMIT
        {
            return false;
        }

        if self.temperature < TEMP_RANGE.0 || self.temperature > TEMP_RANGE.1 {
            return false;
        }

        true
    }
}

impl UrmData {
    /// Determine if the sample holds a usable distance measurement.
    pub fn is_in_range(&self) -> bool {
        self.distance_cm >= 0.0
    }
}

impl AllSensorData {
    /// Build a new snapshot from the available channels, timestamped now.
    ///
    /// Returns `None` if both channels are absent (total sensor failure).
    pub fn new(mpu_data: Option<MpuData>, urm_data: Option<UrmData>) -> Option<Self> {
        if mpu_data.is_none() && urm_data.is_none() {
            return None;
        }

        Some(AllSensorData {
            timestamp_ms: Utc::now().timestamp_millis(),
            mpu_data,
            urm_data,
        })
    }

    pub fn has_mpu_data(&self) -> bool {
        self.mpu_data.is_some()
    }

    pub fn has_urm_data(&self) -> bool {
        self.urm_data.is_some()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn nominal_mpu() -> MpuData {
        MpuData {
            accel_x: 0.1,
            accel_y: -0.2,
            accel_z: 1.02,
            gyro_x: 1.5,
            gyro_y: -0.75,
            gyro_z: 0.0,
            temperature: 25.0,
            timestamp_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_mpu_validity_bounds() {
        assert!(nominal_mpu().is_valid());

        let mut m = nominal_mpu();
        m.accel_y = 41.0;
        assert!(!m.is_valid());

        let mut m = nominal_mpu();
        m.gyro_z = -2500.0;
        assert!(!m.is_valid());

        let mut m = nominal_mpu();
        m.temperature = 90.0;
        assert!(!m.is_valid());

        let mut m = nominal_mpu();
        m.accel_x = f32::NAN;
        assert!(!m.is_valid());
    }

    #[test]
    fn test_snapshot_requires_one_channel() {
        assert!(AllSensorData::new(None, None).is_none());

        let snapshot = AllSensorData::new(Some(nominal_mpu()), None)
            .expect("one channel should be enough");
        assert!(snapshot.has_mpu_data());
        assert!(!snapshot.has_urm_data());
    }

    #[test]
    fn test_wire_field_names() {
        // The camelCase names are a compatibility contract with the web
        // cockpit, check them explicitly.
        let snapshot = AllSensorData {
            timestamp_ms: 42,
            mpu_data: Some(nominal_mpu()),
            urm_data: Some(UrmData {
                distance_cm: 153.2,
                temperature: 21.0,
                timestamp_ms: 41,
            }),
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["timestampMs"], 42);
        assert_eq!(json["mpuData"]["accelX"], 0.1f32);
        assert_eq!(json["mpuData"]["gyroZ"], 0.0f32);
        assert_eq!(json["urmData"]["distanceCm"], 153.2f32);
    }
}

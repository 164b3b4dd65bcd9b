//! # Sensor driver interfaces
//!
//! This module provides the capability traits the aggregator consumes. The
//! register-level bus drivers (I2C for the IMU, UART for the ultrasonic
//! ranger) live behind these traits and are out of scope for this crate -
//! only the simulated implementations in [`sim`] are provided here.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Simulated sensor implementations for bench runs without hardware.
pub mod sim;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::sensor::{MpuData, UrmData};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by sensor drivers.
///
/// The variants let callers distinguish a transient failure (degrade this
/// cycle, retry next) from a sensor that was never brought up or has gone
/// away entirely (hard stop).
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("The sensor has not been initialised")]
    NotInitialised,

    #[error("The sensor is physically disconnected")]
    Disconnected,

    #[error("Sensor read failed: {0}")]
    ReadFailed(String),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Capability trait for the inertial (IMU) sensor.
///
/// Reads are fast (sub-millisecond over I2C) and may be performed on the
/// control loop's thread.
pub trait InertialSensor: Send {
    /// Read one inertial sample from the sensor.
    fn read(&mut self) -> Result<MpuData, SensorError>;
}

/// Capability trait for the ultrasonic ranging sensor.
///
/// Reads are slow (up to ~1 s while the echo dissipates) and must never be
/// performed on the control loop's thread.
pub trait RangingSensor: Send {
    /// Read one ranging sample from the sensor.
    fn read(&mut self) -> Result<UrmData, SensorError>;
}

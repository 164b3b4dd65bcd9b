//! # Vehicle-side library.
//!
//! This library allows other crates in the workspace to access items defined
//! inside the vehicle-side (`rc_exec`) crate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Actuator driver interfaces - motor ESC, steering servo and camera pan servos
pub mod act_driver;

/// Camera pan control module - converts pan axis values into servo pulses
pub mod cam_ctrl;

/// Controller script module - replays timed controller messages for bench runs
pub mod ctrl_script;

/// Driving control module - converts driving input into motor and steering demands
pub mod drive_ctrl;

/// Sensor aggregation module - fuses the fast IMU with the slow ranging sensor
pub mod sensor_agg;

/// Sensor driver interfaces - inertial and ranging capability traits
pub mod sensors;

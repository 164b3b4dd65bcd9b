//! # Simulator-side library.
//!
//! This library allows other crates in the workspace to access items defined
//! inside the simulator-side (`sim_exec`) crate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Motion processing module - converts raw inertial samples into motion
/// platform commands
pub mod motion_proc;

/// Motion platform interfaces - haptic seat capability trait
pub mod platform;

/// Sensor replay module - replays recorded sensor snapshots for bench runs
pub mod sensor_replay;

//! # Communications interface crate.
//!
//! Provides the common data model exchanged between the vehicle-side
//! (`rc_exec`) and simulator-side (`sim_exec`) executables. The JSON field
//! names of these types are a compatibility contract with the cockpit web
//! clients and must not be renamed.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Controller (pedals/steering/camera pan) message definitions
pub mod ctrl;

/// Sensor sample and fused snapshot definitions
pub mod sensor;

//! Parameters structure for SensorAgg

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for sensor aggregation.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Period of the background ranging sampler.
    ///
    /// The ultrasonic sensor needs time for the echo to dissipate between
    /// reads, so this is much slower than the control cycle.
    ///
    /// Units: milliseconds
    pub urm_read_interval_ms: u64,

    /// Maximum time to wait for the sampler thread to exit on close.
    ///
    /// Units: milliseconds
    pub close_timeout_ms: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Params {
            urm_read_interval_ms: 200,
            close_timeout_ms: 1000,
        }
    }
}

//! Simulated motion platform

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};

use super::{MotionPlatform, PlatformError};
use crate::motion_proc::MotionCmd;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Log-only platform implementation recording the last commanded state.
#[derive(Default)]
pub struct SimPlatform {
    last_cmd: Option<MotionCmd>,
    closed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last command received, or `None` if no update has happened yet or the
    /// platform has been recentred.
    pub fn last_cmd(&self) -> Option<MotionCmd> {
        self.last_cmd
    }
}

impl MotionPlatform for SimPlatform {
    fn update(&mut self, cmd: &MotionCmd) -> Result<(), PlatformError> {
        if self.closed {
            return Err(PlatformError::NotConnected);
        }

        self.last_cmd = Some(*cmd);
        trace!(
            "SimPlatform: roll {:.03}, pitch {:.03}, heave {:.03}, rpm {:.0}, torque {:.01}",
            cmd.roll(),
            cmd.pitch(),
            cmd.heave(),
            cmd.rpm(),
            cmd.torque()
        );
        Ok(())
    }

    fn reset_to_neutral(&mut self) -> Result<(), PlatformError> {
        if self.closed {
            return Err(PlatformError::NotConnected);
        }

        self.last_cmd = None;
        debug!("SimPlatform: reset to neutral");
        Ok(())
    }

    fn close(&mut self) -> Result<(), PlatformError> {
        self.closed = true;
        debug!("SimPlatform: closed");
        Ok(())
    }
}

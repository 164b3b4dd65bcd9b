//! Main simulator-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Sensor snapshot acquisition (recorded stream replay)
//!         - Motion processing
//!         - Platform update
//!
//! The simulator drives the motion platform under the driver's seat from the
//! vehicle's inertial telemetry. On shutdown the platform is levelled so the
//! seat is never left tilted.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use sim_lib::{
    motion_proc::MotionProc,
    platform::{sim::SimPlatform, MotionPlatform},
    sensor_replay::{PendingSnapshots, SensorReplay},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use serde::Deserialize;
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Top level parameters of the exec itself.
#[derive(Debug, Deserialize)]
struct ExecParams {
    /// Target period of one processing cycle.
    ///
    /// Units: seconds
    cycle_period_s: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("sim_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("Motion Simulator Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: ExecParams =
        util::params::load("sim_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE SENSOR SOURCE ----

    // With the live transport out of scope the exec replays a recorded
    // sensor stream, so a replay path is mandatory.
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        return Err(eyre!(
            "Expected the path to a sensor replay file as the only argument, found {} arguments",
            args.len() - 1
        ));
    }

    info!("Loading sensor replay from \"{}\"", &args[1]);

    let mut replay = SensorReplay::new(&args[1]).wrap_err("Failed to load sensor replay")?;

    info!(
        "Loaded replay lasts {:.02} s and contains {} snapshots\n",
        replay.get_duration(),
        replay.get_num_snapshots()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut motion_proc = MotionProc::default();
    motion_proc
        .init("motion_proc.toml", &session)
        .wrap_err("Failed to initialise MotionProc")?;
    info!("MotionProc init complete");

    let mut platform = SimPlatform::new();
    info!("Platform init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let mut num_invalid_samples: u64 = 0;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- SENSOR SNAPSHOT PROCESSING ----

        match replay.get_pending() {
            PendingSnapshots::None => (),
            PendingSnapshots::Some(snapshots) => {
                for snapshot in snapshots.iter() {
                    // Only the inertial channel drives the platform
                    let mpu_data = match snapshot.mpu_data {
                        Some(d) => d,
                        None => continue,
                    };

                    match motion_proc.proc(&mpu_data) {
                        Ok((Some(cmd), _)) => {
                            if let Err(e) = platform.update(&cmd) {
                                warn!("Platform update failed: {}", e);
                            }
                        }
                        Ok((None, _)) => num_invalid_samples += 1,
                        Err(e) => warn!("Error during MotionProc processing: {}", e),
                    }
                }
            }
            // Exit if end of stream reached
            PendingSnapshots::EndOfStream => {
                info!("End of sensor stream reached, stopping");
                break;
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
            }
        }
    }

    // ---- SHUTDOWN ----

    if num_invalid_samples > 0 {
        warn!("{} invalid samples were rejected", num_invalid_samples);
    }

    // Level the seat before releasing the platform
    if let Err(e) = platform.reset_to_neutral() {
        warn!("Could not level the platform: {}", e);
    }
    if let Err(e) = platform.close() {
        warn!("Could not close the platform: {}", e);
    }

    info!("End of execution");

    Ok(())
}

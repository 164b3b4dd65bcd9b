//! Main vehicle-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Controller input acquisition (script replay)
//!         - Input staleness check (failsafe)
//!         - Sensor aggregation
//!         - Drive control processing
//!         - Camera pan processing
//!
//! The loop runs at a fixed short period. Losing the controller input stream
//! for longer than the configured timeout is a fatal safety condition: the
//! vehicle is braked to neutral and the session halts.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use rc_lib::{
    act_driver::sim::{SimActuator, SimCamPan},
    cam_ctrl::CamCtrl,
    ctrl_script::{CtrlScript, PendingMsgs},
    drive_ctrl::{DriveCtrl, DriverInput, StatusReport, TickReport},
    sensor_agg::SensorAgg,
    sensors::sim::{SimInertial, SimRanging},
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
    /// Target period of one control cycle.
    ///
    /// Units: seconds
    cycle_period_s: f64,

    /// Maximum age of the last controller input before the failsafe engages.
    ///
    /// Units: milliseconds
    input_timeout_ms: u64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("rc_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("RC Vehicle Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: ExecParams =
        util::params::load("rc_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE CONTROLLER SOURCE ----

    // With the live transport out of scope the exec replays a recorded
    // driving session, so a script path is mandatory.
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        return Err(eyre!(
            "Expected the path to a controller script as the only argument, found {} arguments",
            args.len() - 1
        ));
    }

    info!("Loading controller script from \"{}\"", &args[1]);

    let mut script = CtrlScript::new(&args[1]).wrap_err("Failed to load controller script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} messages\n",
        script.get_duration(),
        script.get_num_msgs()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let agg_params = util::params::load("sensor_agg.toml")
        .wrap_err("Could not load sensor aggregation params")?;

    let mut sensor_agg = SensorAgg::new(
        Some(Box::new(SimInertial::new())),
        Some(Box::new(SimRanging::new())),
        agg_params,
    )
    .wrap_err("Failed to initialise SensorAgg")?;
    info!("SensorAgg init complete");

    let mut drive_ctrl = DriveCtrl::new(SimActuator::new());
    drive_ctrl
        .init("drive_ctrl.toml", &session)
        .wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl init complete");

    let mut cam_ctrl =
        CamCtrl::new(SimCamPan::new()).wrap_err("Failed to initialise CamCtrl")?;
    info!("CamCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut driver_input = DriverInput::default();
    let mut last_input_instant = Instant::now();
    let mut last_tick_report = TickReport::default();
    let mut _last_status_report = StatusReport::default();
    let mut num_cycles: u64 = 0;

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let input_timeout = Duration::from_millis(exec_params.input_timeout_ms);

    // Number of cycles between periodic telemetry lines in the log
    let report_cycle_interval = ((1.0 / exec_params.cycle_period_s) as u64).max(1);

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- CONTROLLER INPUT PROCESSING ----

        match script.get_pending() {
            PendingMsgs::None => (),
            PendingMsgs::Some(msgs) => {
                for msg in msgs.iter() {
                    driver_input.update_from_ctrl(msg);

                    // Any controller traffic means a driver is present
                    driver_input.start = true;

                    // Camera pan is message-driven, not tick-driven
                    if let Err(e) = cam_ctrl.apply(msg) {
                        warn!("Camera pan error: {}", e);
                    }
                }

                last_input_instant = Instant::now();
            }
            // Exit if end of script reached
            PendingMsgs::EndOfScript => {
                info!("End of controller script reached, stopping");
                break;
            }
        }

        // ---- INPUT STALENESS FAILSAFE ----

        if drive_ctrl.enforce_input_timeout(last_input_instant.elapsed(), input_timeout) {
            sensor_agg.close();
            cam_ctrl.reset_position().ok();

            return Err(eyre!("Controller input timed out, session halted"));
        }

        // ---- SENSOR AGGREGATION ----

        let snapshot = sensor_agg.get_snapshot();

        if num_cycles % report_cycle_interval == 0 {
            match &snapshot {
                Some(s) => info!(
                    "Sensors: mpu {}, urm {} | motor {}%, steering {}%, mode {}",
                    s.has_mpu_data(),
                    s.has_urm_data(),
                    last_tick_report.motor_duty,
                    last_tick_report.steering_duty,
                    last_tick_report.mode
                ),
                None => warn!("No sensor data available"),
            }
        }

        // ---- DRIVE CONTROL PROCESSING ----

        match drive_ctrl.proc(&driver_input) {
            Ok((tick, status)) => {
                last_tick_report = tick;
                _last_status_report = status;
            }
            Err(e) => warn!("Error during DriveCtrl processing: {}", e),
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

        num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    drive_ctrl.close();
    sensor_agg.close();
    cam_ctrl.reset_position().ok();

    info!("End of execution");

    Ok(())
}

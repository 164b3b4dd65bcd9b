//! # Sensor aggregation module
//!
//! Presents one fused, non-blocking view of the vehicle's two sensors, whose
//! sampling costs differ by three orders of magnitude: the IMU is read
//! synchronously on every call (sub-millisecond), while the ultrasonic
//! ranger is read by a background sampler thread and its latest value cached.
//!
//! The sampler hands samples to the aggregator over a `std::sync::mpsc`
//! channel; the consumer drains the channel and keeps only the newest sample,
//! which gives a race-free single-slot exchange without any shared mutable
//! fields.
//!
//! A single sensor's failure degrades that channel to absent for the cycle.
//! Only when both channels are unavailable does [`SensorAgg::get_snapshot`]
//! return `None` - zero data is never fabricated.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use crate::sensors::{InertialSensor, RangingSensor};
use comms_if::sensor::{AllSensorData, UrmData};

pub use params::Params;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Sleep slice used while waiting between ranging reads and while waiting for
/// the sampler to exit, so that stop requests are honoured promptly.
///
/// Units: milliseconds
const POLL_SLICE_MS: u64 = 10;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Sensor aggregator.
///
/// Owns the sensor handles passed in at construction and the background
/// ranging sampler. Call [`SensorAgg::close`] before dropping to stop the
/// sampler cleanly.
pub struct SensorAgg {
    inertial: Option<Box<dyn InertialSensor>>,

    /// Latest ranging sample taken off the channel.
    cached_urm: Option<UrmData>,

    urm_rx: Option<Receiver<UrmData>>,

    sampler: Option<SamplerHandle>,
}

/// Handle to the background ranging sampler thread.
struct SamplerHandle {
    stop: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
    close_timeout_ms: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during SensorAgg operation.
#[derive(Debug, thiserror::Error)]
pub enum SensorAggError {
    #[error("No sensor is available, refusing to aggregate nothing")]
    NoSensors,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SensorAgg {
    /// Create a new aggregator from the available sensor handles.
    ///
    /// Either handle may be `None` when that sensor failed to initialise, in
    /// which case its channel will simply be absent from every snapshot.
    /// Both absent is an error - an aggregator with nothing to aggregate
    /// would only mislead its consumers.
    pub fn new(
        inertial: Option<Box<dyn InertialSensor>>,
        ranging: Option<Box<dyn RangingSensor>>,
        params: Params,
    ) -> Result<Self, SensorAggError> {
        if inertial.is_none() && ranging.is_none() {
            return Err(SensorAggError::NoSensors);
        }

        // Start the background sampler if the ranging sensor is present
        let (urm_rx, sampler) = match ranging {
            Some(r) => {
                let (tx, rx) = channel();
                let handle = spawn_sampler(r, tx, &params);
                (Some(rx), Some(handle))
            }
            None => {
                info!("Ranging sensor not available, no sampler thread started");
                (None, None)
            }
        };

        Ok(SensorAgg {
            inertial,
            cached_urm: None,
            urm_rx,
            sampler,
        })
    }

    /// Get a fused snapshot of the current sensor state.
    ///
    /// Performs a synchronous IMU read and combines it with the latest cached
    /// ranging sample. Returns `None` only when both channels are
    /// unavailable.
    pub fn get_snapshot(&mut self) -> Option<AllSensorData> {
        // Fast synchronous IMU read
        let mpu_data = match self.inertial.as_mut() {
            Some(imu) => match imu.read() {
                Ok(d) => Some(d),
                Err(e) => {
                    warn!("IMU read failed: {}", e);
                    None
                }
            },
            None => None,
        };

        // Drain the sampler channel, keeping only the newest sample
        if let Some(rx) = &self.urm_rx {
            if let Some(d) = rx.try_iter().last() {
                self.cached_urm = Some(d);
            }
        }

        let snapshot = AllSensorData::new(mpu_data, self.cached_urm);

        if snapshot.is_none() {
            error!("All sensors are in error");
        }

        snapshot
    }

    /// Stop the background sampler and release the sensor handles.
    ///
    /// Waits up to the configured close timeout for the sampler to exit; if
    /// it is stuck in a slow bus read past the timeout it is detached with a
    /// warning rather than hanging the shutdown. Idempotent.
    pub fn close(&mut self) {
        if let Some(sampler) = self.sampler.take() {
            sampler.stop.store(true, Ordering::Relaxed);

            let deadline = Instant::now() + Duration::from_millis(sampler.close_timeout_ms);

            while !sampler.done.load(Ordering::Relaxed) && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(POLL_SLICE_MS));
            }

            if sampler.done.load(Ordering::Relaxed) {
                // Thread is past its loop, join returns immediately
                sampler.handle.join().ok();
                info!("Ranging sampler stopped");
            }
            else {
                warn!("Ranging sampler did not stop within the timeout, detaching");
            }
        }

        self.inertial = None;
        self.urm_rx = None;
        self.cached_urm = None;
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Spawn the background ranging sampler thread.
fn spawn_sampler(
    mut ranging: Box<dyn RangingSensor>,
    tx: Sender<UrmData>,
    params: &Params,
) -> SamplerHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let done = Arc::new(AtomicBool::new(false));

    let interval_ms = params.urm_read_interval_ms;
    let thread_stop = stop.clone();
    let thread_done = done.clone();

    let handle = thread::spawn(move || {
        info!("Ranging sampler started (interval = {} ms)", interval_ms);

        while !thread_stop.load(Ordering::Relaxed) {
            match ranging.read() {
                Ok(d) => {
                    // The receiver disappearing means the aggregator is
                    // closing, exit on the next stop check
                    tx.send(d).ok();
                }
                Err(e) => warn!("Ranging read failed: {}", e),
            }

            // Sleep in short slices so a stop request is honoured promptly
            let mut slept_ms = 0;
            while slept_ms < interval_ms && !thread_stop.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(POLL_SLICE_MS.min(interval_ms - slept_ms)));
                slept_ms += POLL_SLICE_MS;
            }
        }

        thread_done.store(true, Ordering::Relaxed);
        info!("Ranging sampler exiting");
    });

    SamplerHandle {
        stop,
        done,
        handle,
        close_timeout_ms: params.close_timeout_ms,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::sensors::SensorError;
    use comms_if::sensor::MpuData;

    struct OkInertial;

    impl InertialSensor for OkInertial {
        fn read(&mut self) -> Result<MpuData, SensorError> {
            Ok(MpuData {
                accel_x: 0.1,
                accel_y: 0.0,
                accel_z: 1.0,
                gyro_x: 0.0,
                gyro_y: 0.0,
                gyro_z: 0.0,
                temperature: 25.0,
                timestamp_ms: 0,
            })
        }
    }

    struct FailInertial;

    impl InertialSensor for FailInertial {
        fn read(&mut self) -> Result<MpuData, SensorError> {
            Err(SensorError::ReadFailed("bus timeout".into()))
        }
    }

    struct OkRanging {
        count: u32,
    }

    impl RangingSensor for OkRanging {
        fn read(&mut self) -> Result<UrmData, SensorError> {
            self.count += 1;
            Ok(UrmData {
                distance_cm: self.count as f32,
                temperature: 21.0,
                timestamp_ms: self.count as i64,
            })
        }
    }

    struct FailRanging;

    impl RangingSensor for FailRanging {
        fn read(&mut self) -> Result<UrmData, SensorError> {
            Err(SensorError::ReadFailed("no echo".into()))
        }
    }

    fn fast_params() -> Params {
        Params {
            urm_read_interval_ms: 5,
            close_timeout_ms: 500,
        }
    }

    #[test]
    fn test_no_sensors_is_an_error() {
        assert!(SensorAgg::new(None, None, Params::default()).is_err());
    }

    #[test]
    fn test_degrades_when_ranging_fails() {
        let mut agg = SensorAgg::new(
            Some(Box::new(OkInertial)),
            Some(Box::new(FailRanging)),
            fast_params(),
        )
        .unwrap();

        // Give the sampler time to fail a few reads
        thread::sleep(Duration::from_millis(30));

        for _ in 0..5 {
            let snapshot = agg.get_snapshot().expect("IMU alone should be enough");
            assert!(snapshot.has_mpu_data());
            assert!(!snapshot.has_urm_data());
        }

        agg.close();
    }

    #[test]
    fn test_caches_latest_ranging_sample() {
        let mut agg = SensorAgg::new(
            Some(Box::new(OkInertial)),
            Some(Box::new(OkRanging { count: 0 })),
            fast_params(),
        )
        .unwrap();

        thread::sleep(Duration::from_millis(50));

        let first = agg
            .get_snapshot()
            .and_then(|s| s.urm_data)
            .expect("a ranging sample should be cached by now");

        thread::sleep(Duration::from_millis(50));

        let second = agg
            .get_snapshot()
            .and_then(|s| s.urm_data)
            .expect("a ranging sample should be cached by now");

        // The cache moves forward with the sampler
        assert!(second.timestamp_ms > first.timestamp_ms);

        agg.close();
    }

    #[test]
    fn test_imu_failure_keeps_ranging_channel() {
        let mut agg = SensorAgg::new(
            Some(Box::new(FailInertial)),
            Some(Box::new(OkRanging { count: 0 })),
            fast_params(),
        )
        .unwrap();

        thread::sleep(Duration::from_millis(50));

        let snapshot = agg.get_snapshot().expect("ranging alone should be enough");
        assert!(!snapshot.has_mpu_data());
        assert!(snapshot.has_urm_data());

        agg.close();
    }

    #[test]
    fn test_close_drops_cached_ranging_sample() {
        let mut agg = SensorAgg::new(
            Some(Box::new(OkInertial)),
            Some(Box::new(OkRanging { count: 0 })),
            fast_params(),
        )
        .unwrap();

        thread::sleep(Duration::from_millis(50));

        // Populate the cache before closing
        let snapshot = agg.get_snapshot().unwrap();
        assert!(snapshot.has_urm_data());

        agg.close();

        // The stale sample must not survive the close
        assert!(agg.get_snapshot().is_none());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut agg = SensorAgg::new(
            Some(Box::new(OkInertial)),
            Some(Box::new(OkRanging { count: 0 })),
            fast_params(),
        )
        .unwrap();

        agg.close();
        agg.close();

        // After close both channels are gone
        assert!(agg.get_snapshot().is_none());
    }
}

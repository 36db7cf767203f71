//! Main lane following executable entry point.
//!
//! # Architecture
//!
//! The executable is split into two threads:
//!
//!     - Capture thread: pulls frames from the frame source and places them
//!       into a single slot, replacing any frame which has not yet been
//!       processed so the controller always sees the freshest image.
//!     - Main loop:
//!         - Remote command processing (script)
//!         - Sign policy update
//!         - Frame acquisition from the slot
//!         - Lane control processing (AUTO mode only)
//!         - Drive control processing
//!         - Drive train actuation
//!         - Archiving and telemetry
//!
//! # Modules
//!
//! All cyclic modules (e.g. `lane_ctrl`) provide a public struct implementing
//! the `util::module::State` trait, and are stored in the `DataStore`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::Utc;
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info, trace, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use structopt::StructOpt;

// Internal
use comms_if::{eqpt::cam::CamImage, tc::{DriveMode, SpeedMode}};
use lane_lib::{
    data_store::DataStore,
    drive_ctrl,
    frame_source::{FrameSource, ImageDirSource},
    latest_slot::{LatestSlot, SlotRecv},
    mech::{DriveDriver, MechParams, SimDriver},
    overlay,
    params::LaneExecParams,
    sign_policy::{self, SignPolicy},
    tc_processor,
};
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingCmds, ScriptInterpreter},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lane following car executable
#[derive(Debug, StructOpt)]
#[structopt(name = "lane_exec")]
struct Cli {
    /// Directory of frames to drive from, played back in file name order
    #[structopt(long, parse(from_os_str))]
    frames: PathBuf,

    /// Remote command script to run
    #[structopt(long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Restart from the first frame once the directory is exhausted
    #[structopt(long = "loop")]
    looping: bool,

    /// Override the replay frame rate from the parameters
    #[structopt(long)]
    fps: Option<f64>,

    /// Log at trace level
    #[structopt(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let cli = Cli::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("lane_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = if cli.verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Lane Following Car Executable\n");
    info!("Running on: {}", host::get_platform());
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", cli);

    // ---- LOAD PARAMETERS ----

    let exec_params: LaneExecParams =
        util::params::load("lane_exec.toml").wrap_err("Could not load exec params")?;
    let sign_params: sign_policy::Params =
        util::params::load("sign_policy.toml").wrap_err("Could not load sign policy params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE SCRIPT ----

    let mut script = match cli.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} commands\n",
                si.get_duration(),
                si.get_num_cmds()
            );

            Some(si)
        }
        None => {
            info!("No script provided, running in the initial mode only\n");
            None
        }
    };

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::new(exec_params.initial_mode, exec_params.initial_speed);
    ds.sign_policy = SignPolicy::new(sign_params);

    // ---- INITIALISE MODULES ----

    ds.lane_ctrl
        .init("lane_ctrl.toml", &session)
        .wrap_err("Failed to initialise LaneCtrl")?;
    info!("LaneCtrl init complete");

    ds.drive_ctrl
        .init("drive_ctrl.toml", &session)
        .wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl init complete");

    let mut driver = init_driver(
        exec_params.use_hardware,
        &exec_params.mech,
        ds.drive_ctrl.params().steer_center_duty_pct,
    )?;

    // Park the car before anything else happens
    driver
        .actuate(&ds.drive_ctrl.safe_dems())
        .wrap_err("Failed to put the drive train into the safe state")?;

    info!("Module initialisation complete\n");

    // ---- START CAPTURE ----

    let replay_fps = cli.fps.unwrap_or(exec_params.replay_fps);
    let source = ImageDirSource::new(&cli.frames)
        .wrap_err("Failed to open the frame directory")?
        .looping(cli.looping)
        .with_frame_rate(replay_fps);

    info!(
        "Replaying {} frames from {:?} at {} fps",
        source.num_frames(),
        cli.frames,
        replay_fps
    );

    let slot = Arc::new(LatestSlot::new());
    let capture_stop = Arc::new(AtomicBool::new(false));
    let capture_handle = {
        let slot = slot.clone();
        let stop = capture_stop.clone();
        thread::spawn(move || capture_thread(source, slot, stop))
    };

    let frame_timeout = Duration::from_secs_f64(exec_params.frame_timeout_s);

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        ds.cycle_start(session::get_elapsed_seconds());

        // ---- REMOTE COMMAND PROCESSING ----

        if let Some(ref mut si) = script {
            match si.get_pending(ds.time_s) {
                PendingCmds::None => (),
                PendingCmds::Some(cmds) => {
                    for cmd in cmds.iter() {
                        debug!("Executing remote command {:?}", cmd);
                        tc_processor::exec(&mut ds, cmd);
                    }
                }
                PendingCmds::EndOfScript => {
                    info!("End of script reached, stopping");
                    break;
                }
            }
        }

        // ---- SIGN POLICY ----

        if let Some(speed) = ds.sign_policy.update(ds.time_s) {
            info!("Sign hold expired, speed set to {:?}", speed);
            ds.speed = speed;
        }

        // ---- FRAME ACQUISITION ----

        let frame = match slot.take_timeout(frame_timeout) {
            SlotRecv::Item(f) => Some(f),
            SlotRecv::Timeout => {
                ds.num_consec_frame_timeouts += 1;
                if ds.num_consec_frame_timeouts == exec_params.max_consec_frame_timeouts {
                    warn!(
                        "No frame for {} consecutive cycles, stopping the motors",
                        ds.num_consec_frame_timeouts
                    );
                }
                None
            }
            SlotRecv::Closed => {
                info!("Frame source finished, stopping");
                break;
            }
        };

        // ---- LANE CONTROL ----

        if let Some(ref frame) = frame {
            ds.frame_processed();

            trace_frame_age(frame);

            if ds.mode == DriveMode::Auto {
                match ds.lane_ctrl.proc(&frame.image) {
                    Ok((decision, report)) => {
                        ds.last_decision = decision;
                        ds.lane_ctrl_status_rpt = Some(report);
                    }
                    Err(e) => warn!("Error processing frame {}: {}", frame.seq, e),
                }
            }
        }

        // ---- DRIVE CONTROL ----

        let frames_stale = ds.num_consec_frame_timeouts >= exec_params.max_consec_frame_timeouts;

        let drive_input = drive_ctrl::InputData {
            steer: ds.last_decision,
            speed: if frames_stale {
                SpeedMode::Stop
            } else {
                ds.effective_speed()
            },
        };

        match ds.drive_ctrl.proc(&drive_input) {
            Ok((dems, report)) => {
                ds.drive_ctrl_output = Some(dems);
                ds.drive_ctrl_status_rpt = report;
            }
            Err(e) => warn!("Error processing DriveCtrl: {}", e),
        }

        // ---- ACTUATION ----

        if let Some(ref dems) = ds.drive_ctrl_output {
            if let Err(e) = driver.actuate(dems) {
                error!("Could not actuate the drive train: {}", e);
                if let Err(e) = driver.stop() {
                    error!("Could not stop the motors: {}", e);
                }
            }
        }

        // ---- WRITE ARCHIVES ----

        if ds.lane_ctrl_status_rpt.is_some() {
            if let Err(e) = ds.lane_ctrl.write() {
                warn!("Could not write LaneCtrl archives: {}", e);
            }
        }
        if ds.drive_ctrl_output.is_some() {
            if let Err(e) = ds.drive_ctrl.write() {
                warn!("Could not write DriveCtrl archives: {}", e);
            }
        }

        // ---- TELEMETRY ----

        if let Some(ref frame) = frame {
            let every = exec_params.save_annotated_every;
            if every > 0 && frame.seq % every == 0 {
                let annotated = overlay::draw_lane_overlay(
                    &frame.image,
                    ds.lane_ctrl.classification(),
                    ds.lane_ctrl.poly_detection(),
                    ds.lane_ctrl.params().band_top_frac,
                );
                session.save_image(format!("frames/frame_{:06}.jpg", frame.seq), annotated);
            }
        }

        if ds.is_1_hz_cycle {
            let snapshot = ds.status_snapshot();
            info!(
                "{:?} {:?}: steer {:?}, delta {} px, seen {:?}, {:.1} fps",
                snapshot.mode,
                snapshot.speed,
                snapshot.last_decision,
                snapshot.delta_px,
                snapshot.last_seen,
                snapshot.fps
            );
            session.save("status.json", snapshot);
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    info!("Shutting down after {} cycles", ds.num_cycles);

    if let Err(e) = driver.stop() {
        error!("Could not stop the motors: {}", e);
    }

    capture_stop.store(true, Ordering::Relaxed);
    slot.close();
    if capture_handle.join().is_err() {
        error!("Capture thread panicked");
    }

    session.save("status.json", ds.status_snapshot());
    session.exit();

    Ok(())
}

/// Create the drive train driver, using the GPIO header when running on a
/// Raspberry Pi with hardware enabled.
#[allow(unused_variables)]
fn init_driver(
    use_hardware: bool,
    params: &MechParams,
    center_duty_pct: f64,
) -> Result<Box<dyn DriveDriver>, Report> {
    #[cfg(all(target_os = "linux", any(target_arch = "arm", target_arch = "aarch64")))]
    {
        if use_hardware {
            let d = lane_lib::mech::rpi::RpiDriver::new(params, center_duty_pct)
                .wrap_err("Failed to initialise the GPIO drive train")?;
            info!("GPIO drive train initialised");
            return Ok(Box::new(d));
        }
    }

    info!("Using the simulated drive train");
    Ok(Box::new(SimDriver::new()))
}

/// Acquire frames until the source is exhausted or the stop flag is set.
fn capture_thread<S: FrameSource>(
    mut source: S,
    slot: Arc<LatestSlot<CamImage>>,
    stop: Arc<AtomicBool>,
) {
    while !stop.load(Ordering::Relaxed) {
        match source.next_frame() {
            Ok(Some(frame)) => {
                if slot.put(frame) {
                    debug!("Unprocessed frame dropped");
                }
            }
            Ok(None) => break,
            Err(e) => warn!("Could not acquire frame: {}", e),
        }
    }

    info!(
        "Capture thread exiting, {} frames dropped",
        slot.num_replaced()
    );
    slot.close();
}

fn trace_frame_age(frame: &CamImage) {
    let age = Utc::now().signed_duration_since(frame.timestamp);
    trace!(
        "Frame {} ({}x{}) is {} ms old",
        frame.seq,
        frame.width(),
        frame.height(),
        age.num_milliseconds()
    );
}

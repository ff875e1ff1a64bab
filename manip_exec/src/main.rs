//! Main manipulator executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Mechanism sensing
//!         - Telecommand processing and handling
//!         - Supersystem processing
//!         - Mechanism demands
//!         - Archiving and telemetry
//!
//! Telecommands come from a timed script, and the mechanisms are simulated, so the whole loop
//! runs headless.
//!
//! # Modules
//!
//! All modules (e.g. `supersys`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::MechDemsResponse;
use manip_lib::{
    data_store::{DataStore, SafeModeCause},
    mech::{SimMechParams, SimMechSet},
    params::ManipExecParams,
    CYCLE_FREQUENCY_HZ, CYCLE_PERIOD_S,
};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Manipulator executable
#[derive(Debug, StructOpt)]
#[structopt(name = "manip_exec")]
struct Opt {
    /// Telecommand script to run. If not given the default script from the exec parameters is
    /// used.
    #[structopt(parse(from_os_str))]
    script: Option<PathBuf>,

    /// Minimum log level
    #[structopt(short, long, default_value = "Debug")]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("manip_exec", "sessions").wrap_err("Failed to create the session")?;

    // ---- LOAD PARAMETERS ----

    let exec_params: ManipExecParams =
        util::params::load("manip_exec.toml").wrap_err("Could not load exec params")?;

    let mut log_levels = Vec::new();
    for o in exec_params.log_levels.iter() {
        let level: LevelFilter = o
            .level
            .parse()
            .wrap_err_with(|| format!("Invalid log level for {}: {}", o.target, o.level))?;
        log_levels.push((o.target.clone(), level));
    }

    // Initialise logger
    logger_init(opt.log_level, &log_levels, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Manipulator Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    let script_path = match opt.script {
        Some(p) => p,
        None => {
            let mut p = host::get_sw_root().wrap_err("Could not find the software root")?;
            p.push(&exec_params.default_script_path);
            p
        }
    };

    info!("Loading script from {:?}", script_path);

    let mut si = ScriptInterpreter::new(&script_path).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        si.get_duration(),
        si.get_num_tcs()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.supersys
        .init("supersys.toml", &session)
        .wrap_err("Failed to initialise the supersystem")?;
    info!("Supersystem init complete");

    let sim_params: SimMechParams =
        util::params::load("sim_mech.toml").wrap_err("Could not load sim mech params")?;
    let mut mechs = SimMechSet::new(sim_params);
    info!("Simulated mechanisms init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    // Time at which to stop once the script has ended
    let mut stop_time_s: Option<f64> = None;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- DATA INPUT ----

        ds.mech_sens = mechs.sense();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ, session::get_elapsed_seconds());

        // ---- TELECOMMAND PROCESSING ----

        match si.get_pending_tcs(ds.time_s) {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(&mut ds, tc);
                }
            }
            PendingTcs::EndOfScript => {
                if stop_time_s.is_none() {
                    info!(
                        "End of TC script reached, stopping in {:.02} s",
                        exec_params.script_end_hold_s
                    );
                    stop_time_s = Some(ds.time_s + exec_params.script_end_hold_s);
                }
            }
        }

        if let Some(t) = stop_time_s {
            if ds.time_s >= t {
                break;
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        match ds.supersys.proc(&ds.supersys_input) {
            Ok((o, r)) => {
                ds.supersys_output = o;
                ds.supersys_status_rpt = r;
            }
            Err(e) => warn!("Error during supersystem processing: {}", e),
        };

        // ---- MECHANISMS ----

        match mechs.dispatch(&ds.supersys_output) {
            MechDemsResponse::DemsOk => {
                ds.num_consec_dems_rejections = 0;
                ds.make_unsafe(SafeModeCause::MechDemsRejected).ok();
            }
            r => {
                warn!("Mechanisms rejected demands: {:?}", r);
                ds.num_consec_dems_rejections += 1;

                if ds.num_consec_dems_rejections > exec_params.max_consec_dems_rejections {
                    ds.make_safe(SafeModeCause::MechDemsRejected);
                }
            }
        }

        mechs.step(CYCLE_PERIOD_S);

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.supersys.write() {
            warn!("Could not write supersystem archive: {}", e);
        }

        // ---- TELEMETRY ----

        if ds.is_1_hz_cycle {
            match serde_json::to_string(&ds.supersys_status_rpt) {
                Ok(s) => debug!("Supersys TM: {}", s),
                Err(e) => warn!("Could not serialise supersystem TM: {}", e),
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");
    session.exit();

    Ok(())
}

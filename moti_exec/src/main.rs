//! Main moti executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Start the motion worker on the simulated robot
//!     - Main loop:
//!         - Dispatch script commands which have become due
//!         - Report the drive state once a second
//!         - Exit once the script is over and the robot is idle
//!     - Shut the motion worker down and save the drive trace
//!
//! Usage: `moti_exec <script.mts>`

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd_processor;
mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use moti_lib::{
    clock::SystemClock,
    drive::DriveActuator,
    motion::{self, Action, MotionCmd, MotionCtrl},
    sim::SimRobot,
};
use params::MotiExecParams;
use util::{
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingCmds, ScriptInterpreter},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("moti_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("Moti Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: MotiExecParams =
        util::params::load("moti_exec.toml").wrap_err("Could not load exec params")?;
    let motion_params: motion::Params =
        util::params::load("motion_ctrl.toml").wrap_err("Could not load motion params")?;

    info!("Parameters loaded");

    if !(exec_params.cycle_period_s > 0.0) {
        return Err(eyre!(
            "The cycle period must be positive, found {} s",
            exec_params.cycle_period_s
        ));
    }

    // ---- LOAD SCRIPT ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let mut script: ScriptInterpreter<MotionCmd> =
        ScriptInterpreter::new(script_arg(&args)?).wrap_err("Failed to load script")?;

    info!(
        "Loaded script {:?}, lasts {:.02} s and contains {} commands\n",
        script.script_path().unwrap_or_else(|| Path::new("<inline>")),
        script.get_duration(),
        script.get_num_cmds()
    );

    // ---- INITIALISE MOTION CONTROL ----

    let clock = SystemClock::new();
    let robot = SimRobot::new(exec_params.sim.clone(), clock);

    // Kept to report the drive state, only the worker commands the drive
    let drive_monitor = robot.drive();

    let (ctrl, worker) = MotionCtrl::spawn(
        motion_params,
        robot.drive(),
        robot.heading_sensor(),
        clock,
    )
    .wrap_err("Failed to start motion control")?;

    info!("Motion control initialised");

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let cycles_per_report = (1.0 / exec_params.cycle_period_s).round().max(1.0) as u64;
    let script_start = Instant::now();
    let mut script_over = false;
    let mut num_cycles: u64 = 0;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- COMMAND PROCESSING ----

        if !script_over {
            match script.get_pending_cmds(script_start.elapsed().as_secs_f64()) {
                PendingCmds::None => (),
                PendingCmds::Some(cmds) => {
                    for cmd in cmds.iter() {
                        cmd_processor::exec(&ctrl, cmd);
                    }
                }
                PendingCmds::EndOfScript => {
                    info!("End of script reached, waiting for motion to finish");
                    script_over = true;
                }
            }
        }

        // ---- REPORTING ----

        if num_cycles % cycles_per_report == 0 {
            let state = drive_monitor.state();
            info!(
                "[{:.1} s] {:?}: left {:?} {}, right {:?} {}, heading {:.3} rad",
                session::get_elapsed_seconds(),
                ctrl.state(),
                state.left.direction,
                state.left.speed,
                state.right.direction,
                state.right.speed,
                robot.heading_rad()
            );
        }

        if script_over && ctrl.state() == Action::None {
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }

        num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    worker
        .shutdown()
        .wrap_err("Motion worker did not shut down cleanly")?;

    let history = robot.history();
    info!("Saving drive trace ({} commands)", history.len());
    session.save("drive_trace.json", history);

    session.exit();

    info!("End of execution");

    Ok(())
}

/// Get the script path from the command line arguments.
fn script_arg(args: &[String]) -> Result<&str, Report> {
    match args {
        [_, script] => Ok(script.as_str()),
        _ => Err(eyre!(
            "Expected exactly one argument (the script path), found {}",
            args.len().saturating_sub(1)
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_script_arg() {
        let args = vec!["moti_exec".to_string(), "scripts/demo.mts".to_string()];
        assert_eq!(script_arg(&args).unwrap(), "scripts/demo.mts");

        assert!(script_arg(&args[..1]).is_err());
        assert!(script_arg(&[]).is_err());
    }
}

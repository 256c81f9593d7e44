//! # Command processor module
//!
//! Dispatches motion commands, from a script or any other source, to the
//! motion controller.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use moti_lib::heading::HeadingSensor;
use moti_lib::motion::{MotionCmd, MotionCtrl};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a motion command.
///
/// Commands the controller rejects are logged and dropped, they never stop
/// the executable.
pub(crate) fn exec<H>(ctrl: &MotionCtrl<H>, cmd: &MotionCmd)
where
    H: HeadingSensor + 'static,
{
    debug!("Executing {:?}", cmd);

    let result = match *cmd {
        MotionCmd::Go {
            direction,
            speed,
            duration_ms,
            ramp_ms,
        } => ctrl.go(direction, speed, duration_ms, ramp_ms),
        MotionCmd::Spin {
            rotation,
            speed,
            angle_rad,
        } => ctrl.spin(rotation, speed, angle_rad),
        MotionCmd::SpinDeg {
            rotation,
            speed,
            angle_deg,
        } => ctrl.spin_deg(rotation, speed, angle_deg),
        MotionCmd::Stop { ramp_ms } => {
            ctrl.stop(ramp_ms);
            Ok(())
        }
    };

    if let Err(e) = result {
        warn!("Could not execute {:?}: {}", cmd, e);
    }
}

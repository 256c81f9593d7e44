//! Requests passed into motion control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::drive::{Direction, Rotation};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The intent of a motion request, and so the state of the motion worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Idle, nothing to do.
    None,
    /// Drive straight.
    Go,
    /// Spin on the spot by an angle.
    Spin,
    /// Bring the robot to rest, optionally ramping down.
    Stop,
    /// Differential speed turn. Reserved, not yet supported.
    Turn,
}

/// A command as written in a motion script, mirroring the public motion API.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum MotionCmd {
    Go {
        direction: Direction,
        speed: u8,
        #[serde(default)]
        duration_ms: u32,
        #[serde(default)]
        ramp_ms: u32,
    },
    Spin {
        rotation: Rotation,
        speed: u8,
        angle_rad: f64,
    },
    SpinDeg {
        rotation: Rotation,
        speed: u8,
        angle_deg: f64,
    },
    Stop {
        #[serde(default)]
        ramp_ms: u32,
    },
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The latest motion intent.
///
/// Requests are values: the store swaps whole requests, nobody edits the
/// fields of the current one in place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionRequest {
    /// What the robot should be doing.
    pub action: Action,

    /// Direction of travel, used by `Go`.
    pub direction: Direction,

    /// Direction of the spin, used by `Spin`.
    pub rotation: Rotation,

    /// Speed demand, 0 to 255.
    pub speed: u8,

    /// For `Go` the run time, 0 meaning until superseded. For `Stop` the
    /// ramp-down time.
    ///
    /// Units: milliseconds
    pub duration_ms: u32,

    /// Time taken by `Go` to reach full speed.
    ///
    /// Units: milliseconds
    pub ramp_ms: u32,

    /// Magnitude of a spin, never negative. The sense of the spin is given
    /// by `rotation`.
    ///
    /// Units: radians
    pub angle_rad: f64,

    /// Heading when the spin was requested, in (-pi, pi].
    ///
    /// Units: radians
    pub origin_angle_rad: f64,

    /// Action which was current when this request was published.
    pub previous_action: Action,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MotionRequest {
    fn default() -> Self {
        MotionRequest::idle(Action::None)
    }
}

impl MotionRequest {
    /// An idle request, with direction, rotation and speed back at their
    /// defaults.
    pub fn idle(previous_action: Action) -> Self {
        MotionRequest {
            action: Action::None,
            direction: Direction::Forward,
            rotation: Rotation::Left,
            speed: 0,
            duration_ms: 0,
            ramp_ms: 0,
            angle_rad: 0.0,
            origin_angle_rad: 0.0,
            previous_action,
        }
    }

    pub fn go(direction: Direction, speed: u8, duration_ms: u32, ramp_ms: u32) -> Self {
        MotionRequest {
            action: Action::Go,
            direction,
            speed,
            duration_ms,
            ramp_ms,
            ..Self::default()
        }
    }

    pub fn spin(rotation: Rotation, speed: u8, angle_rad: f64, origin_angle_rad: f64) -> Self {
        MotionRequest {
            action: Action::Spin,
            rotation,
            speed,
            angle_rad,
            origin_angle_rad,
            ..Self::default()
        }
    }

    pub fn stop(ramp_duration_ms: u32) -> Self {
        MotionRequest {
            action: Action::Stop,
            duration_ms: ramp_duration_ms,
            ..Self::default()
        }
    }

    /// The request a finished action hands over to: an immediate stop which
    /// remembers what was running.
    pub fn handed_to_stop(&self) -> Self {
        MotionRequest {
            action: Action::Stop,
            previous_action: self.action,
            duration_ms: 0,
            ..*self
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_handed_to_stop() {
        let go = MotionRequest::go(Direction::Backward, 120, 1000, 200);
        let stop = go.handed_to_stop();

        assert_eq!(stop.action, Action::Stop);
        assert_eq!(stop.previous_action, Action::Go);
        assert_eq!(stop.duration_ms, 0);
        assert_eq!(stop.direction, Direction::Backward);
        assert_eq!(stop.speed, 120);
    }

    #[test]
    fn test_cmd_from_json() {
        let cmd: MotionCmd =
            serde_json::from_str(r#"{"Go": {"direction": "Forward", "speed": 120}}"#).unwrap();
        assert_eq!(
            cmd,
            MotionCmd::Go {
                direction: Direction::Forward,
                speed: 120,
                duration_ms: 0,
                ramp_ms: 0
            }
        );

        let cmd: MotionCmd = serde_json::from_str(
            r#"{"SpinDeg": {"rotation": "Left", "speed": 90, "angle_deg": 270.0}}"#,
        )
        .unwrap();
        assert!(matches!(cmd, MotionCmd::SpinDeg { rotation: Rotation::Left, .. }));

        // Speeds outside 0..=255 can't be expressed
        assert!(serde_json::from_str::<MotionCmd>(
            r#"{"Go": {"direction": "Forward", "speed": -1}}"#
        )
        .is_err());
    }
}

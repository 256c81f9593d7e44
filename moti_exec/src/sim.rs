//! # Simulated robot
//!
//! A minimal model of the robot body used when no hardware is attached, and
//! by the tests. A single [`SimRobot`] hands out a [`SimDrive`] and a
//! [`SimHeading`] which share the same body, so spinning the drive turns the
//! heading the sensor reports.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::clock::Clock;
use crate::drive::{Direction, DriveActuator, DriveError, DriveState, Rotation, MOTOR_MAX_SPEED};
use crate::heading::HeadingSensor;
use util::maths::{lin_map, wrap_pi};
use util::time::millis_to_seconds;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the simulated body.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Turn rate reached when spinning at full speed.
    ///
    /// Units: radians/second
    pub max_turn_rate_rads: f64,

    /// Heading at the start of the simulation.
    ///
    /// Units: radians
    pub initial_heading_rad: f64,
}

/// A command received by the simulated drive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum DriveCmd {
    Go(Direction, u8),
    Spin(Rotation, u8),
    Stop,
}

/// A drive command and the time it was applied at.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DriveRecord {
    pub time_ms: u64,
    pub cmd: DriveCmd,
}

/// The simulated robot, owner of the shared body.
#[derive(Clone)]
pub struct SimRobot<C> {
    body: Arc<Mutex<SimBody>>,
    clock: C,
}

/// Drive actuator half of the simulated robot.
#[derive(Clone)]
pub struct SimDrive<C> {
    robot: SimRobot<C>,
}

/// Heading sensor half of the simulated robot.
#[derive(Clone)]
pub struct SimHeading<C> {
    robot: SimRobot<C>,
}

struct SimBody {
    params: SimParams,
    state: DriveState,
    heading_rad: f64,
    turn_rate_rads: f64,
    last_update_ms: u64,
    heading_available: bool,
    fault: Option<String>,
    history: Vec<DriveRecord>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            max_turn_rate_rads: std::f64::consts::PI,
            initial_heading_rad: 0.0,
        }
    }
}

impl<C: Clock + Clone> SimRobot<C> {
    /// Create a new robot at rest.
    pub fn new(params: SimParams, clock: C) -> Self {
        let now = clock.now_ms();

        SimRobot {
            body: Arc::new(Mutex::new(SimBody {
                heading_rad: wrap_pi(params.initial_heading_rad),
                params,
                state: DriveState::default(),
                turn_rate_rads: 0.0,
                last_update_ms: now,
                heading_available: true,
                fault: None,
                history: Vec::new(),
            })),
            clock,
        }
    }

    pub fn drive(&self) -> SimDrive<C> {
        SimDrive {
            robot: self.clone(),
        }
    }

    pub fn heading_sensor(&self) -> SimHeading<C> {
        SimHeading {
            robot: self.clone(),
        }
    }

    /// Every drive command applied so far.
    ///
    /// The history is never trimmed and grows by one record per control
    /// period while the robot is driven, so long unattended runs should not
    /// use the simulated robot.
    pub fn history(&self) -> Vec<DriveRecord> {
        self.body().history.clone()
    }

    /// The true heading of the body, regardless of sensor availability.
    pub fn heading_rad(&self) -> f64 {
        let now = self.clock.now_ms();
        let mut body = self.body();
        body.integrate(now);
        body.heading_rad
    }

    /// Make the heading sensor report (or stop reporting) data.
    pub fn set_heading_available(&self, available: bool) {
        self.body().heading_available = available;
    }

    /// Make every subsequent drive command fail with the given message, or
    /// clear the fault with `None`.
    pub fn set_drive_fault(&self, fault: Option<String>) {
        self.body().fault = fault;
    }

    fn body(&self) -> MutexGuard<'_, SimBody> {
        // The body holds no invariants a panicking holder could break
        match self.body.lock() {
            Ok(b) => b,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn apply(&self, cmd: DriveCmd) -> Result<(), DriveError> {
        let now = self.clock.now_ms();
        let mut body = self.body();

        if let Some(ref f) = body.fault {
            return Err(DriveError::Fault(f.clone()));
        }

        body.integrate(now);

        let (state, turn_rate) = match cmd {
            DriveCmd::Go(direction, speed) => (DriveState::straight(direction, speed), 0.0),
            DriveCmd::Spin(rotation, speed) => {
                let rate = lin_map(
                    (0.0, f64::from(MOTOR_MAX_SPEED)),
                    (0.0, body.params.max_turn_rate_rads),
                    f64::from(speed),
                );
                let rate = match rotation {
                    Rotation::Right => rate,
                    Rotation::Left => -rate,
                };
                (DriveState::spinning(rotation, speed), rate)
            }
            DriveCmd::Stop => (DriveState::default(), 0.0),
        };

        trace!("SimDrive applying {:?} at {} ms", cmd, now);

        body.state = state;
        body.turn_rate_rads = turn_rate;
        body.history.push(DriveRecord { time_ms: now, cmd });

        Ok(())
    }
}

impl SimBody {
    /// Advance the heading to the given time using the current turn rate.
    fn integrate(&mut self, now_ms: u64) {
        let dt_s = millis_to_seconds(now_ms.saturating_sub(self.last_update_ms));
        self.heading_rad = wrap_pi(self.heading_rad + self.turn_rate_rads * dt_s);
        self.last_update_ms = now_ms;
    }
}

impl<C: Clock + Clone> DriveActuator for SimDrive<C> {
    fn go(&mut self, direction: Direction, speed: u8) -> Result<(), DriveError> {
        self.robot.apply(DriveCmd::Go(direction, speed))
    }

    fn spin(&mut self, rotation: Rotation, speed: u8) -> Result<(), DriveError> {
        self.robot.apply(DriveCmd::Spin(rotation, speed))
    }

    fn stop(&mut self) -> Result<(), DriveError> {
        self.robot.apply(DriveCmd::Stop)
    }

    fn state(&self) -> DriveState {
        self.robot.body().state
    }
}

impl<C: Clock + Clone> HeadingSensor for SimHeading<C> {
    fn heading(&self) -> Option<f64> {
        let now = self.robot.clock.now_ms();
        let mut body = self.robot.body();
        body.integrate(now);

        if body.heading_available {
            Some(body.heading_rad)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::SimClock;
    use std::f64::consts::PI;

    #[test]
    fn test_spin_turns_heading() {
        let clock = SimClock::new();
        let robot = SimRobot::new(
            SimParams {
                max_turn_rate_rads: PI,
                initial_heading_rad: 0.0,
            },
            clock.clone(),
        );
        let mut drive = robot.drive();
        let sensor = robot.heading_sensor();

        drive.spin(Rotation::Right, 255).unwrap();
        clock.wait_ms(500);
        assert!((sensor.heading().unwrap() - PI / 2.0).abs() < 1e-9);

        drive.spin(Rotation::Left, 255).unwrap();
        clock.wait_ms(1000);
        assert!((sensor.heading().unwrap() + PI / 2.0).abs() < 1e-9);

        // Going straight doesn't turn
        drive.go(Direction::Forward, 255).unwrap();
        clock.wait_ms(1000);
        assert!((sensor.heading().unwrap() + PI / 2.0).abs() < 1e-9);
        assert_eq!(drive.state(), DriveState::straight(Direction::Forward, 255));

        drive.stop().unwrap();
        assert!(drive.state().is_stopped());
        assert_eq!(robot.history().len(), 4);
        assert_eq!(robot.history()[3].cmd, DriveCmd::Stop);
    }

    #[test]
    fn test_faults() {
        let clock = SimClock::new();
        let robot = SimRobot::new(SimParams::default(), clock);
        let mut drive = robot.drive();

        robot.set_heading_available(false);
        assert_eq!(robot.heading_sensor().heading(), None);

        robot.set_drive_fault(Some("overcurrent".into()));
        assert!(drive.go(Direction::Forward, 10).is_err());
        assert!(robot.history().is_empty());

        robot.set_drive_fault(None);
        assert!(drive.go(Direction::Forward, 10).is_ok());
    }
}

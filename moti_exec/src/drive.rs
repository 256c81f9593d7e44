//! # Drive module
//!
//! Interface to the robot's two wheel motors. The motor driver itself lives
//! outside this crate, the motion controller only talks to it through the
//! [`DriveActuator`] trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Highest speed the motor driver accepts.
pub const MOTOR_MAX_SPEED: u8 = 255;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Direction of travel, or of a single wheel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

/// Direction of a spin about the robot's centre.
///
/// A `Right` spin increases the heading, a `Left` spin decreases it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    Left,
    Right,
}

/// Errors reported by a drive actuator.
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("Motor driver fault: {0}")]
    Fault(String),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Last values applied to a single wheel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WheelState {
    pub direction: Direction,
    pub speed: u8,
}

/// Last values applied to both wheels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DriveState {
    pub left: WheelState,
    pub right: WheelState,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A two-wheeled differential drive.
///
/// Implementations must accept a new command every control period without
/// queuing them internally.
pub trait DriveActuator: Send {
    /// Drive both wheels in the same direction at the given speed.
    fn go(&mut self, direction: Direction, speed: u8) -> Result<(), DriveError>;

    /// Drive the wheels in opposite directions to spin on the spot.
    fn spin(&mut self, rotation: Rotation, speed: u8) -> Result<(), DriveError>;

    /// Bring both wheels to rest.
    fn stop(&mut self) -> Result<(), DriveError>;

    /// Get the values last applied to the wheels.
    fn state(&self) -> DriveState;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Direction {
    fn default() -> Self {
        Direction::Forward
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::Left
    }
}

impl Default for WheelState {
    fn default() -> Self {
        WheelState {
            direction: Direction::Forward,
            speed: 0,
        }
    }
}

impl Direction {
    /// The opposite direction.
    pub fn invert(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

impl DriveState {
    /// State with both wheels driving in the same direction.
    pub fn straight(direction: Direction, speed: u8) -> Self {
        let wheel = WheelState { direction, speed };
        DriveState {
            left: wheel,
            right: wheel,
        }
    }

    /// State with the wheels counter-rotating.
    ///
    /// Spinning right drives the left wheel forwards and the right wheel
    /// backwards.
    pub fn spinning(rotation: Rotation, speed: u8) -> Self {
        let left_dir = match rotation {
            Rotation::Right => Direction::Forward,
            Rotation::Left => Direction::Backward,
        };

        DriveState {
            left: WheelState {
                direction: left_dir,
                speed,
            },
            right: WheelState {
                direction: left_dir.invert(),
                speed,
            },
        }
    }

    /// True if neither wheel is turning.
    pub fn is_stopped(&self) -> bool {
        self.left.speed == 0 && self.right.speed == 0
    }
}

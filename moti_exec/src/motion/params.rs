//! Parameters structure for motion control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::MotionError;
use crate::drive::MOTOR_MAX_SPEED;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for motion control.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Period between two drive commands. Must not be shorter than the
    /// motor driver's minimum safe update interval.
    ///
    /// Units: milliseconds
    pub control_period_ms: u64,

    /// Time after which a spin chunk which hasn't reached its aim is
    /// abandoned.
    ///
    /// Units: milliseconds
    pub spin_deadline_ms: u64,

    /// Two consecutive heading samples whose product is below this value are
    /// taken as a crossing of the +/-pi seam.
    ///
    /// Units: radians^2
    pub seam_threshold: f64,

    /// Highest speed callers may request.
    pub max_speed: u8,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Params {
            control_period_ms: 20,
            spin_deadline_ms: 2500,
            seam_threshold: -3.0,
            max_speed: MOTOR_MAX_SPEED,
        }
    }
}

impl Params {
    /// Check the parameters can drive the control loop.
    pub fn validate(&self) -> Result<(), MotionError> {
        if self.control_period_ms == 0 {
            return Err(MotionError::InvalidParams(
                "control_period_ms must be greater than zero".into(),
            ));
        }
        if self.spin_deadline_ms == 0 {
            return Err(MotionError::InvalidParams(
                "spin_deadline_ms must be greater than zero".into(),
            ));
        }
        if !(self.seam_threshold < 0.0) {
            return Err(MotionError::InvalidParams(format!(
                "seam_threshold must be negative, found {}",
                self.seam_threshold
            )));
        }

        Ok(())
    }
}

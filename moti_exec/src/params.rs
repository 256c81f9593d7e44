//! # Moti Executable Parameters
//!
//! This module provide parameters for the moti executable.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use moti_lib::sim::SimParams;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct MotiExecParams {
    /// Target period of one cycle of the main loop.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Parameters of the simulated robot
    #[serde(default)]
    pub sim: SimParams,
}

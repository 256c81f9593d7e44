//! # Motion control module
//!
//! Turns high level motion intents (go straight, spin by an angle, stop) into
//! a stream of drive commands. Callers publish requests through a
//! [`MotionCtrl`] handle, which never blocks for longer than it takes to
//! swap the current request. A dedicated worker thread executes the latest
//! request against the [`DriveActuator`](crate::drive::DriveActuator), using
//! the [`HeadingSensor`](crate::heading::HeadingSensor) to know when a spin
//! is complete.
//!
//! A request runs until it finishes or a newer request is published, there is
//! no queue of pending motions.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod ctrl;
mod params;
mod ramp;
mod request;
mod spin_target;
mod store;
mod worker;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use ctrl::*;
pub use params::*;
pub use ramp::*;
pub use request::*;
pub use spin_target::*;
pub use store::{MotionStore, WorkerSignal};
pub use worker::{MotionLoop, Outcome};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during motion control.
#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    #[error("Requested speed {0} is above the maximum of {1}")]
    InvalidSpeed(u8, u8),

    #[error("Requested angle {0} rad is invalid, it must be finite and not negative")]
    InvalidAngle(f64),

    #[error("Action not yet supported: {0}")]
    NotYetSupported(String),

    #[error("Invalid motion control parameters: {0}")]
    InvalidParams(String),

    #[error("Could not start the motion worker thread: {0}")]
    WorkerSpawn(std::io::Error),

    #[error("The motion worker thread panicked")]
    WorkerPanicked,
}

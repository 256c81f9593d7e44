//! # Moti library.
//!
//! Motion control for a small two-wheeled robot, plus the interfaces to the
//! hardware it drives and a simulated stand-in for that hardware.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Clock module - millisecond time source and blocking waits
pub mod clock;

/// Drive module - interface to the wheel motors
pub mod drive;

/// Heading module - interface to the orientation sensor
pub mod heading;

/// Motion control module - converts motion requests into drive commands on a worker thread
pub mod motion;

/// Simulated robot - drive and heading sensor sharing one simulated body
pub mod sim;

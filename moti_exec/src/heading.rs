//! # Heading module
//!
//! Interface to the orientation sensor. The sensor is sampled by its own
//! process, readers only ever see the latest estimate.

/// A source of the robot's heading.
pub trait HeadingSensor: Send + Sync {
    /// Get the latest heading in radians, in the range (-pi, pi].
    ///
    /// Returns `None` if no valid estimate is available (sensor not ready,
    /// stale data, bus fault). This call must not block.
    fn heading(&self) -> Option<f64>;
}

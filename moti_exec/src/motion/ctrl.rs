//! Public motion control API

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::{Action, MotionError, MotionLoop, MotionRequest, MotionStore, Params};
use crate::clock::Clock;
use crate::drive::{Direction, DriveActuator, Rotation};
use crate::heading::HeadingSensor;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Handle used to command motion.
///
/// Every motion call validates its arguments, publishes a request and
/// returns straight away. Handles are cheap to clone and may be used from
/// any thread, the latest published request always wins.
pub struct MotionCtrl<H> {
    store: Arc<MotionStore>,
    heading: Arc<H>,
    max_speed: u8,
}

/// Owner of the motion worker thread.
pub struct MotionWorker {
    store: Arc<MotionStore>,
    handle: JoinHandle<()>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<H> Clone for MotionCtrl<H> {
    fn clone(&self) -> Self {
        MotionCtrl {
            store: self.store.clone(),
            heading: self.heading.clone(),
            max_speed: self.max_speed,
        }
    }
}

impl<H> MotionCtrl<H>
where
    H: HeadingSensor + 'static,
{
    /// Start the motion worker thread.
    ///
    /// The worker takes ownership of the drive, which it is the only writer
    /// of from then on.
    pub fn spawn<D, C>(
        params: Params,
        drive: D,
        heading: H,
        clock: C,
    ) -> Result<(Self, MotionWorker), MotionError>
    where
        D: DriveActuator + 'static,
        C: Clock + 'static,
    {
        params.validate()?;

        let (store, receiver) = MotionStore::new();
        let store = Arc::new(store);
        let heading = Arc::new(heading);
        let max_speed = params.max_speed;

        let motion_loop = MotionLoop::new(store.clone(), drive, heading.clone(), clock, params);

        let handle = thread::Builder::new()
            .name("motion".into())
            .spawn(move || motion_loop.run(receiver))
            .map_err(MotionError::WorkerSpawn)?;

        info!("Motion worker started");

        Ok((
            MotionCtrl {
                store: store.clone(),
                heading,
                max_speed,
            },
            MotionWorker { store, handle },
        ))
    }

    /// Drive straight.
    ///
    /// A `duration_ms` of 0 keeps going until another request is made,
    /// otherwise the robot stops by itself once the duration has elapsed.
    /// The speed rises linearly from 0 over `ramp_ms`.
    pub fn go(
        &self,
        direction: Direction,
        speed: u8,
        duration_ms: u32,
        ramp_ms: u32,
    ) -> Result<(), MotionError> {
        self.check_speed(speed)?;

        self.store
            .publish(MotionRequest::go(direction, speed, duration_ms, ramp_ms));

        Ok(())
    }

    /// Spin on the spot by `angle_rad`, measured from the current heading.
    ///
    /// Angles over a full turn are executed one turn at a time.
    pub fn spin(&self, rotation: Rotation, speed: u8, angle_rad: f64) -> Result<(), MotionError> {
        self.check_speed(speed)?;

        if !angle_rad.is_finite() || angle_rad < 0.0 {
            return Err(MotionError::InvalidAngle(angle_rad));
        }

        let origin_rad = match self.heading.heading() {
            Some(h) => h,
            None => {
                warn!("No heading available to spin from, assuming 0 rad");
                0.0
            }
        };

        self.store
            .publish(MotionRequest::spin(rotation, speed, angle_rad, origin_rad));

        Ok(())
    }

    /// Spin on the spot by an angle given in degrees.
    pub fn spin_deg(
        &self,
        rotation: Rotation,
        speed: u8,
        angle_deg: f64,
    ) -> Result<(), MotionError> {
        self.spin(rotation, speed, angle_deg.to_radians())
    }

    /// Bring the robot to rest.
    ///
    /// If the robot was going straight the speed is ramped down to zero over
    /// `ramp_duration_ms`, otherwise it stops immediately.
    pub fn stop(&self, ramp_duration_ms: u32) {
        self.store.publish(MotionRequest::stop(ramp_duration_ms));
    }

    /// Stop without ramping down.
    pub fn stop_now(&self) {
        self.stop(0)
    }

    /// Turn while moving, by driving the wheels at different speeds.
    pub fn turn(
        &self,
        _direction: Direction,
        _rotation: Rotation,
        _speed: u8,
    ) -> Result<(), MotionError> {
        warn!("Turn requested but is not yet supported");
        Err(MotionError::NotYetSupported("Turn".into()))
    }

    /// The action currently being executed.
    pub fn state(&self) -> Action {
        self.store.action()
    }

    /// A copy of the current request.
    pub fn request(&self) -> MotionRequest {
        self.store.snapshot()
    }

    pub fn go_forward(&self, speed: u8, duration_ms: u32, ramp_ms: u32) -> Result<(), MotionError> {
        self.go(Direction::Forward, speed, duration_ms, ramp_ms)
    }

    pub fn go_backward(&self, speed: u8, duration_ms: u32, ramp_ms: u32) -> Result<(), MotionError> {
        self.go(Direction::Backward, speed, duration_ms, ramp_ms)
    }

    pub fn spin_left(&self, speed: u8, angle_rad: f64) -> Result<(), MotionError> {
        self.spin(Rotation::Left, speed, angle_rad)
    }

    pub fn spin_right(&self, speed: u8, angle_rad: f64) -> Result<(), MotionError> {
        self.spin(Rotation::Right, speed, angle_rad)
    }

    pub fn spin_left_deg(&self, speed: u8, angle_deg: f64) -> Result<(), MotionError> {
        self.spin_deg(Rotation::Left, speed, angle_deg)
    }

    pub fn spin_right_deg(&self, speed: u8, angle_deg: f64) -> Result<(), MotionError> {
        self.spin_deg(Rotation::Right, speed, angle_deg)
    }

    fn check_speed(&self, speed: u8) -> Result<(), MotionError> {
        if speed > self.max_speed {
            return Err(MotionError::InvalidSpeed(speed, self.max_speed));
        }
        Ok(())
    }
}

impl MotionWorker {
    /// Stop the robot and wait for the worker thread to exit.
    pub fn shutdown(self) -> Result<(), MotionError> {
        debug!("Shutting down the motion worker");

        self.store.publish(MotionRequest::stop(0));
        self.store.shutdown();

        self.handle.join().map_err(|_| MotionError::WorkerPanicked)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::SimClock;
    use crate::sim::{SimParams, SimRobot};
    use std::f64::consts::PI;

    fn spawn() -> (
        MotionCtrl<crate::sim::SimHeading<SimClock>>,
        MotionWorker,
        SimRobot<SimClock>,
    ) {
        let clock = SimClock::new();
        let robot = SimRobot::new(SimParams::default(), clock.clone());
        let params = Params {
            max_speed: 200,
            ..Params::default()
        };

        let (ctrl, worker) =
            MotionCtrl::spawn(params, robot.drive(), robot.heading_sensor(), clock).unwrap();

        (ctrl, worker, robot)
    }

    #[test]
    fn test_validation() {
        let (ctrl, worker, robot) = spawn();

        assert!(matches!(
            ctrl.go_forward(201, 0, 0),
            Err(MotionError::InvalidSpeed(201, 200))
        ));
        assert!(matches!(
            ctrl.spin_left(100, -1.0),
            Err(MotionError::InvalidAngle(_))
        ));
        assert!(ctrl.spin_right(100, std::f64::NAN).is_err());
        assert!(ctrl.spin_right_deg(100, std::f64::INFINITY).is_err());
        assert!(matches!(
            ctrl.turn(Direction::Forward, Rotation::Left, 10),
            Err(MotionError::NotYetSupported(_))
        ));

        // Nothing was published
        assert_eq!(ctrl.state(), Action::None);
        assert_eq!(ctrl.request(), MotionRequest::default());

        worker.shutdown().unwrap();
        assert!(robot.drive().state().is_stopped());
    }

    #[test]
    fn test_spin_captures_origin() {
        let clock = SimClock::new();
        let robot = SimRobot::new(
            SimParams {
                max_turn_rate_rads: PI,
                initial_heading_rad: 1.0,
            },
            clock,
        );

        // No worker, so the published requests stay put
        let (store, _rx) = MotionStore::new();
        let ctrl = MotionCtrl {
            store: Arc::new(store),
            heading: Arc::new(robot.heading_sensor()),
            max_speed: 255,
        };

        ctrl.spin_left(50, 0.5).unwrap();
        assert_eq!(ctrl.request().origin_angle_rad, 1.0);
        assert_eq!(ctrl.request().rotation, Rotation::Left);

        // Sensor is down, so the origin falls back to zero
        robot.set_heading_available(false);
        ctrl.spin_deg(Rotation::Right, 50, 90.0).unwrap();
        let req = ctrl.request();
        assert_eq!(req.origin_angle_rad, 0.0);
        assert!((req.angle_rad - PI / 2.0).abs() < 1e-12);
        assert_eq!(req.previous_action, Action::Spin);
    }

    #[test]
    fn test_shutdown_stops_drive() {
        let (ctrl, worker, robot) = spawn();

        ctrl.go_backward(150, 0, 0).unwrap();
        while robot.drive().state().is_stopped() {
            thread::yield_now();
        }

        worker.shutdown().unwrap();

        assert!(robot.drive().state().is_stopped());
        assert_eq!(ctrl.state(), Action::None);
    }
}

//! Motion worker
//!
//! The control loop run on the dedicated motion thread. It sleeps on the wake
//! channel, and on each wake executes whatever request is current in the
//! store. Every timed loop re-checks the store before commanding the drive,
//! so a newer request is picked up within one control period.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, error, info, trace, warn};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use super::{
    ramp_down_speeds, ramp_in_speed, Action, MotionRequest, MotionStore, Params, SpinChunks,
    SpinTarget, WorkerSignal,
};
use crate::clock::Clock;
use crate::drive::{Direction, DriveActuator};
use crate::heading::HeadingSensor;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State owned by the motion thread.
pub struct MotionLoop<D, H, C> {
    store: Arc<MotionStore>,
    drive: D,
    heading: Arc<H>,
    clock: C,
    params: Params,

    /// Direction and speed of the last go command sent to the drive, used
    /// to ramp down when stopping.
    pub(crate) last_go: Option<(Direction, u8)>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How the execution of a request ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The request ran to its end and the worker moved on to the next state.
    Completed,

    /// A newer request was published.
    Superseded,

    /// The request was abandoned (deadline, drive fault, unsupported action)
    /// and handed over to stop.
    Aborted,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D, H, C> MotionLoop<D, H, C>
where
    D: DriveActuator,
    H: HeadingSensor,
    C: Clock,
{
    pub fn new(
        store: Arc<MotionStore>,
        drive: D,
        heading: Arc<H>,
        clock: C,
        params: Params,
    ) -> Self {
        MotionLoop {
            store,
            drive,
            heading,
            clock,
            params,
            last_go: None,
        }
    }

    /// Run until a shutdown signal is received or every sender is gone.
    ///
    /// The drive is stopped before returning.
    pub fn run(mut self, receiver: Receiver<WorkerSignal>) {
        while let Ok(signal) = receiver.recv() {
            match signal {
                WorkerSignal::Wake => self.process(),
                WorkerSignal::Shutdown => {
                    debug!("Motion worker received shutdown signal");
                    break;
                }
            }
        }

        if let Err(e) = self.drive.stop() {
            error!("Could not stop the drive while exiting: {}", e);
        }

        info!("Motion worker exited");
    }

    /// Execute the current request, and anything the worker hands over to,
    /// until idle or superseded.
    ///
    /// On supersession the wake token sent by the newer publish is still
    /// queued, so the newer request will be picked up by the next call.
    pub fn process(&mut self) {
        loop {
            let (request, generation) = self.store.tagged_snapshot();

            let outcome = match request.action {
                Action::None => return,
                Action::Go => self.exec_go(&request, generation),
                Action::Spin => self.exec_spin(&request, generation),
                Action::Stop => self.exec_stop(&request, generation),
                Action::Turn => self.exec_turn(&request, generation),
            };

            trace!("{:?} ended: {:?}", request.action, outcome);

            if outcome == Outcome::Superseded {
                return;
            }
        }
    }

    fn exec_go(&mut self, request: &MotionRequest, generation: u64) -> Outcome {
        let period_ms = self.params.control_period_ms;
        let duration_ms = u64::from(request.duration_ms);
        let ramp_ms = u64::from(request.ramp_ms);

        debug!(
            "Going {:?} at {} for {} ms (ramp {} ms)",
            request.direction, request.speed, duration_ms, ramp_ms
        );

        let mut count: u64 = 0;

        loop {
            if self.is_superseded(generation) {
                return Outcome::Superseded;
            }

            let elapsed_ms = count * period_ms;
            if duration_ms > 0 && elapsed_ms >= duration_ms {
                break;
            }

            let speed = ramp_in_speed(request.speed, elapsed_ms, ramp_ms);

            if let Err(e) = self.drive.go(request.direction, speed) {
                error!("Drive fault while going, stopping: {}", e);
                return self.hand_to_stop(generation, Outcome::Aborted);
            }
            self.last_go = Some((request.direction, speed));

            self.clock.wait_ms(period_ms);
            count += 1;
        }

        debug!("Go finished after {} ms", count * period_ms);

        self.hand_to_stop(generation, Outcome::Completed)
    }

    fn exec_spin(&mut self, request: &MotionRequest, generation: u64) -> Outcome {
        let period_ms = self.params.control_period_ms;

        self.last_go = None;

        debug!(
            "Spinning {:?} at {} by {:.3} rad from {:.3} rad",
            request.rotation, request.speed, request.angle_rad, request.origin_angle_rad
        );

        let mut chunk_origin_rad = request.origin_angle_rad;

        for (chunk, step_rad) in SpinChunks::new(request.angle_rad).enumerate() {
            let mut target = SpinTarget::new(request.rotation, chunk_origin_rad, step_rad);
            let start_ms = self.clock.now_ms();

            debug!(
                "Spin chunk {}: {:.3} rad, aiming at {:.3} rad (across seam: {})",
                chunk,
                step_rad,
                target.aim_rad(),
                target.crossed_seam()
            );

            loop {
                if self.is_superseded(generation) {
                    return Outcome::Superseded;
                }

                // No heading means no way to finish, only the deadline can
                if let Some(heading_rad) = self.heading.heading() {
                    if target.update(heading_rad, self.params.seam_threshold) {
                        trace!("Spin chunk {} reached aim at {:.3} rad", chunk, heading_rad);
                        break;
                    }
                }

                let elapsed_ms = self.clock.now_ms().saturating_sub(start_ms);
                if elapsed_ms >= self.params.spin_deadline_ms {
                    warn!(
                        "Runaway rotation: spin chunk {} did not reach {:.3} rad within {} ms, \
                         stopping",
                        chunk,
                        target.aim_rad(),
                        self.params.spin_deadline_ms
                    );
                    return self.hand_to_stop(generation, Outcome::Aborted);
                }

                if let Err(e) = self.drive.spin(request.rotation, request.speed) {
                    error!("Drive fault while spinning, stopping: {}", e);
                    return self.hand_to_stop(generation, Outcome::Aborted);
                }

                self.clock.wait_ms(period_ms);
            }

            chunk_origin_rad = target.aim_rad();
        }

        info!("Spin complete");

        self.hand_to_stop(generation, Outcome::Completed)
    }

    fn exec_stop(&mut self, request: &MotionRequest, generation: u64) -> Outcome {
        let period_ms = self.params.control_period_ms;
        let mut outcome = Outcome::Completed;

        let ramp_from = match (request.previous_action, self.last_go) {
            (Action::Go, Some((direction, speed))) if speed > 0 => Some((direction, speed)),
            _ => None,
        };

        if let Some((direction, speed)) = ramp_from {
            debug!("Ramping down from {} over {} ms", speed, request.duration_ms);

            for s in ramp_down_speeds(speed, u64::from(request.duration_ms), period_ms) {
                if self.is_superseded(generation) {
                    outcome = Outcome::Superseded;
                    break;
                }

                if let Err(e) = self.drive.go(direction, s) {
                    error!("Drive fault during ramp down: {}", e);
                    break;
                }

                self.clock.wait_ms(period_ms);
            }
        }

        if let Err(e) = self.drive.stop() {
            error!("Drive fault while stopping: {}", e);
        }
        self.last_go = None;

        if self.store.transition(generation, |r| MotionRequest::idle(r.action)) {
            debug!("Stopped, now idle");
            outcome
        } else {
            Outcome::Superseded
        }
    }

    fn exec_turn(&mut self, _request: &MotionRequest, generation: u64) -> Outcome {
        warn!("Turn is not yet supported, stopping instead");
        self.hand_to_stop(generation, Outcome::Aborted)
    }

    /// Hand the current request over to an immediate stop, unless it has been
    /// superseded.
    fn hand_to_stop(&self, generation: u64, outcome: Outcome) -> Outcome {
        if self.store.transition(generation, |r| r.handed_to_stop()) {
            outcome
        } else {
            Outcome::Superseded
        }
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.store.generation() != generation
    }
}

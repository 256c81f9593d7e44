//! End to end tests of motion control, with the worker on its own thread.

use std::thread;
use std::time::{Duration, Instant};

use moti_lib::clock::SimClock;
use moti_lib::drive::{Direction, DriveActuator, Rotation};
use moti_lib::motion::{Action, MotionCtrl, MotionWorker, Params};
use moti_lib::sim::{DriveCmd, SimHeading, SimParams, SimRobot};

type Ctrl = MotionCtrl<SimHeading<SimClock>>;

fn spawn() -> (Ctrl, MotionWorker, SimRobot<SimClock>) {
    let clock = SimClock::new();
    let robot = SimRobot::new(SimParams::default(), clock.clone());

    let (ctrl, worker) =
        MotionCtrl::spawn(Params::default(), robot.drive(), robot.heading_sensor(), clock)
            .unwrap();

    (ctrl, worker, robot)
}

/// Wait (in real time) for the condition to hold.
fn wait_until<F: Fn() -> bool>(what: &str, f: F) {
    let start = Instant::now();
    while !f() {
        if start.elapsed() > Duration::from_secs(10) {
            panic!("Timed out waiting for {}", what);
        }
        thread::yield_now();
    }
}

fn go_speeds(robot: &SimRobot<SimClock>) -> Vec<(u64, u8)> {
    robot
        .history()
        .iter()
        .filter_map(|r| match r.cmd {
            DriveCmd::Go(_, s) => Some((r.time_ms, s)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_go_ramps_then_holds() {
    let (ctrl, worker, robot) = spawn();

    ctrl.go_forward(200, 0, 400).unwrap();
    wait_until("60 go commands", || go_speeds(&robot).len() >= 60);

    ctrl.stop_now();
    wait_until("idle", || ctrl.state() == Action::None);

    let speeds = go_speeds(&robot);
    let (ramp, hold): (Vec<&(u64, u8)>, Vec<&(u64, u8)>) = speeds.iter().partition(|(t, _)| *t < 400);

    assert_eq!(ramp.len(), 20);
    assert!(ramp.windows(2).all(|w| w[0].1 <= w[1].1));
    assert!(hold.iter().all(|(_, s)| *s == 200));

    assert_eq!(robot.history().last().unwrap().cmd, DriveCmd::Stop);
    assert!(robot.drive().state().is_stopped());

    worker.shutdown().unwrap();
}

#[test]
fn test_go_for_duration_stops_itself() {
    let (ctrl, worker, robot) = spawn();

    ctrl.go_backward(120, 300, 0).unwrap();
    wait_until("idle", || ctrl.state() == Action::None);

    let history = robot.history();
    let last = history.last().unwrap();
    assert_eq!(last.cmd, DriveCmd::Stop);
    assert!(last.time_ms >= 300 && last.time_ms <= 320);
    assert!(history[..history.len() - 1]
        .iter()
        .all(|r| r.cmd == DriveCmd::Go(Direction::Backward, 120)));

    worker.shutdown().unwrap();
}

#[test]
fn test_stop_ramps_down_after_go() {
    let (ctrl, worker, robot) = spawn();

    ctrl.go_forward(100, 0, 0).unwrap();
    wait_until("5 go commands", || go_speeds(&robot).len() >= 5);

    ctrl.stop(200);
    wait_until("idle", || ctrl.state() == Action::None);

    let history = robot.history();
    let tail: Vec<DriveCmd> = history[history.len() - 11..].iter().map(|r| r.cmd).collect();
    let expected: Vec<DriveCmd> = (0..10)
        .rev()
        .map(|k| DriveCmd::Go(Direction::Forward, k * 10))
        .chain(std::iter::once(DriveCmd::Stop))
        .collect();
    assert_eq!(tail, expected);

    worker.shutdown().unwrap();
}

#[test]
fn test_repeated_stop() {
    let (ctrl, worker, robot) = spawn();

    ctrl.go_forward(80, 0, 0).unwrap();
    wait_until("moving", || !robot.drive().state().is_stopped());

    ctrl.stop_now();
    ctrl.stop_now();
    wait_until("idle", || ctrl.state() == Action::None);

    assert!(robot.drive().state().is_stopped());
    assert_eq!(ctrl.request().previous_action, Action::Stop);

    worker.shutdown().unwrap();
}

#[test]
fn test_spin_and_turn() {
    let (ctrl, worker, robot) = spawn();

    assert!(ctrl.turn(Direction::Forward, Rotation::Right, 100).is_err());

    ctrl.spin_right_deg(255, 90.0).unwrap();
    wait_until("idle", || ctrl.state() == Action::None);

    let heading = robot.heading_rad();
    assert!(heading > std::f64::consts::FRAC_PI_2 && heading < 1.7);

    worker.shutdown().unwrap();
}

#[test]
fn test_concurrent_publishers() {
    let (ctrl, worker, robot) = spawn();

    let publishers: Vec<_> = (0..4)
        .map(|id| {
            let ctrl = ctrl.clone();
            thread::spawn(move || {
                for i in 0..200u32 {
                    match (id + i) % 3 {
                        0 => ctrl.go_forward(100, i, 50).unwrap(),
                        1 => ctrl.spin_left(150, 0.3).unwrap(),
                        _ => ctrl.stop(40),
                    }
                }
            })
        })
        .collect();

    for p in publishers {
        p.join().unwrap();
    }

    ctrl.stop_now();
    wait_until("idle", || ctrl.state() == Action::None);
    assert!(robot.drive().state().is_stopped());

    worker.shutdown().unwrap();
}

#[test]
fn test_shutdown_mid_spin() {
    let (ctrl, worker, robot) = spawn();

    ctrl.spin_left(255, 100.0).unwrap();
    wait_until("spinning", || !robot.drive().state().is_stopped());

    worker.shutdown().unwrap();

    assert!(robot.drive().state().is_stopped());
    assert_eq!(ctrl.state(), Action::None);
}

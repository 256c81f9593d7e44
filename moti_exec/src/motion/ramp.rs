//! Linear speed ramps used when starting to go and when stopping.

/// Speed to apply `elapsed_ms` into a ramp-in lasting `ramp_ms`.
///
/// Rises linearly from 0 and holds `speed` once the ramp is over.
pub fn ramp_in_speed(speed: u8, elapsed_ms: u64, ramp_ms: u64) -> u8 {
    if elapsed_ms >= ramp_ms {
        return speed;
    }

    (u64::from(speed) * elapsed_ms / ramp_ms) as u8
}

/// Speeds to apply, one per control period, to ramp `speed` down to rest
/// over `duration_ms`.
///
/// There are `duration_ms / period_ms` steps, falling linearly and ending at
/// zero. Shorter durations than one period give no steps at all.
pub fn ramp_down_speeds(speed: u8, duration_ms: u64, period_ms: u64) -> RampDown {
    let num_steps = if period_ms == 0 {
        0
    } else {
        duration_ms / period_ms
    };

    RampDown {
        speed: u64::from(speed),
        num_steps,
        step: 0,
    }
}

/// Iterator returned by [`ramp_down_speeds`].
#[derive(Clone, Debug)]
pub struct RampDown {
    speed: u64,
    num_steps: u64,
    step: u64,
}

impl Iterator for RampDown {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.step >= self.num_steps {
            return None;
        }

        self.step += 1;

        Some((self.speed * (self.num_steps - self.step) / self.num_steps) as u8)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ramp_in() {
        assert_eq!(ramp_in_speed(200, 0, 100), 0);
        assert_eq!(ramp_in_speed(200, 50, 100), 100);
        assert_eq!(ramp_in_speed(200, 99, 100), 198);
        assert_eq!(ramp_in_speed(200, 100, 100), 200);
        assert_eq!(ramp_in_speed(200, 5000, 100), 200);

        // No ramp means full speed straight away
        assert_eq!(ramp_in_speed(255, 0, 0), 255);

        let speeds: Vec<u8> = (0..30).map(|c| ramp_in_speed(255, c * 20, 500)).collect();
        assert!(speeds.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_ramp_down() {
        let speeds: Vec<u8> = ramp_down_speeds(100, 200, 20).collect();
        assert_eq!(speeds, vec![90, 80, 70, 60, 50, 40, 30, 20, 10, 0]);

        assert_eq!(ramp_down_speeds(100, 0, 20).count(), 0);
        assert_eq!(ramp_down_speeds(100, 19, 20).count(), 0);
        assert_eq!(ramp_down_speeds(255, 60, 20).collect::<Vec<_>>(), vec![170, 85, 0]);
    }
}

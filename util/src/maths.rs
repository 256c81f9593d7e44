//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap an angle into the range (-pi, pi].
pub fn wrap_pi<T>(value: T) -> T
where
    T: Float,
{
    wrap_pi_checked(value).0
}

/// Wrap an angle into the range (-pi, pi], also returning `true` if the value
/// was outside the range and had to be wrapped.
///
/// Values already inside the range are returned untouched, so no rounding
/// error is introduced for them.
pub fn wrap_pi_checked<T>(value: T) -> (T, bool)
where
    T: Float,
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    if value > -pi_t && value <= pi_t {
        return (value, false);
    }

    // Lands in [-pi, pi), the lower bound belongs to the other end
    let wrapped = rem_euclid(value + pi_t, tau_t) - pi_t;

    if wrapped <= -pi_t {
        (wrapped + tau_t, true)
    } else {
        (wrapped, true)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 200f64), (0f64, 100f64), 50f64), 25f64);
        assert_eq!(lin_map((0f64, 1f64), (1f64, -1f64), 1f64), -1f64);
    }

    #[test]
    fn test_wrap_pi() {
        assert_eq!(wrap_pi_checked(0.3f64), (0.3, false));
        assert_eq!(wrap_pi_checked(PI), (PI, false));

        let (w, crossed) = wrap_pi_checked(-PI);
        assert!((w - PI).abs() < EPS);
        assert!(crossed);

        let (w, crossed) = wrap_pi_checked(3.0 * FRAC_PI_2);
        assert!((w + FRAC_PI_2).abs() < EPS);
        assert!(crossed);

        let (w, crossed) = wrap_pi_checked(-3.0 * FRAC_PI_2);
        assert!((w - FRAC_PI_2).abs() < EPS);
        assert!(crossed);

        assert!(wrap_pi(TAU).abs() < EPS);
        assert!((wrap_pi(5.0 * PI) - PI).abs() < EPS);
        assert!((wrap_pi(-5.0 * PI) - PI).abs() < EPS);
    }
}

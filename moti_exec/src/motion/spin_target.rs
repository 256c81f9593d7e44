//! Spin target calculations
//!
//! Headings live in (-pi, pi], so the aim of a spin can end up on the other
//! side of the +/-pi seam from the heading it started at. A [`SpinTarget`]
//! keeps track of whether the seam still has to be crossed before the aim
//! comparison means anything.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::{PI, TAU};

use crate::drive::Rotation;
use util::maths::wrap_pi_checked;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Largest angle handled by a single chunk of a spin.
///
/// Units: radians
pub const MAX_CHUNK_RAD: f64 = TAU;

/// Remainders smaller than this are not worth another chunk.
///
/// Units: radians
const MIN_CHUNK_RAD: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The aim of one chunk of a spin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinTarget {
    rotation: Rotation,

    aim_rad: f64,

    /// True while the aim lies across the seam from the heading, i.e. until
    /// the heading samples have been seen jumping across it.
    crossed_seam: bool,

    last_rad: f64,
}

/// Iterator over the chunk sizes of a spin.
#[derive(Clone, Copy, Debug)]
pub struct SpinChunks {
    remaining_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SpinTarget {
    /// Aim for `step_rad` away from `origin_rad` in the direction of
    /// `rotation`.
    pub fn new(rotation: Rotation, origin_rad: f64, step_rad: f64) -> Self {
        let raw = match rotation {
            Rotation::Right => origin_rad + step_rad,
            Rotation::Left => origin_rad - step_rad,
        };

        let (mut aim_rad, mut crossed_seam) = wrap_pi_checked(raw);

        // Headings never read above pi, so a right spin aiming at exactly pi
        // has to look for it on the far side of the seam
        if rotation == Rotation::Right && !crossed_seam && aim_rad >= PI {
            aim_rad -= TAU;
            crossed_seam = true;
        }

        SpinTarget {
            rotation,
            aim_rad,
            crossed_seam,
            last_rad: origin_rad,
        }
    }

    pub fn aim_rad(&self) -> f64 {
        self.aim_rad
    }

    pub fn crossed_seam(&self) -> bool {
        self.crossed_seam
    }

    /// Feed the next heading sample, returning `true` once the aim has been
    /// passed.
    ///
    /// Consecutive samples whose product is below `seam_threshold` have
    /// jumped across the seam (one near +pi, the other near -pi). An aim on
    /// this side of the seam lies between the origin and the seam, so a jump
    /// across it means the aim was passed between the two samples.
    pub fn update(&mut self, heading_rad: f64, seam_threshold: f64) -> bool {
        let jumped_seam = self.last_rad * heading_rad < seam_threshold;
        self.last_rad = heading_rad;

        if self.crossed_seam {
            if !jumped_seam {
                return false;
            }
            self.crossed_seam = false;
        } else if jumped_seam {
            return true;
        }

        match self.rotation {
            Rotation::Left => heading_rad < self.aim_rad,
            Rotation::Right => heading_rad > self.aim_rad,
        }
    }
}

impl SpinChunks {
    pub fn new(angle_rad: f64) -> Self {
        SpinChunks {
            remaining_rad: angle_rad,
        }
    }
}

impl Iterator for SpinChunks {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if !(self.remaining_rad > MIN_CHUNK_RAD) {
            return None;
        }

        let step = self.remaining_rad.min(MAX_CHUNK_RAD);
        self.remaining_rad -= MAX_CHUNK_RAD;

        Some(step)
    }
}

//! Solver plane: the single vertical-axis abstraction.
//!
//! Every vertical comparison in the grounding solver goes through a
//! [`SolverPlane`] instead of hardcoding world up. On flat worlds the plane
//! is world `+Y`; with `rotate_solver` enabled a tilted character (slopes,
//! spherical worlds) gets a plane aligned to its root's up axis.

use glam::Vec3;

/// How far the root's up axis may deviate from world up before the tilted
/// path is taken. Below this the world-up fast path is used.
const TILT_EPSILON: f32 = 1e-4;

/// A reference plane defined by its up axis (always unit length).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverPlane {
    up: Vec3,
}

impl Default for SolverPlane {
    fn default() -> Self {
        Self::world()
    }
}

impl SolverPlane {
    /// The world-up plane (`+Y`).
    pub fn world() -> Self {
        Self { up: Vec3::Y }
    }

    /// Build the plane for a character whose root up axis is `root_up`.
    ///
    /// When `rotate_solver` is false, or the root is upright (within
    /// epsilon), this returns the world plane so the hot path stays cheap.
    pub fn from_root(root_up: Vec3, rotate_solver: bool) -> Self {
        if !rotate_solver {
            return Self::world();
        }
        let up = root_up.normalize_or_zero();
        if up == Vec3::ZERO || up.distance_squared(Vec3::Y) < TILT_EPSILON {
            return Self::world();
        }
        Self { up }
    }

    /// The plane's up axis (unit length).
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Remove the component of `v` along the plane's up axis.
    pub fn flatten(&self, v: Vec3) -> Vec3 {
        v - self.up * v.dot(self.up)
    }

    /// Signed height of `a` above `b`, measured along the plane's up axis.
    pub fn vertical_offset(&self, a: Vec3, b: Vec3) -> f32 {
        (a - b).dot(self.up)
    }

    /// Move `p` by `amount` along the plane's up axis.
    pub fn lift(&self, p: Vec3, amount: f32) -> Vec3 {
        p + self.up * amount
    }
}

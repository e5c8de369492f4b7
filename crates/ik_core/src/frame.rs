//! Reference frames for skeleton binding.

use glam::{Quat, Vec3};

/// A reference frame: world position plus orientation.
///
/// The grounding solver never owns bones. Each tick the host hands it the
/// root frame and one frame per foot, and reads offsets back out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Frame {
    /// Create a frame at the given position with identity orientation.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a frame with position and orientation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction (positive Y).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Translate the frame by a delta.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// True when position and rotation contain no NaN/inf components.
    /// Bind validation rejects frames that fail this.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

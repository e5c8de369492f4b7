//! Ground probe queries and the physics-provider seam.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Result of a ground probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    /// World position of the contact.
    pub point: Vec3,
    /// Surface normal at the contact.
    pub normal: Vec3,
    /// Distance along the cast direction to the contact.
    pub distance: f32,
}

/// Category bitmask used to filter which colliders ground probes can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMask(u32);

impl LayerMask {
    /// Matches every category.
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    /// Matches nothing. Probes against an empty mask always miss.
    pub const NONE: LayerMask = LayerMask(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Union of two masks.
    pub const fn union(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 | other.0)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Synchronous spatial queries against a shared physics world.
///
/// The solver is a read-only consumer of this index: each `update` issues at
/// most `leg_count + 1` casts and every cast either returns a hit or `None`
/// (the explicit no-hit sentinel). No timeouts, no cancellation — query cost
/// is assumed bounded by the provider.
///
/// `sphere_cast` and `capsule_cast` have ray-based default implementations so
/// simple providers (and test doubles) only need `raycast`; real providers
/// should override them with true swept-shape queries.
pub trait GroundQuery {
    /// Cast a ray and return the first hit within `max_distance`.
    fn raycast(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<GroundHit>;

    /// Sweep a sphere of `radius` from `origin` along `dir`.
    fn sphere_cast(
        &self,
        origin: Vec3,
        _radius: f32,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<GroundHit> {
        self.raycast(origin, dir, max_distance, mask)
    }

    /// Sweep a capsule with world-space segment endpoints `a`/`b` along `dir`.
    fn capsule_cast(
        &self,
        a: Vec3,
        b: Vec3,
        _radius: f32,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<GroundHit> {
        self.raycast((a + b) * 0.5, dir, max_distance, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mask_is_empty() {
        assert!(LayerMask::NONE.is_empty());
        assert!(!LayerMask::ALL.is_empty());
        assert!(!LayerMask::from_bits(1 << 3).is_empty());
    }

    #[test]
    fn union_combines_bits() {
        let m = LayerMask::from_bits(0b01).union(LayerMask::from_bits(0b10));
        assert_eq!(m.bits(), 0b11);
    }
}

//! Collision layers and the mapping to the solver's layer mask.

use grounding::LayerMask;
use rapier3d::prelude::*;

/// Collider categories for the grounding world.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionLayer {
    /// Static ground geometry feet may plant on (terrain, steps, platforms).
    Walkable = 1 << 0,
    /// Character bodies. Ground probes must not hit the character itself.
    Character = 1 << 1,
    /// Loose physics objects; usually excluded from foot placement.
    Debris = 1 << 2,
    /// Sensors; never walkable.
    Trigger = 1 << 3,
}

impl CollisionLayer {
    /// This layer's rapier group bit.
    pub fn group(self) -> Group {
        Group::from_bits_retain(self as u32)
    }

    /// This layer as a solver-side mask.
    pub fn mask(self) -> LayerMask {
        LayerMask::from_bits(self as u32)
    }

    /// Membership/filter pair for a collider on this layer that collides
    /// with everything.
    pub fn collider_groups(self) -> InteractionGroups {
        InteractionGroups::new(self.group(), Group::ALL)
    }
}

/// Query filter groups for a ground probe restricted to `mask`.
pub(crate) fn query_groups(mask: LayerMask) -> InteractionGroups {
    InteractionGroups::new(Group::ALL, Group::from_bits_retain(mask.bits()))
}

//! Rapier3D-backed ground query provider.
//!
//! Implements the `grounding::GroundQuery` seam on top of a static collider
//! world: build terrain once, refresh the query pipeline, then let the
//! solver probe it every tick.

pub mod layers;
pub mod query;
pub mod world;

pub use layers::*;
pub use world::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::ColliderHandle;

//! Foot-placement (grounding) solver.
//!
//! Adjusts per-foot vertical/rotational offsets and a pelvis offset so a
//! character's feet match terrain height under it. The solver owns no bones
//! and no physics world: the host hands it reference frames and a
//! [`GroundQuery`] implementation each tick and applies the offsets through
//! its own IK pipeline.
//!
//! Design rules for the hot path: never panic, never return errors — bad
//! tunables are clamped, missing geometry degrades to an airborne decay, and
//! problems are reported once per solver instance through `log`.

pub mod config;
pub mod leg;
pub mod pelvis;
pub mod query;
pub mod solver;

pub use config::*;
pub use leg::*;
pub use pelvis::*;
pub use query::*;
pub use solver::*;

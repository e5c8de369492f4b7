//! Core types shared by the IK solver crates.
//!
//! This crate provides the foundational pieces the grounding solver is built
//! on:
//! - Reference frames for skeleton binding (root and feet)
//! - The solver plane abstraction (all vertical math goes through it)
//! - Fixed-timestep clock for hosts driving the solver in real time

pub mod frame;
pub mod plane;
pub mod time;

pub use frame::*;
pub use plane::*;
pub use time::*;

// Re-export commonly used types
pub use glam::{Quat, Vec3};

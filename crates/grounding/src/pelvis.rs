//! Pelvis vertical blend.
//!
//! The pelvis carries a single vertical offset derived from all legs: it
//! drops so the lowest foot can reach down over ledges, and rises when every
//! foot is elevated (stairs). The offset follows its target through a damped
//! spring, suspension-style, rather than snapping.

use crate::config::GroundingConfig;

/// Pelvis spring state. Owned exclusively by the parent solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pelvis {
    offset: f32,
    velocity: f32,
}

impl Pelvis {
    /// Current smoothed vertical offset.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Clear all spring state (rebind).
    pub fn reset(&mut self) {
        self.offset = 0.0;
        self.velocity = 0.0;
    }

    /// Advance the spring one tick.
    ///
    /// `min_offset`/`max_offset` are the extremes of the per-leg vertical
    /// offsets this tick. While no leg is grounded the target is zero: an
    /// airborne character gets no artificial pelvis lift, only decay.
    ///
    /// Semi-implicit spring with stiffness `pelvis_speed²`; `pelvis_damper`
    /// (0..1) scales the critical damping coefficient `2·ω` applied as an
    /// exponential velocity decay, so `dt = 0` changes nothing.
    pub fn process(
        &mut self,
        min_offset: f32,
        max_offset: f32,
        grounded: bool,
        cfg: &GroundingConfig,
        dt: f32,
    ) {
        let target = if grounded {
            min_offset.min(0.0) * cfg.lower_pelvis_weight
                + max_offset.max(0.0) * cfg.lift_pelvis_weight
        } else {
            0.0
        };

        let omega = cfg.pelvis_speed;
        self.velocity += (target - self.offset) * omega * omega * dt;
        self.velocity *= (-2.0 * cfg.pelvis_damper * omega * dt).exp();
        self.offset += self.velocity * dt;
    }
}

//! The grounding controller.
//!
//! Owns all per-leg and pelvis state for one character and orchestrates the
//! per-tick ordering: clamp config → root probe → per-leg process → pelvis
//! blend. Constructed once per character, bound to a skeleton with
//! [`Grounding::bind`], then ticked by the host once per simulation frame
//! after physics has settled. Not re-entrant; one instance per character.

use crate::config::{GroundingConfig, Quality};
use crate::leg::Leg;
use crate::pelvis::Pelvis;
use crate::query::{GroundHit, GroundQuery};
use glam::Quat;
use ik_core::{Frame, SolverPlane};
use thiserror::Error;

/// Validation failures surfaced by [`Grounding::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("cannot bind a grounding solver with zero feet")]
    NoFeet,
    #[error("root frame contains non-finite position or rotation")]
    NonFiniteRoot,
}

/// Per-foot output: apply these to the foot bone through your IK pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootOffset {
    /// Vertical position offset along the solver plane's up axis.
    pub vertical: f32,
    /// Rotation offset aligning the foot to the ground normal.
    pub rotation: Quat,
}

/// Foot-placement solver for one character.
pub struct Grounding {
    /// Tunables. Public so hosts can live-tune; out-of-range values are
    /// clamped every update.
    pub config: GroundingConfig,
    weight: f32,
    legs: Vec<Leg>,
    pelvis: Pelvis,
    initiated: bool,
    is_grounded: bool,
    root_hit: Option<GroundHit>,
    warned_empty_mask: bool,
    warned_foot_count: bool,
}

impl Default for Grounding {
    fn default() -> Self {
        Self::new(GroundingConfig::default())
    }
}

impl Grounding {
    pub fn new(config: GroundingConfig) -> Self {
        Self {
            config,
            weight: 1.0,
            legs: Vec::new(),
            pelvis: Pelvis::default(),
            initiated: false,
            is_grounded: false,
            root_hit: None,
            warned_empty_mask: false,
            warned_foot_count: false,
        }
    }

    /// Bind the solver to a skeleton: validate the root frame and allocate
    /// one leg per foot.
    ///
    /// Rebinding with a different foot count reallocates the legs array and
    /// clears all prior state; no stale entries survive. This is the only
    /// place leg storage is (re)sized — never during the per-tick path.
    pub fn bind(&mut self, root: &Frame, foot_count: usize) -> Result<(), BindError> {
        if foot_count == 0 {
            return Err(BindError::NoFeet);
        }
        if !root.is_finite() {
            return Err(BindError::NonFiniteRoot);
        }
        self.legs.clear();
        self.legs.resize_with(foot_count, Leg::default);
        self.pelvis.reset();
        self.is_grounded = false;
        self.root_hit = None;
        self.initiated = true;
        Ok(())
    }

    /// Log-and-continue variant of [`bind`](Self::bind): a failed bind is
    /// reported through the logging channel and leaves the solver inert
    /// (every `update` a no-op) instead of propagating an error.
    pub fn initiate(&mut self, root: &Frame, foot_count: usize) -> bool {
        match self.bind(root, foot_count) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("grounding: bind failed: {e}; solver stays inert");
                self.initiated = false;
                false
            }
        }
    }

    /// Master blend weight, 0..1. Scales every output; at 0 the solver
    /// skips its update entirely.
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight.clamp(0.0, 1.0);
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Run one solver tick.
    ///
    /// `root` is the character's ground-level root frame (the point under
    /// the pelvis at standing height zero), not the pelvis bone itself.
    /// `feet` must be in bind order. At most `leg_count + 1` physics casts
    /// are issued. Degraded inputs (empty layer mask, foot-count mismatch)
    /// are tolerated and warned about once per solver instance; nothing in
    /// here panics or blocks the frame.
    pub fn update(&mut self, root: &Frame, feet: &[Frame], dt: f32, query: &dyn GroundQuery) {
        if !self.initiated || self.weight <= 0.0 {
            return;
        }
        if feet.len() != self.legs.len() && !self.warned_foot_count {
            log::warn!(
                "grounding: {} feet supplied but {} bound; extra feet are ignored and \
                 missing feet keep their last state",
                feet.len(),
                self.legs.len()
            );
            self.warned_foot_count = true;
        }
        if self.config.layers.is_empty() && !self.warned_empty_mask {
            log::warn!("grounding: layer mask is empty, ground probes cannot hit anything");
            self.warned_empty_mask = true;
        }
        self.config.clamp();

        let plane = SolverPlane::from_root(root.up(), self.config.rotate_solver);

        // Root probe: one ray (or sphere at Best quality) under the root
        // decides whether the character is close enough to ground for the
        // legs to plant at all.
        let origin = plane.lift(root.position, self.config.max_step);
        let dir = -plane.up();
        let range = self.config.max_step * 4.0;
        self.root_hit = match self.config.quality {
            Quality::Best => query.sphere_cast(
                origin,
                self.config.root_sphere_cast_radius,
                dir,
                range,
                self.config.layers,
            ),
            _ => query.raycast(origin, dir, range, self.config.layers),
        };
        let root_grounded =
            matches!(self.root_hit, Some(h) if h.distance < self.config.max_step * 2.0);

        let mut min_offset = f32::MAX;
        let mut max_offset = f32::MIN;
        for (leg, foot) in self.legs.iter_mut().zip(feet) {
            leg.process(&self.config, &plane, foot, root_grounded, dt, query);
            min_offset = min_offset.min(leg.ik_offset());
            max_offset = max_offset.max(leg.ik_offset());
        }
        if min_offset > max_offset {
            min_offset = 0.0;
            max_offset = 0.0;
        }

        self.is_grounded = self.legs.iter().any(Leg::is_grounded);
        self.pelvis
            .process(min_offset, max_offset, self.is_grounded, &self.config, dt);
    }

    /// True iff at least one leg found ground in the last update.
    pub fn is_grounded(&self) -> bool {
        self.is_grounded
    }

    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// Per-leg state, in bind order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// The last root probe result.
    pub fn root_hit(&self) -> Option<GroundHit> {
        self.root_hit
    }

    /// Output offsets for foot `index`, scaled by the solver weight.
    pub fn foot_offset(&self, index: usize) -> Option<FootOffset> {
        self.legs.get(index).map(|leg| FootOffset {
            vertical: leg.ik_offset() * self.weight,
            rotation: Quat::IDENTITY.slerp(leg.rotation_offset(), self.weight),
        })
    }

    /// Pelvis vertical offset, scaled by the solver weight.
    pub fn pelvis_offset(&self) -> f32 {
        self.pelvis.offset() * self.weight
    }
}

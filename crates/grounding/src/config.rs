//! Solver tunables. Loaded from a ron file by hosts that want data-driven
//! tuning, with serde defaults matching [`GroundingConfig::default`].

use crate::query::LayerMask;
use serde::{Deserialize, Serialize};

/// Smallest radius any cast shape is allowed to have.
const MIN_CAST_RADIUS: f32 = 1e-4;

/// Raycast quality: a trade-off between per-tick physics-query cost and
/// foot-placement accuracy. Higher quality only ever adds sampling work,
/// never removes guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quality {
    /// One ray per foot.
    Fastest,
    /// Three rays per foot, averaged (center, forward, right).
    #[default]
    Simple,
    /// A capsule cast per foot and a sphere cast for the root probe.
    Best,
}

impl Quality {
    /// Extra cast range, as a multiple of the step height, beyond the
    /// one-step lift of the sample origin.
    pub fn range_multiplier(&self) -> f32 {
        match self {
            Quality::Fastest | Quality::Simple => 1.0,
            Quality::Best => 3.0,
        }
    }
}

/// All grounding tunables.
///
/// Values arriving from data files or live tuning UIs are not trusted:
/// [`GroundingConfig::clamp`] runs at the top of every solver update and
/// pulls everything back into its documented bounds. Out-of-range input is
/// self-healed, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingConfig {
    /// Which collider categories ground probes may hit.
    #[serde(default)]
    pub layers: LayerMask,
    /// Max step height: probes reach one step above and below each foot.
    #[serde(default = "default_max_step")]
    pub max_step: f32,
    /// Constant vertical offset added to every grounded foot target.
    #[serde(default)]
    pub height_offset: f32,
    /// Foot offset interpolation speed, in units per second.
    #[serde(default = "default_foot_speed")]
    pub foot_speed: f32,
    /// Radius of the foot for spread/capsule sampling. Clamped to `max_step`.
    #[serde(default = "default_foot_radius")]
    pub foot_radius: f32,
    /// Shifts the sample point along the foot's forward axis (heel/toe bias).
    #[serde(default)]
    pub foot_center_offset: f32,
    /// Seconds of foot velocity used to lead the sample point on moving
    /// characters.
    #[serde(default = "default_prediction")]
    pub prediction: f32,
    /// Blend weight of the normal-following foot rotation, 0..1.
    #[serde(default = "default_one")]
    pub foot_rotation_weight: f32,
    /// Foot rotation interpolation speed.
    #[serde(default = "default_foot_rotation_speed")]
    pub foot_rotation_speed: f32,
    /// Cap on the normal-following rotation, in degrees, 0..90.
    #[serde(default = "default_max_foot_rotation_angle")]
    pub max_foot_rotation_angle: f32,
    /// Measure vertical offsets along the root's up axis instead of world up
    /// (tilted/spherical worlds).
    #[serde(default)]
    pub rotate_solver: bool,
    /// Pelvis spring angular frequency.
    #[serde(default = "default_pelvis_speed")]
    pub pelvis_speed: f32,
    /// Pelvis spring damping, 0..1. Higher is smoother and settles slower.
    #[serde(default = "default_pelvis_damper")]
    pub pelvis_damper: f32,
    /// How much the pelvis drops to help the lowest foot reach down, 0..1.
    #[serde(default = "default_one")]
    pub lower_pelvis_weight: f32,
    /// How much the pelvis rises when all feet are elevated (stairs), 0..1.
    #[serde(default)]
    pub lift_pelvis_weight: f32,
    /// Radius of the root probe sphere when quality is `Best`.
    #[serde(default = "default_root_sphere_cast_radius")]
    pub root_sphere_cast_radius: f32,
    /// Raycast quality.
    #[serde(default)]
    pub quality: Quality,
}

fn default_max_step() -> f32 {
    0.5
}
fn default_foot_speed() -> f32 {
    2.5
}
fn default_foot_radius() -> f32 {
    0.15
}
fn default_prediction() -> f32 {
    0.05
}
fn default_one() -> f32 {
    1.0
}
fn default_foot_rotation_speed() -> f32 {
    7.0
}
fn default_max_foot_rotation_angle() -> f32 {
    45.0
}
fn default_pelvis_speed() -> f32 {
    5.0
}
fn default_pelvis_damper() -> f32 {
    0.2
}
fn default_root_sphere_cast_radius() -> f32 {
    0.1
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            layers: LayerMask::ALL,
            max_step: default_max_step(),
            height_offset: 0.0,
            foot_speed: default_foot_speed(),
            foot_radius: default_foot_radius(),
            foot_center_offset: 0.0,
            prediction: default_prediction(),
            foot_rotation_weight: default_one(),
            foot_rotation_speed: default_foot_rotation_speed(),
            max_foot_rotation_angle: default_max_foot_rotation_angle(),
            rotate_solver: false,
            pelvis_speed: default_pelvis_speed(),
            pelvis_damper: default_pelvis_damper(),
            lower_pelvis_weight: default_one(),
            lift_pelvis_weight: 0.0,
            root_sphere_cast_radius: default_root_sphere_cast_radius(),
            quality: Quality::default(),
        }
    }
}

impl GroundingConfig {
    /// Pull every tunable back into its documented bounds.
    ///
    /// Runs every solver update so live-tuned or deserialized values can
    /// never destabilise the control loop.
    pub fn clamp(&mut self) {
        self.max_step = self.max_step.max(0.0);
        self.foot_radius = self
            .foot_radius
            .clamp(MIN_CAST_RADIUS, self.max_step.max(MIN_CAST_RADIUS));
        self.foot_speed = self.foot_speed.max(0.0);
        self.prediction = self.prediction.max(0.0);
        self.foot_rotation_weight = self.foot_rotation_weight.clamp(0.0, 1.0);
        self.foot_rotation_speed = self.foot_rotation_speed.max(0.0);
        self.max_foot_rotation_angle = self.max_foot_rotation_angle.clamp(0.0, 90.0);
        self.pelvis_speed = self.pelvis_speed.max(0.0);
        self.pelvis_damper = self.pelvis_damper.clamp(0.0, 1.0);
        self.lower_pelvis_weight = self.lower_pelvis_weight.clamp(0.0, 1.0);
        self.lift_pelvis_weight = self.lift_pelvis_weight.clamp(0.0, 1.0);
        self.root_sphere_cast_radius = self.root_sphere_cast_radius.max(MIN_CAST_RADIUS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Defaults are already in bounds: clamping them changes nothing.
    #[test]
    fn defaults_are_stable_under_clamp() {
        let mut cfg = GroundingConfig::default();
        let before = cfg.clone();
        cfg.clamp();
        assert_eq!(cfg, before);
    }

    #[test]
    fn damper_clamps_to_unit_range() {
        let mut cfg = GroundingConfig {
            pelvis_damper: 5.0,
            ..Default::default()
        };
        cfg.clamp();
        assert_eq!(cfg.pelvis_damper, 1.0);

        cfg.pelvis_damper = -0.3;
        cfg.clamp();
        assert_eq!(cfg.pelvis_damper, 0.0);
    }

    #[test]
    fn foot_rotation_angle_caps_at_ninety() {
        let mut cfg = GroundingConfig {
            max_foot_rotation_angle: 720.0,
            ..Default::default()
        };
        cfg.clamp();
        assert_eq!(cfg.max_foot_rotation_angle, 90.0);
    }

    /// Foot radius can never exceed the step height or collapse to zero.
    #[test]
    fn foot_radius_bounded_by_step_height() {
        let mut cfg = GroundingConfig {
            max_step: 0.2,
            foot_radius: 1.5,
            ..Default::default()
        };
        cfg.clamp();
        assert_eq!(cfg.foot_radius, 0.2);

        cfg.foot_radius = 0.0;
        cfg.clamp();
        assert!(cfg.foot_radius > 0.0);
    }

    #[test]
    fn negative_speeds_clamp_to_zero() {
        let mut cfg = GroundingConfig {
            max_step: -1.0,
            foot_speed: -2.0,
            pelvis_speed: -5.0,
            prediction: -0.1,
            ..Default::default()
        };
        cfg.clamp();
        assert_eq!(cfg.max_step, 0.0);
        assert_eq!(cfg.foot_speed, 0.0);
        assert_eq!(cfg.pelvis_speed, 0.0);
        assert_eq!(cfg.prediction, 0.0);
    }

    /// Higher quality levels never reduce the probe range.
    #[test]
    fn quality_range_is_monotonic() {
        assert!(Quality::Best.range_multiplier() >= Quality::Simple.range_multiplier());
        assert!(Quality::Simple.range_multiplier() >= Quality::Fastest.range_multiplier());
    }
}

//! Per-foot grounding state.
//!
//! Each leg tracks its own ground hit, smoothed vertical IK offset and
//! normal-following rotation offset. A leg is either airborne (no usable hit
//! within step range, offsets decay to identity) or grounded (offsets chase
//! the sampled terrain). All state is owned by the parent solver and mutated
//! only inside [`Leg::process`].

use crate::config::{GroundingConfig, Quality};
use crate::query::{GroundHit, GroundQuery};
use glam::{Quat, Vec3};
use ik_core::{Frame, SolverPlane};

/// Move `current` toward `target` by at most `max_delta`.
fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(delta)
    }
}

/// Rotation taking `up` onto `normal`, with its angle capped at `max_angle`
/// radians. Degenerate normals yield identity.
fn clamped_normal_rotation(up: Vec3, normal: Vec3, max_angle: f32) -> Quat {
    let normal = normal.normalize_or_zero();
    if normal == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let full = Quat::from_rotation_arc(up, normal);
    let angle = up.angle_between(normal);
    if angle <= max_angle || angle < 1e-6 {
        full
    } else {
        Quat::IDENTITY.slerp(full, max_angle / angle)
    }
}

/// Runtime state for one foot.
#[derive(Debug, Clone, Default)]
pub struct Leg {
    ik_offset: f32,
    rotation_offset: Quat,
    grounded: bool,
    hit: Option<GroundHit>,
    last_position: Option<Vec3>,
    velocity: Vec3,
}

impl Leg {
    /// Smoothed vertical IK offset (ground minus foot, along the solver
    /// plane's up axis). Negative when the foot hangs above a drop.
    pub fn ik_offset(&self) -> f32 {
        self.ik_offset
    }

    /// Smoothed normal-following rotation offset.
    pub fn rotation_offset(&self) -> Quat {
        self.rotation_offset
    }

    /// True when the last probe found ground within step range.
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// The last probe result, if any.
    pub fn hit(&self) -> Option<GroundHit> {
        self.hit
    }

    /// Horizontal foot velocity derived from successive tick positions.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Run one tick for this leg: probe the ground under the foot and blend
    /// the offsets toward what the probe found.
    pub fn process(
        &mut self,
        cfg: &GroundingConfig,
        plane: &SolverPlane,
        foot: &Frame,
        root_grounded: bool,
        dt: f32,
        query: &dyn GroundQuery,
    ) {
        // Velocity from successive positions, horizontal only. The first
        // tick after (re)binding has no history and reports zero.
        if dt > 0.0 {
            if let Some(last) = self.last_position {
                self.velocity = plane.flatten(foot.position - last) / dt;
            }
            self.last_position = Some(foot.position);
        }

        let forward = plane.flatten(foot.forward()).normalize_or_zero();
        let sample_center = foot.position
            + self.velocity * cfg.prediction
            + forward * cfg.foot_center_offset;
        let origin = plane.lift(sample_center, cfg.max_step);
        let dir = -plane.up();
        let range = cfg.max_step * (cfg.quality.range_multiplier() + 1.0);

        self.hit = match cfg.quality {
            Quality::Fastest => query.raycast(origin, dir, range, cfg.layers),
            Quality::Simple => {
                let right = plane.flatten(foot.right()).normalize_or_zero();
                sample_spread(query, origin, dir, range, cfg, forward, right)
            }
            Quality::Best => {
                let half = forward * cfg.foot_radius;
                query.capsule_cast(
                    origin - half,
                    origin + half,
                    cfg.foot_radius,
                    dir,
                    range,
                    cfg.layers,
                )
            }
        };

        self.grounded =
            root_grounded && matches!(self.hit, Some(h) if h.distance < cfg.max_step * 2.0);

        // Vertical offset: chase the sampled ground height while grounded,
        // decay back to zero while airborne. Bounded rate either way.
        let offset_target = match self.hit {
            Some(hit) if self.grounded => {
                (plane.vertical_offset(hit.point, foot.position) + cfg.height_offset)
                    .clamp(-cfg.max_step, cfg.max_step)
            }
            _ => 0.0,
        };
        self.ik_offset = move_toward(self.ik_offset, offset_target, cfg.foot_speed * dt);

        // Rotation offset: follow the surface normal up to the configured
        // angle cap, weighted, with exponential smoothing.
        let rotation_target = match self.hit {
            Some(hit) if self.grounded && cfg.foot_rotation_weight > 0.0 => {
                let full = clamped_normal_rotation(
                    plane.up(),
                    hit.normal,
                    cfg.max_foot_rotation_angle.to_radians(),
                );
                Quat::IDENTITY.slerp(full, cfg.foot_rotation_weight)
            }
            _ => Quat::IDENTITY,
        };
        let t = 1.0 - (-cfg.foot_rotation_speed * dt).exp();
        if t > 0.0 {
            self.rotation_offset = self.rotation_offset.slerp(rotation_target, t);
        }
    }
}

/// Three-ray spread sample: center, forward and right of the foot, offset by
/// the foot radius. Hits are averaged; a miss on one ray does not discard
/// the others.
fn sample_spread(
    query: &dyn GroundQuery,
    origin: Vec3,
    dir: Vec3,
    range: f32,
    cfg: &GroundingConfig,
    forward: Vec3,
    right: Vec3,
) -> Option<GroundHit> {
    let offsets = [Vec3::ZERO, forward * cfg.foot_radius, right * cfg.foot_radius];

    let mut point = Vec3::ZERO;
    let mut normal = Vec3::ZERO;
    let mut distance = 0.0;
    let mut hits = 0u32;
    for offset in offsets {
        if let Some(hit) = query.raycast(origin + offset, dir, range, cfg.layers) {
            point += hit.point;
            normal += hit.normal;
            distance += hit.distance;
            hits += 1;
        }
    }
    if hits == 0 {
        return None;
    }
    let inv = 1.0 / hits as f32;
    Some(GroundHit {
        point: point * inv,
        normal: (normal * inv).normalize_or_zero(),
        distance: distance * inv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::LayerMask;

    const DT: f32 = 1.0 / 60.0;

    /// Flat plane whose height varies linearly with x, so spread samples can
    /// be told apart. slope = 0 gives a level plane.
    struct Plane {
        height: f32,
        slope_x: f32,
        normal: Vec3,
    }

    impl Plane {
        fn flat(height: f32) -> Self {
            Self {
                height,
                slope_x: 0.0,
                normal: Vec3::Y,
            }
        }
    }

    impl GroundQuery for Plane {
        fn raycast(
            &self,
            origin: Vec3,
            _dir: Vec3,
            max_distance: f32,
            mask: LayerMask,
        ) -> Option<GroundHit> {
            if mask.is_empty() {
                return None;
            }
            let ground_y = self.height + origin.x * self.slope_x;
            let distance = origin.y - ground_y;
            if distance < 0.0 || distance > max_distance {
                return None;
            }
            Some(GroundHit {
                point: Vec3::new(origin.x, ground_y, origin.z),
                normal: self.normal,
                distance,
            })
        }
    }

    fn fastest_config() -> GroundingConfig {
        GroundingConfig {
            quality: Quality::Fastest,
            prediction: 0.0,
            ..Default::default()
        }
    }

    /// Foot 0.3 above a plane at y=0 with max_step 0.5: the leg grounds and
    /// its offset converges to -0.3 at a rate bounded by foot_speed.
    #[test]
    fn offset_converges_to_ground_at_bounded_rate() {
        let query = Plane::flat(0.0);
        let cfg = fastest_config();
        let plane = SolverPlane::world();
        let foot = Frame::from_position(Vec3::new(0.0, 0.3, 0.0));
        let mut leg = Leg::default();

        let mut previous = 0.0f32;
        for _ in 0..120 {
            leg.process(&cfg, &plane, &foot, true, DT, &query);
            assert!(leg.is_grounded());
            let step = (leg.ik_offset() - previous).abs();
            assert!(
                step <= cfg.foot_speed * DT + 1e-5,
                "per-tick change {} exceeds foot_speed bound",
                step
            );
            previous = leg.ik_offset();
        }
        assert!(
            (leg.ik_offset() + 0.3).abs() < 1e-4,
            "offset was {}, expected -0.3",
            leg.ik_offset()
        );
    }

    /// No ground within range: the leg goes airborne and its offset decays
    /// back to zero.
    #[test]
    fn airborne_leg_decays_to_zero() {
        let query = Plane::flat(0.0);
        let cfg = fastest_config();
        let plane = SolverPlane::world();
        let foot = Frame::from_position(Vec3::new(0.0, 0.3, 0.0));
        let mut leg = Leg::default();
        for _ in 0..120 {
            leg.process(&cfg, &plane, &foot, true, DT, &query);
        }
        assert!(leg.ik_offset() < -0.25);

        // Ground falls far away (pit).
        let pit = Plane::flat(-50.0);
        for _ in 0..240 {
            leg.process(&cfg, &plane, &foot, true, DT, &pit);
            assert!(!leg.is_grounded());
        }
        assert!(
            leg.ik_offset().abs() < 1e-4,
            "offset should decay to 0, was {}",
            leg.ik_offset()
        );
    }

    /// An ungrounded root vetoes leg grounding even when the foot's own
    /// probe hits.
    #[test]
    fn root_airborne_vetoes_grounding() {
        let query = Plane::flat(0.0);
        let cfg = fastest_config();
        let plane = SolverPlane::world();
        let foot = Frame::from_position(Vec3::new(0.0, 0.1, 0.0));
        let mut leg = Leg::default();
        leg.process(&cfg, &plane, &foot, false, DT, &query);
        assert!(!leg.is_grounded());
        assert_eq!(leg.ik_offset(), 0.0);
    }

    /// Simple quality averages the three spread samples.
    #[test]
    fn spread_sampling_averages_heights() {
        // Height rises 1:1 with x; foot faces -Z so the spread rays sit at
        // x = 0, 0 (forward) and foot_radius (right). Average height is
        // foot_radius / 3.
        let query = Plane {
            height: 0.0,
            slope_x: 1.0,
            normal: Vec3::Y,
        };
        let cfg = GroundingConfig {
            quality: Quality::Simple,
            prediction: 0.0,
            ..Default::default()
        };
        let plane = SolverPlane::world();
        let foot = Frame::from_position(Vec3::ZERO);
        let mut leg = Leg::default();
        for _ in 0..240 {
            leg.process(&cfg, &plane, &foot, true, DT, &query);
        }
        let expected = cfg.foot_radius / 3.0;
        assert!(
            (leg.ik_offset() - expected).abs() < 1e-3,
            "offset {} expected {}",
            leg.ik_offset(),
            expected
        );
    }

    /// The applied foot rotation never exceeds the configured angle cap,
    /// even against a near-vertical surface normal.
    #[test]
    fn rotation_angle_never_exceeds_cap() {
        let steep = Vec3::new(1.0, 0.2, 0.0).normalize();
        let query = Plane {
            height: 0.0,
            slope_x: 0.0,
            normal: steep,
        };
        let cfg = fastest_config();
        let max = cfg.max_foot_rotation_angle.to_radians();
        let plane = SolverPlane::world();
        let foot = Frame::from_position(Vec3::new(0.0, 0.1, 0.0));
        let mut leg = Leg::default();
        for _ in 0..300 {
            leg.process(&cfg, &plane, &foot, true, DT, &query);
            let (_, angle) = leg.rotation_offset().to_axis_angle();
            assert!(
                angle <= max + 1e-4,
                "rotation angle {} exceeds cap {}",
                angle,
                max
            );
        }
        // And the blend actually reached the cap against this steep normal.
        let (_, angle) = leg.rotation_offset().to_axis_angle();
        assert!(angle > max * 0.9, "rotation never approached cap: {}", angle);
    }

    /// Zero rotation weight keeps the rotation offset at identity.
    #[test]
    fn zero_rotation_weight_stays_identity() {
        let query = Plane {
            height: 0.0,
            slope_x: 0.0,
            normal: Vec3::new(1.0, 1.0, 0.0).normalize(),
        };
        let cfg = GroundingConfig {
            foot_rotation_weight: 0.0,
            ..fastest_config()
        };
        let plane = SolverPlane::world();
        let foot = Frame::from_position(Vec3::new(0.0, 0.1, 0.0));
        let mut leg = Leg::default();
        for _ in 0..120 {
            leg.process(&cfg, &plane, &foot, true, DT, &query);
        }
        let (_, angle) = leg.rotation_offset().to_axis_angle();
        assert!(angle < 1e-4, "rotation should stay identity, angle {}", angle);
    }

    /// dt = 0 must not advance any smoothing state.
    #[test]
    fn zero_dt_is_a_no_op() {
        let query = Plane::flat(0.0);
        let cfg = fastest_config();
        let plane = SolverPlane::world();
        let foot = Frame::from_position(Vec3::new(0.0, 0.3, 0.0));
        let mut leg = Leg::default();
        for _ in 0..30 {
            leg.process(&cfg, &plane, &foot, true, DT, &query);
        }
        let offset = leg.ik_offset();
        let rotation = leg.rotation_offset();
        leg.process(&cfg, &plane, &foot, true, 0.0, &query);
        leg.process(&cfg, &plane, &foot, true, 0.0, &query);
        assert_eq!(leg.ik_offset(), offset);
        assert_eq!(leg.rotation_offset(), rotation);
    }

    /// Velocity prediction leads the sample point in the movement direction.
    #[test]
    fn prediction_leads_moving_feet() {
        // Ground slopes up along +x. A foot moving in +x with prediction
        // enabled samples ahead, so its offset target is higher than that of
        // a stationary foot at the same spot.
        let query = Plane {
            height: -0.2,
            slope_x: 0.05,
            normal: Vec3::Y,
        };
        let cfg = GroundingConfig {
            prediction: 0.2,
            ..fastest_config()
        };
        let plane = SolverPlane::world();
        let mut leg = Leg::default();
        let mut x = 0.0f32;
        for _ in 0..120 {
            let foot = Frame::from_position(Vec3::new(x, 0.0, 0.0));
            leg.process(&cfg, &plane, &foot, true, DT, &query);
            x += 2.0 * DT; // 2 units/sec
        }
        // Stationary reference at the same final x.
        let mut still = Leg::default();
        let foot = Frame::from_position(Vec3::new(x, 0.0, 0.0));
        for _ in 0..240 {
            still.process(&cfg, &plane, &foot, true, DT, &query);
        }
        assert!(
            leg.ik_offset() > still.ik_offset() + 1e-3,
            "moving {} vs still {}",
            leg.ik_offset(),
            still.ik_offset()
        );
    }
}

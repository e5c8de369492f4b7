//! `GroundQuery` implementation on top of the rapier query pipeline.

use crate::layers::query_groups;
use crate::world::PhysicsWorld;
use glam::Vec3;
use grounding::{GroundHit, GroundQuery, LayerMask};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::prelude::*;

impl PhysicsWorld {
    /// Shared shape-cast path for sphere and capsule probes.
    ///
    /// Swept-shape queries give a reliable time of impact but awkward
    /// witness geometry, so a short refinement ray from the shape center at
    /// impact recovers the exact contact point and surface normal. If the
    /// refinement ray misses (glancing contact on an edge), fall back to
    /// the swept estimate.
    fn cast_shape_hit(
        &self,
        shape_pos: &Isometry<Real>,
        center: Vec3,
        radius: f32,
        dir: Vec3,
        max_distance: f32,
        shape: &dyn Shape,
        mask: LayerMask,
    ) -> Option<GroundHit> {
        let options = ShapeCastOptions {
            max_time_of_impact: max_distance,
            target_distance: 0.0,
            stop_at_penetration: true,
            compute_impact_geometry_on_penetration: true,
        };
        let filter = QueryFilter::default().groups(query_groups(mask));
        let vel = vector![dir.x, dir.y, dir.z];

        self.query_pipeline
            .cast_shape(
                &self.rigid_body_set,
                &self.collider_set,
                shape_pos,
                &vel,
                shape,
                options,
                filter,
            )
            .map(|(_, hit)| {
                let traveled = hit.time_of_impact;
                let center_at_impact = center + dir * traveled;
                match self.raycast(center_at_impact, dir, radius * 2.0, mask) {
                    Some(refined) => GroundHit {
                        point: refined.point,
                        normal: refined.normal,
                        distance: traveled,
                    },
                    None => GroundHit {
                        point: center_at_impact + dir * radius,
                        normal: -dir,
                        distance: traveled,
                    },
                }
            })
    }
}

impl GroundQuery for PhysicsWorld {
    fn raycast(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<GroundHit> {
        if mask.is_empty() {
            return None;
        }
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![dir.x, dir.y, dir.z],
        );
        let filter = QueryFilter::default().groups(query_groups(mask));

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(_, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                GroundHit {
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Vec3::new(
                        intersection.normal.x,
                        intersection.normal.y,
                        intersection.normal.z,
                    ),
                    distance: intersection.time_of_impact,
                }
            })
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<GroundHit> {
        if mask.is_empty() {
            return None;
        }
        let shape = Ball::new(radius);
        let shape_pos = Isometry::translation(origin.x, origin.y, origin.z);
        self.cast_shape_hit(&shape_pos, origin, radius, dir, max_distance, &shape, mask)
    }

    fn capsule_cast(
        &self,
        a: Vec3,
        b: Vec3,
        radius: f32,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<GroundHit> {
        if mask.is_empty() {
            return None;
        }
        // World-space endpoints with an identity isometry keeps the math
        // obvious; the segment may be degenerate (a == b), which parry
        // treats as a ball.
        let shape = Capsule::new(point![a.x, a.y, a.z], point![b.x, b.y, b.z], radius);
        let center = (a + b) * 0.5;
        let shape_pos = Isometry::identity();
        self.cast_shape_hit(&shape_pos, center, radius, dir, max_distance, &shape, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::CollisionLayer;

    fn world_with_plane() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.add_ground_plane(CollisionLayer::Walkable);
        world.update_query_pipeline();
        world
    }

    #[test]
    fn ray_hits_ground_plane_at_origin_height() {
        let world = world_with_plane();
        let hit = world
            .raycast(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, 10.0, LayerMask::ALL)
            .expect("ray should hit the plane");
        assert!((hit.distance - 2.0).abs() < 1e-4);
        assert!(hit.point.y.abs() < 1e-4);
        assert!(hit.normal.abs_diff_eq(Vec3::Y, 1e-4));
    }

    #[test]
    fn ray_misses_beyond_max_distance() {
        let world = world_with_plane();
        let hit = world.raycast(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y, 1.0, LayerMask::ALL);
        assert!(hit.is_none());
    }

    /// A mask that excludes the plane's layer filters it out.
    #[test]
    fn mask_filters_colliders() {
        let world = world_with_plane();
        let hit = world.raycast(
            Vec3::new(0.0, 2.0, 0.0),
            -Vec3::Y,
            10.0,
            CollisionLayer::Debris.mask(),
        );
        assert!(hit.is_none());

        let hit = world.raycast(
            Vec3::new(0.0, 2.0, 0.0),
            -Vec3::Y,
            10.0,
            CollisionLayer::Walkable.mask(),
        );
        assert!(hit.is_some());
    }

    /// The empty mask is an unconditional miss, matching the solver's
    /// degraded-service contract.
    #[test]
    fn empty_mask_never_hits() {
        let world = world_with_plane();
        assert!(world
            .raycast(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, 10.0, LayerMask::NONE)
            .is_none());
        assert!(world
            .sphere_cast(Vec3::new(0.0, 2.0, 0.0), 0.1, -Vec3::Y, 10.0, LayerMask::NONE)
            .is_none());
    }

    /// A swept sphere touches down one radius earlier than a ray from the
    /// same origin.
    #[test]
    fn sphere_cast_stops_one_radius_early() {
        let world = world_with_plane();
        let origin = Vec3::new(0.0, 2.0, 0.0);
        let radius = 0.25;
        let ray = world
            .raycast(origin, -Vec3::Y, 10.0, LayerMask::ALL)
            .expect("ray hit");
        let sphere = world
            .sphere_cast(origin, radius, -Vec3::Y, 10.0, LayerMask::ALL)
            .expect("sphere hit");
        assert!((ray.distance - sphere.distance - radius).abs() < 1e-3);
        // Contact geometry recovered by the refinement ray sits on the plane.
        assert!(sphere.point.y.abs() < 1e-3);
        assert!(sphere.normal.abs_diff_eq(Vec3::Y, 1e-3));
    }

    /// Capsule cast over a step hits the step top, not the floor below.
    #[test]
    fn capsule_cast_lands_on_step() {
        let mut world = PhysicsWorld::new();
        world.add_ground_plane(CollisionLayer::Walkable);
        world.add_static_cuboid(
            Vec3::new(0.0, 0.1, 0.0),
            0.0,
            Vec3::new(0.5, 0.1, 0.5),
            CollisionLayer::Walkable,
        );
        world.update_query_pipeline();

        let radius = 0.1;
        let a = Vec3::new(-0.1, 1.0, 0.0);
        let b = Vec3::new(0.1, 1.0, 0.0);
        let hit = world
            .capsule_cast(a, b, radius, -Vec3::Y, 5.0, LayerMask::ALL)
            .expect("capsule hit");
        // Step top is at y = 0.2; the capsule surface reaches it after
        // traveling 1.0 - 0.2 - radius.
        assert!((hit.distance - (1.0 - 0.2 - radius)).abs() < 1e-3);
        assert!((hit.point.y - 0.2).abs() < 1e-2);
    }

    /// Heightfield terrain is probe-able like any other walkable collider.
    #[test]
    fn ray_hits_heightfield() {
        let mut world = PhysicsWorld::new();
        let heights = vec![1.0f32; 4 * 4];
        world.add_heightfield(&heights, 4, 4, 8.0, 8.0, CollisionLayer::Walkable);
        world.update_query_pipeline();

        let hit = world
            .raycast(Vec3::new(0.5, 5.0, 0.5), -Vec3::Y, 10.0, LayerMask::ALL)
            .expect("ray should hit the heightfield");
        assert!((hit.point.y - 1.0).abs() < 1e-3);
        assert!((hit.distance - 4.0).abs() < 1e-3);
    }
}

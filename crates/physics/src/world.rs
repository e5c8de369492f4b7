//! Static collider world for ground queries.

use crate::layers::CollisionLayer;
use glam::Vec3;
use rapier3d::na::{Isometry3, Vector3};
use rapier3d::prelude::*;

/// A static spatial index the grounding solver probes each tick.
///
/// Only colliders live here — no dynamics, no joints. After any mutation,
/// call [`update_query_pipeline`](Self::update_query_pipeline) before
/// querying again.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub query_pipeline: QueryPipeline,
    island_manager: IslandManager,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
            island_manager: IslandManager::new(),
        }
    }

    /// Rebuild the query acceleration structure after collider changes.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add an infinite ground plane (flat Y=0 half-space) on the given layer.
    pub fn add_ground_plane(&mut self, layer: CollisionLayer) -> ColliderHandle {
        let collider = ColliderBuilder::halfspace(Vector::y_axis())
            .collision_groups(layer.collider_groups())
            .build();
        self.collider_set.insert(collider)
    }

    /// Add a static cuboid collider (steps, platforms). No parent body; the
    /// collider is fixed in the world.
    /// `translation`: world position of center. `rotation_y_rad`: rotation
    /// around Y in radians. `half_extents`: half sizes in local X, Y, Z.
    pub fn add_static_cuboid(
        &mut self,
        translation: Vec3,
        rotation_y_rad: f32,
        half_extents: Vec3,
        layer: CollisionLayer,
    ) -> ColliderHandle {
        let tra = vector![translation.x, translation.y, translation.z];
        let axisangle = Vector3::y_axis().into_inner() * (rotation_y_rad as Real);
        let position = Isometry3::new(tra, axisangle);
        let collider = ColliderBuilder::cuboid(
            half_extents.x as Real,
            half_extents.y as Real,
            half_extents.z as Real,
        )
        .position(position)
        .collision_groups(layer.collider_groups())
        .build();
        self.collider_set.insert(collider)
    }

    /// Add a heightfield collider for terrain.
    /// - `heights`: flat slice of world-Y height values, row-major order
    ///   (index = row * ncols + col).
    /// - `nrows`, `ncols`: grid dimensions (at least 2 each).
    /// - `size_x`, `size_z`: total extent in world units (the field spans
    ///   -size/2 to +size/2 in X and Z).
    pub fn add_heightfield(
        &mut self,
        heights: &[f32],
        nrows: usize,
        ncols: usize,
        size_x: f32,
        size_z: f32,
        layer: CollisionLayer,
    ) -> ColliderHandle {
        assert!(
            nrows >= 2 && ncols >= 2,
            "heightfield must have at least 2 rows and columns"
        );
        assert!(
            heights.len() >= nrows * ncols,
            "heights slice too small for {}x{} grid",
            nrows,
            ncols
        );

        let heights_matrix = DMatrix::from_fn(nrows, ncols, |i, j| heights[i * ncols + j] as Real);
        let scale = vector![size_x, 1.0, size_z];

        let collider = ColliderBuilder::heightfield(heights_matrix, scale)
            .collision_groups(layer.collider_groups())
            .build();
        log::debug!(
            "heightfield added: {}x{} over {}x{} units",
            nrows,
            ncols,
            size_x,
            size_z
        );
        self.collider_set.insert(collider)
    }

    /// Remove a collider by its handle.
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            true,
        );
    }
}

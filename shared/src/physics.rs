//! Rapier world holding a level's immutable static geometry.
//!
//! Both roles insert every static collider (ground plane, structures) through
//! [`StaticPhysicsWorld::insert_static`]. The world is query-focused: it never steps a
//! simulation, it only keeps the sets and phases needed for scene queries.
//!
//! Ordering
//! - Insertion takes `&mut self`, so no insertion can interleave with a borrow held by a
//!   running query or simulation step.
//! - Handles are returned in insertion order; callers that need determinism insert in a
//!   stable order (the placement list order).

// Re-export Rapier so downstream crates (server/client) can use Rapier types
// without needing to depend on `rapier3d` directly.
pub use rapier3d;

use nalgebra::Isometry3;
use rapier3d::prelude::*;

use crate::collision::{ShapeKind, StaticCollider};

/// In-memory Rapier structures for static world geometry.
pub struct StaticPhysicsWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
    inserted: Vec<(ColliderHandle, ShapeKind)>,
}

impl Default for StaticPhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticPhysicsWorld {
    pub fn new() -> Self {
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            inserted: Vec::new(),
        }
    }

    /// Insert a static collider as a fixed (non-moving, infinite mass) rigid-body with the
    /// collider attached at identity.
    pub fn insert_static(&mut self, collider: StaticCollider) -> ColliderHandle {
        let rb = RigidBodyBuilder::fixed().pose(*collider.pose()).build();
        let rb_handle = self.bodies.insert(rb);
        let handle =
            self.colliders
                .insert_with_parent(collider.to_collider(), rb_handle, &mut self.bodies);
        self.inserted.push((handle, collider.kind()));
        handle
    }

    /// Every inserted collider, in insertion order.
    pub fn inserted(&self) -> &[(ColliderHandle, ShapeKind)] {
        &self.inserted
    }

    pub fn len(&self) -> usize {
        self.inserted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty()
    }

    pub fn plane_count(&self) -> usize {
        self.inserted
            .iter()
            .filter(|(_, kind)| matches!(kind, ShapeKind::Plane { .. }))
            .count()
    }

    pub fn mesh_count(&self) -> usize {
        self.inserted
            .iter()
            .filter(|(_, kind)| matches!(kind, ShapeKind::Mesh))
            .count()
    }

    /// World pose of an inserted collider.
    pub fn collider_pose(&self, handle: ColliderHandle) -> Option<&Isometry3<f32>> {
        self.colliders.get(handle).map(|c| c.position())
    }

    /// Drop all geometry. Used when a level is rebuilt wholesale.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Update broad/narrow phases so scene queries see every inserted collider.
    ///
    /// In Rapier 0.31, we can run collision-detection only (no dynamics) using `CollisionPipeline`.
    pub fn refresh(&mut self) {
        let mut collision_pipeline = CollisionPipeline::new();
        let hooks = ();
        let events = ();
        collision_pipeline.step(
            0.0,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &hooks,
            &events,
        );
    }

    /// Borrowed `QueryPipeline` view for scene queries. Call [`Self::refresh`] after the
    /// last insertion.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    /// Distance down to the first static surface below `(x, from_y, z)`, if any.
    pub fn drop_distance(&self, x: f32, from_y: f32, z: f32, max_dist: f32) -> Option<f32> {
        let ray = Ray::new(point![x, from_y, z], vector![0.0, -1.0, 0.0]);
        self.query_pipeline(QueryFilter::default())
            .cast_ray(&ray, max_dist, true)
            .map(|(_, toi)| toi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{build_mesh_collider, ground_plane_collider};
    use crate::placement::rotation_gap;
    use crate::{AssetLibrary, AssetResolver};

    #[test]
    fn ground_plane_stops_a_downward_ray_at_zero() {
        let mut world = StaticPhysicsWorld::new();
        world.insert_static(ground_plane_collider());
        world.refresh();

        let toi = world.drop_distance(50.0, 10.0, 50.0, 100.0).unwrap();
        assert!((toi - 10.0).abs() < 1.0e-4);
    }

    #[test]
    fn inserted_collider_keeps_the_corrected_pose() {
        let assets = AssetLibrary::builtin().unwrap();
        let pose = Isometry3::translation(20.0, 0.0, 0.0);
        let collider = build_mesh_collider("gate", assets.triangles("gate").unwrap(), &pose).unwrap();
        let expected = *collider.pose();

        let mut world = StaticPhysicsWorld::new();
        let handle = world.insert_static(collider);

        let actual = world.collider_pose(handle).unwrap();
        assert!((actual.translation.vector - expected.translation.vector).norm() < 1.0e-6);
        assert!(rotation_gap(&actual.rotation, &expected.rotation) < 1.0e-6);
        assert_eq!(world.mesh_count(), 1);
        assert_eq!(world.plane_count(), 0);
    }

    #[test]
    fn upright_gate_lintel_is_hit_from_above() {
        // With the correction the 12m-tall gate stands up along +Y.
        let assets = AssetLibrary::builtin().unwrap();
        let pose = Isometry3::translation(20.0, 0.0, 0.0);
        let mut world = StaticPhysicsWorld::new();
        world.insert_static(ground_plane_collider());
        world.insert_static(
            build_mesh_collider("gate", assets.triangles("gate").unwrap(), &pose).unwrap(),
        );
        world.refresh();

        // Straight down through the lintel center: top face at y = 12.
        let toi = world.drop_distance(20.0, 30.0, 0.0, 100.0).unwrap();
        assert!((toi - 18.0).abs() < 1.0e-3, "toi = {toi}");
    }

    #[test]
    fn clear_drops_everything() {
        let mut world = StaticPhysicsWorld::new();
        world.insert_static(ground_plane_collider());
        world.clear();
        assert!(world.is_empty());
        assert_eq!(world.colliders.len(), 0);
    }
}

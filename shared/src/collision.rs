//! Collision shape factory.
//!
//! Turns an asset's raw triangles plus a placement pose into a static collider, or builds
//! the ground's infinite plane. Both roles build every collider through this module, which
//! is what keeps their physics identical.
//!
//! Conventions
//! - Units are meters, rotations are unit quaternions, scale is always 1.
//! - Mesh colliders get the fixed authoring-to-physics correction (see
//!   [`COLLISION_MESH_CORRECTION_DEG`]) post-multiplied onto the rotation. Translation is
//!   never touched, and the correction is applied once per build.
//! - Planes are given explicitly by normal and offset and are never corrected.

use std::fmt;

use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion, Vector3};
use rapier3d::parry::bounding_volume::Aabb;
use rapier3d::prelude::{Collider, ColliderBuilder, SharedShape};

use crate::{
    COLLISION_MESH_CORRECTION_DEG, DEGENERATE_AREA_EPS, GROUND_HEIGHT, LevelError, LevelResult,
    MeshTriangles,
};

/// Which kind of static shape a collider holds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeKind {
    /// Infinite plane `normal . x = offset`.
    Plane {
        normal: Unit<Vector3<f32>>,
        offset: f32,
    },
    /// BVH-backed triangle mesh.
    Mesh,
}

/// A collision shape plus its world pose, ready for insertion into the physics world.
#[derive(Clone)]
pub struct StaticCollider {
    kind: ShapeKind,
    shape: SharedShape,
    pose: Isometry3<f32>,
}

impl StaticCollider {
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn shape(&self) -> &SharedShape {
        &self.shape
    }

    /// World pose of the shape. For mesh colliders this already includes the correction.
    pub fn pose(&self) -> &Isometry3<f32> {
        &self.pose
    }

    /// World-space bounding volume.
    pub fn aabb(&self) -> Aabb {
        self.shape.compute_aabb(&self.pose)
    }

    /// Collider with identity local transform; the pose goes on the parent fixed body.
    pub(crate) fn to_collider(&self) -> Collider {
        ColliderBuilder::new(self.shape.clone()).build()
    }
}

impl fmt::Debug for StaticCollider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCollider")
            .field("kind", &self.kind)
            .field("pose", &self.pose)
            .finish_non_exhaustive()
    }
}

/// The fixed rotation reconciling Z-up authored meshes with the Y-up physics world.
pub fn mesh_correction() -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), COLLISION_MESH_CORRECTION_DEG.to_radians())
}

/// `pose` with the mesh correction applied in local space. Translation is unchanged.
pub fn corrected_pose(pose: &Isometry3<f32>) -> Isometry3<f32> {
    Isometry3::from_parts(pose.translation, pose.rotation * mesh_correction())
}

/// Reject poses with NaN/Inf before they reach the physics world.
pub fn validate_pose(pose: &Isometry3<f32>) -> LevelResult<()> {
    let finite = pose.translation.vector.iter().all(|v| v.is_finite())
        && pose.rotation.coords.iter().all(|v| v.is_finite());
    if !finite {
        return Err(LevelError::transform(format!("non-finite pose {pose}")));
    }
    Ok(())
}

/// Check that `triangles` can back a mesh collider.
pub fn validate_triangles(asset_id: &str, triangles: &MeshTriangles) -> LevelResult<()> {
    if triangles.vertices.is_empty() {
        return Err(LevelError::geometry(asset_id, "no vertices"));
    }
    if triangles.indices.is_empty() {
        return Err(LevelError::geometry(asset_id, "no triangles"));
    }
    if let Some(p) = triangles
        .vertices
        .iter()
        .find(|p| !p.coords.iter().all(|v| v.is_finite()))
    {
        return Err(LevelError::geometry(asset_id, format!("non-finite vertex {p}")));
    }

    let n = triangles.vertices.len();
    let mut non_degenerate = 0usize;
    for (t, tri) in triangles.indices.iter().enumerate() {
        if let Some(&i) = tri.iter().find(|&&i| i as usize >= n) {
            return Err(LevelError::geometry(
                asset_id,
                format!("triangle {t} references vertex {i}, but only {n} exist"),
            ));
        }
        let [a, b, c] = tri.map(|i| triangles.vertices[i as usize]);
        if (b - a).cross(&(c - a)).norm() > DEGENERATE_AREA_EPS {
            non_degenerate += 1;
        }
    }
    if non_degenerate == 0 {
        return Err(LevelError::geometry(asset_id, "every triangle has zero area"));
    }
    Ok(())
}

/// Build a mesh collider for one structure instance.
///
/// `pose` is the logical placement. The returned collider's pose is
/// [`corrected_pose`]`(pose)`.
pub fn build_mesh_collider(
    asset_id: &str,
    triangles: &MeshTriangles,
    pose: &Isometry3<f32>,
) -> LevelResult<StaticCollider> {
    validate_pose(pose)?;
    validate_triangles(asset_id, triangles)?;

    let shape = SharedShape::trimesh(triangles.vertices.clone(), triangles.indices.clone())
        .map_err(|e| LevelError::geometry(asset_id, format!("trimesh rejected: {e:?}")))?;

    Ok(StaticCollider {
        kind: ShapeKind::Mesh,
        shape,
        pose: corrected_pose(pose),
    })
}

/// Infinite plane `normal . x = offset`. No correction is applied.
pub fn plane_collider(normal: Unit<Vector3<f32>>, offset: f32) -> LevelResult<StaticCollider> {
    if !offset.is_finite() || !normal.iter().all(|v| v.is_finite()) {
        return Err(LevelError::transform(format!(
            "non-finite plane normal {normal:?} / offset {offset}"
        )));
    }
    // Place the half-space at `normal * offset`, as in the plane mapping for world statics.
    let pose = Isometry3::from_parts(
        Translation3::from(normal.into_inner() * offset),
        UnitQuaternion::identity(),
    );
    Ok(StaticCollider {
        kind: ShapeKind::Plane { normal, offset },
        shape: SharedShape::halfspace(normal),
        pose,
    })
}

/// The ground: up-facing plane at [`GROUND_HEIGHT`].
pub fn ground_plane_collider() -> StaticCollider {
    StaticCollider {
        kind: ShapeKind::Plane {
            normal: Vector3::y_axis(),
            offset: GROUND_HEIGHT,
        },
        shape: SharedShape::halfspace(Vector3::y_axis()),
        pose: Isometry3::translation(0.0, GROUND_HEIGHT, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::rotation_gap;
    use nalgebra::Point3;

    fn unit_square() -> MeshTriangles {
        MeshTriangles::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    fn approx_aabb(a: &Aabb, b: &Aabb) -> bool {
        (a.mins - b.mins).norm() < 1.0e-6 && (a.maxs - b.maxs).norm() < 1.0e-6
    }

    #[test]
    fn identity_pose_yields_minus_90_about_x() {
        let c = build_mesh_collider("square", &unit_square(), &Isometry3::identity()).unwrap();
        let expected = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -90f32.to_radians());
        assert!(rotation_gap(&c.pose().rotation, &expected) < 1.0e-6);
        assert_eq!(c.kind(), ShapeKind::Mesh);

        // Authored +Z (height) maps to world +Y.
        let up = c.pose().rotation * Vector3::z();
        assert!((up - Vector3::y()).norm() < 1.0e-6);
    }

    #[test]
    fn correction_leaves_translation_untouched() {
        let pose = Isometry3::new(Vector3::new(20.0, 0.0, 35.0), Vector3::y() * 1.2);
        let c = build_mesh_collider("square", &unit_square(), &pose).unwrap();
        assert_eq!(c.pose().translation, pose.translation);
        assert!(rotation_gap(&c.pose().rotation, &(pose.rotation * mesh_correction())) < 1.0e-6);
    }

    #[test]
    fn correction_is_not_cumulative() {
        let pose = Isometry3::new(Vector3::new(1.0, 0.0, 2.0), Vector3::x() * 0.4);
        let first = build_mesh_collider("square", &unit_square(), &pose).unwrap();
        let second = build_mesh_collider("square", &unit_square(), &pose).unwrap();
        assert_eq!(first.pose().rotation, second.pose().rotation);
    }

    #[test]
    fn same_inputs_give_equal_bounding_volumes() {
        let pose = Isometry3::new(Vector3::new(120.0, 0.0, 80.0), Vector3::new(0.3, 1.1, -0.7));
        let a = build_mesh_collider("square", &unit_square(), &pose).unwrap();
        let b = build_mesh_collider("square", &unit_square(), &pose).unwrap();
        assert!(approx_aabb(&a.aabb(), &b.aabb()));
    }

    #[test]
    fn ground_plane_is_up_and_uncorrected() {
        let ground = ground_plane_collider();
        match ground.kind() {
            ShapeKind::Plane { normal, offset } => {
                assert_eq!(normal.into_inner(), Vector3::new(0.0, 1.0, 0.0));
                assert_eq!(offset, 0.0);
            }
            ShapeKind::Mesh => panic!("ground must be a plane"),
        }
        assert_eq!(ground.pose().rotation, UnitQuaternion::identity());
    }

    #[test]
    fn plane_collider_places_half_space_along_normal() {
        let c = plane_collider(Vector3::y_axis(), 3.0).unwrap();
        assert_eq!(c.pose().translation.vector, Vector3::new(0.0, 3.0, 0.0));
        assert!(plane_collider(Vector3::y_axis(), f32::INFINITY).is_err());
    }

    #[test]
    fn empty_mesh_is_geometry_error() {
        let empty = MeshTriangles::new(Vec::new(), Vec::new());
        let err = build_mesh_collider("void", &empty, &Isometry3::identity()).unwrap_err();
        assert!(matches!(err, LevelError::Geometry { asset_id, .. } if asset_id == "void"));
    }

    #[test]
    fn out_of_range_index_is_geometry_error() {
        let mut mesh = unit_square();
        mesh.indices.push([0, 1, 9]);
        assert!(matches!(
            build_mesh_collider("square", &mesh, &Isometry3::identity()),
            Err(LevelError::Geometry { .. })
        ));
    }

    #[test]
    fn zero_area_mesh_is_geometry_error() {
        let flat = MeshTriangles::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 0, 1]],
        );
        assert!(matches!(
            build_mesh_collider("line", &flat, &Isometry3::identity()),
            Err(LevelError::Geometry { .. })
        ));
    }

    #[test]
    fn non_finite_pose_is_transform_error() {
        let pose = Isometry3::translation(f32::NAN, 0.0, 0.0);
        assert!(matches!(
            build_mesh_collider("square", &unit_square(), &pose),
            Err(LevelError::InvalidTransform { .. })
        ));
    }
}

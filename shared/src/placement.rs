//! Placement records and the authoritative placement generator.
//!
//! A [`PlacementRecord`] is the unit of synchronization: asset id plus logical pose
//! (translation and rotation, scale fixed at 1). Records hold the pose *before* the
//! collision mesh correction; both roles re-apply it when building colliders.

use nalgebra::{Isometry3, Matrix3, Matrix4, Quaternion, Rotation3, Translation3, UnitQuaternion, Vector3};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::{
    AssetResolver, LevelError, LevelResult, TRANSFORM_EPS, WorldBounds,
    collision::{build_mesh_collider, validate_pose},
    physics::StaticPhysicsWorld,
};

/// One placed structure. Immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementRecord {
    asset_id: String,
    pose: Isometry3<f32>,
}

impl PlacementRecord {
    pub fn new(asset_id: impl Into<String>, pose: Isometry3<f32>) -> LevelResult<Self> {
        validate_pose(&pose)?;
        Ok(Self {
            asset_id: asset_id.into(),
            pose,
        })
    }

    /// Build from raw components. `rotation` is `(x, y, z, w)` and must already be unit
    /// length (within tolerance); it is renormalized, never rescued from garbage.
    pub fn from_components(
        asset_id: impl Into<String>,
        translation: [f32; 3],
        rotation: [f32; 4],
    ) -> LevelResult<Self> {
        if !translation.iter().chain(rotation.iter()).all(|v| v.is_finite()) {
            return Err(LevelError::transform(format!(
                "non-finite components t={translation:?} q={rotation:?}"
            )));
        }
        let [x, y, z, w] = rotation;
        let q = Quaternion::new(w, x, y, z);
        let norm = q.norm();
        if (norm - 1.0).abs() > TRANSFORM_EPS {
            return Err(LevelError::transform(format!(
                "rotation quaternion has norm {norm}, expected 1"
            )));
        }
        let [tx, ty, tz] = translation;
        Self::new(
            asset_id,
            Isometry3::from_parts(
                Translation3::new(tx, ty, tz),
                UnitQuaternion::new_normalize(q),
            ),
        )
    }

    /// Decompose a 4x4 affine matrix into translation + rotation.
    ///
    /// Rejects non-finite entries, a projective bottom row, any scale other than 1, shear
    /// and reflections.
    pub fn from_matrix(asset_id: impl Into<String>, m: &Matrix4<f32>) -> LevelResult<Self> {
        if !m.iter().all(|v| v.is_finite()) {
            return Err(LevelError::transform("non-finite matrix entry"));
        }
        let bottom = m.row(3);
        if bottom[0].abs() > TRANSFORM_EPS
            || bottom[1].abs() > TRANSFORM_EPS
            || bottom[2].abs() > TRANSFORM_EPS
            || (bottom[3] - 1.0).abs() > TRANSFORM_EPS
        {
            return Err(LevelError::transform(format!("projective bottom row {bottom}")));
        }

        let r: Matrix3<f32> = m.fixed_view::<3, 3>(0, 0).into_owned();
        let deviation = (r.transpose() * r - Matrix3::identity()).abs().max();
        if deviation > TRANSFORM_EPS {
            return Err(LevelError::transform(format!(
                "upper 3x3 is not a rotation (scale or shear, deviation {deviation})"
            )));
        }
        if r.determinant() <= 0.0 {
            return Err(LevelError::transform("reflection in upper 3x3"));
        }

        let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r));
        let translation = Translation3::from(Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]));
        Self::new(asset_id, Isometry3::from_parts(translation, rotation))
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn pose(&self) -> &Isometry3<f32> {
        &self.pose
    }

    pub fn translation(&self) -> Vector3<f32> {
        self.pose.translation.vector
    }

    pub fn rotation(&self) -> &UnitQuaternion<f32> {
        &self.pose.rotation
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        self.pose.to_homogeneous()
    }

    /// Same asset and pose within `eps` (meters for translation, see [`rotation_gap`]).
    pub fn approx_eq(&self, other: &Self, eps: f32) -> bool {
        self.asset_id == other.asset_id
            && (self.translation() - other.translation()).norm() <= eps
            && rotation_gap(self.rotation(), other.rotation()) <= eps
    }
}

/// Distance between two rotations as the chord between their quaternions, taking the
/// shorter of `q` and `-q`. Stable near zero, unlike the angle.
pub fn rotation_gap(a: &UnitQuaternion<f32>, b: &UnitQuaternion<f32>) -> f32 {
    let (a, b) = (a.coords, b.coords);
    (a - b).norm().min((a + b).norm())
}

/// Rotation from Euler angles in degrees, composed yaw (about Y), then pitch (about X),
/// then roll (about Z): `Ry(yaw) * Rx(pitch) * Rz(roll)`.
pub fn euler_rotation(yaw_deg: f32, pitch_deg: f32, roll_deg: f32) -> UnitQuaternion<f32> {
    let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw_deg.to_radians());
    let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), pitch_deg.to_radians());
    let roll = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), roll_deg.to_radians());
    yaw * pitch * roll
}

fn sample_axis<R: Rng>(rng: &mut R, extent: f32) -> f32 {
    if extent > 0.0 {
        rng.gen_range(0.0..extent)
    } else {
        0.0
    }
}

/// Randomly place `count` structures and insert their colliders.
///
/// Records come back in generation order, which is also collider insertion order. On
/// error, colliders inserted for earlier records stay in `physics`; the caller discards
/// the whole world.
pub fn generate_placements<R: Rng>(
    rng: &mut R,
    count: u32,
    catalog: &[String],
    bounds: &WorldBounds,
    assets: &impl AssetResolver,
    physics: &mut StaticPhysicsWorld,
) -> LevelResult<Vec<PlacementRecord>> {
    bounds.validate()?;
    if count == 0 {
        return Ok(Vec::new());
    }
    if catalog.is_empty() {
        return Err(LevelError::InvalidConfig(format!(
            "cannot place {count} structures from an empty catalog"
        )));
    }

    let mut records = Vec::with_capacity(count as usize);
    for i in 0..count {
        let x = sample_axis(rng, bounds.width);
        let z = sample_axis(rng, bounds.depth);
        let yaw = rng.gen_range(0.0..360.0);
        let pitch = rng.gen_range(0.0..360.0);
        let roll = rng.gen_range(0.0..360.0);
        let Some(asset_id) = catalog.choose(rng) else {
            return Err(LevelError::InvalidConfig("empty catalog".into()));
        };

        let pose = Isometry3::from_parts(
            Translation3::new(x, 0.0, z),
            euler_rotation(yaw, pitch, roll),
        );
        let collider = build_mesh_collider(asset_id, assets.triangles(asset_id)?, &pose)?;
        physics.insert_static(collider);

        log::debug!(
            "placed #{i} `{asset_id}` at ({x:.2}, 0, {z:.2}) yaw={yaw:.1} pitch={pitch:.1} roll={roll:.1}"
        );
        records.push(PlacementRecord::new(asset_id.clone(), pose)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AssetLibrary, collision::mesh_correction};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn catalog(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn generates_exactly_count_records_and_colliders() {
        let assets = AssetLibrary::builtin().unwrap();
        let mut physics = StaticPhysicsWorld::new();
        let mut rng = StdRng::seed_from_u64(11);
        let records = generate_placements(
            &mut rng,
            5,
            &catalog(&["gate", "strange-ramp2"]),
            &WorldBounds::new(400.0, 400.0),
            &assets,
            &mut physics,
        )
        .unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(physics.mesh_count(), 5);
        for r in &records {
            let t = r.translation();
            assert!((0.0..400.0).contains(&t.x) && (0.0..400.0).contains(&t.z));
            assert_eq!(t.y, 0.0);
        }
    }

    #[test]
    fn zero_count_is_empty_without_touching_physics() {
        let assets = AssetLibrary::builtin().unwrap();
        let mut physics = StaticPhysicsWorld::new();
        let mut rng = StdRng::seed_from_u64(0);
        let records =
            generate_placements(&mut rng, 0, &[], &WorldBounds::default(), &assets, &mut physics)
                .unwrap();
        assert!(records.is_empty());
        assert!(physics.is_empty());
    }

    #[test]
    fn empty_catalog_with_count_is_config_error() {
        let assets = AssetLibrary::builtin().unwrap();
        let mut physics = StaticPhysicsWorld::new();
        let mut rng = StdRng::seed_from_u64(0);
        let err = generate_placements(&mut rng, 2, &[], &WorldBounds::default(), &assets, &mut physics)
            .unwrap_err();
        assert!(matches!(err, LevelError::InvalidConfig(_)));
    }

    #[test]
    fn degenerate_axis_samples_zero() {
        let assets = AssetLibrary::builtin().unwrap();
        let mut physics = StaticPhysicsWorld::new();
        let mut rng = StdRng::seed_from_u64(3);
        let records = generate_placements(
            &mut rng,
            3,
            &catalog(&["gate"]),
            &WorldBounds::new(0.0, 50.0),
            &assets,
            &mut physics,
        )
        .unwrap();
        assert!(records.iter().all(|r| r.translation().x == 0.0));
    }

    #[test]
    fn unknown_catalog_entry_is_missing_asset() {
        let assets = AssetLibrary::builtin().unwrap();
        let mut physics = StaticPhysicsWorld::new();
        let mut rng = StdRng::seed_from_u64(3);
        let err = generate_placements(
            &mut rng,
            1,
            &catalog(&["windmill"]),
            &WorldBounds::default(),
            &assets,
            &mut physics,
        )
        .unwrap_err();
        assert!(matches!(err, LevelError::MissingAsset { .. }));
        assert!(physics.is_empty());
    }

    #[test]
    fn same_seed_same_placements() {
        let assets = AssetLibrary::builtin().unwrap();
        let run = |seed| {
            let mut physics = StaticPhysicsWorld::new();
            let mut rng = StdRng::seed_from_u64(seed);
            generate_placements(
                &mut rng,
                4,
                &catalog(&["gate", "strange-ramp2"]),
                &WorldBounds::default(),
                &assets,
                &mut physics,
            )
            .unwrap()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn records_hold_the_uncorrected_pose() {
        let assets = AssetLibrary::builtin().unwrap();
        let mut physics = StaticPhysicsWorld::new();
        let mut rng = StdRng::seed_from_u64(5);
        let records = generate_placements(
            &mut rng,
            1,
            &catalog(&["gate"]),
            &WorldBounds::default(),
            &assets,
            &mut physics,
        )
        .unwrap();

        let (handle, _) = physics.inserted()[0];
        let collider_rot = physics.collider_pose(handle).unwrap().rotation;
        let expected = records[0].rotation() * mesh_correction();
        assert!(rotation_gap(&collider_rot, &expected) < 1.0e-5);
    }

    #[test]
    fn euler_order_is_yaw_pitch_roll() {
        let q = euler_rotation(90.0, 90.0, 0.0);
        // Pitch tips +Z onto -Y, which yaw then leaves alone.
        let v = q * Vector3::z();
        assert!((v - Vector3::new(0.0, -1.0, 0.0)).norm() < 1.0e-5);

        let q = euler_rotation(90.0, 0.0, 0.0);
        let v = q * Vector3::z();
        assert!((v - Vector3::x()).norm() < 1.0e-5);
    }

    #[test]
    fn matrix_round_trip() {
        let pose = Isometry3::from_parts(
            Translation3::new(12.0, 0.0, 340.5),
            euler_rotation(30.0, 200.0, 77.0),
        );
        let record = PlacementRecord::new("gate", pose).unwrap();
        let back = PlacementRecord::from_matrix("gate", &record.to_matrix()).unwrap();
        assert!(back.approx_eq(&record, 1.0e-4));
    }

    #[test]
    fn matrix_with_scale_or_shear_is_rejected() {
        let mut scaled = Matrix4::identity();
        scaled[(0, 0)] = 2.0;
        assert!(matches!(
            PlacementRecord::from_matrix("gate", &scaled),
            Err(LevelError::InvalidTransform { .. })
        ));

        let mut sheared = Matrix4::identity();
        sheared[(0, 1)] = 0.5;
        assert!(PlacementRecord::from_matrix("gate", &sheared).is_err());

        let mut mirrored = Matrix4::identity();
        mirrored[(2, 2)] = -1.0;
        assert!(PlacementRecord::from_matrix("gate", &mirrored).is_err());

        let mut projective = Matrix4::identity();
        projective[(3, 0)] = 0.1;
        assert!(PlacementRecord::from_matrix("gate", &projective).is_err());

        let mut nan = Matrix4::identity();
        nan[(1, 3)] = f32::NAN;
        assert!(PlacementRecord::from_matrix("gate", &nan).is_err());
    }

    #[test]
    fn non_unit_quaternion_is_rejected() {
        assert!(PlacementRecord::from_components("gate", [0.0; 3], [0.0, 0.0, 0.0, 2.0]).is_err());
        assert!(PlacementRecord::from_components("gate", [0.0; 3], [0.0, 0.0, 0.0, 1.0]).is_ok());
    }
}

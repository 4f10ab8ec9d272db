/// A unit quaternion (w + xi + yj + zk), stored as four `f32` scalars.
///
/// Semantics:
/// - Represents a placement orientation in world space.
/// - Stored in `(x, y, z, w)` order, the same order the sync payload uses.
/// - This is a purely data/serialization type; math happens elsewhere.
#[derive(spacetimedb::SpacetimeType, Debug, Clone, Copy, PartialEq)]
pub struct DbQuat {
    /// x component (imaginary i)
    pub x: f32,
    /// y component (imaginary j)
    pub y: f32,
    /// z component (imaginary k)
    pub z: f32,
    /// w component (real part)
    pub w: f32,
}

impl DbQuat {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

impl Default for DbQuat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 4]> for DbQuat {
    fn from([x, y, z, w]: [f32; 4]) -> Self {
        Self { x, y, z, w }
    }
}

impl From<DbQuat> for [f32; 4] {
    fn from(q: DbQuat) -> Self {
        [q.x, q.y, q.z, q.w]
    }
}

impl From<nalgebra::UnitQuaternion<f32>> for DbQuat {
    fn from(uq: nalgebra::UnitQuaternion<f32>) -> Self {
        let q = uq.into_inner();
        DbQuat {
            x: q.i,
            y: q.j,
            z: q.k,
            w: q.w,
        }
    }
}

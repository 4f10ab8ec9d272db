use thiserror::Error;

use crate::level::Role;

/// Errors raised while building a level's static geometry.
///
/// None of these are retried. Every variant aborts construction of the current level:
/// inconsistent static geometry between the authoritative and observing roles is worse
/// than failing loudly.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The requested asset has no loaded mesh or render data.
    #[error("missing asset `{asset_id}`")]
    MissingAsset { asset_id: String },

    /// Triangle data is insufficient to build a collision shape.
    #[error("invalid geometry for `{asset_id}`: {reason}")]
    Geometry { asset_id: String, reason: String },

    /// Non-finite or non-decomposable transform.
    #[error("invalid transform: {reason}")]
    InvalidTransform { reason: String },

    /// An operation restricted to one role was invoked under the other.
    #[error("`{operation}` is not available to the {role} role")]
    RoleViolation { operation: &'static str, role: Role },

    /// Level configuration out of range (bounds, tile size, catalog).
    #[error("invalid level config: {0}")]
    InvalidConfig(String),

    /// RON text (payload, config or asset file) failed to parse.
    #[error("decode error: {0}")]
    Decode(#[from] ron::error::SpannedError),

    /// RON serialization failed.
    #[error("encode error: {0}")]
    Encode(#[from] ron::Error),
}

impl LevelError {
    pub(crate) fn missing(asset_id: &str) -> Self {
        Self::MissingAsset {
            asset_id: asset_id.to_owned(),
        }
    }

    pub(crate) fn geometry(asset_id: &str, reason: impl Into<String>) -> Self {
        Self::Geometry {
            asset_id: asset_id.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn transform(reason: impl Into<String>) -> Self {
        Self::InvalidTransform {
            reason: reason.into(),
        }
    }
}

pub type LevelResult<T> = Result<T, LevelError>;

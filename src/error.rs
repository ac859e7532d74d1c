use crate::Real;
use thiserror::Error;

/// Errors reported by the reconstruction pipeline.
///
/// All failures are reported synchronously at the point where they occur and
/// none are retried internally. There is no partial-result path: a failed
/// assembly or solve never yields a usable field.
#[derive(Copy, Clone, Debug, PartialEq, Error)]
pub enum PoissonError {
    /// An oriented point with exactly these coordinates is already present in
    /// the set. Duplicates signal a malformed or redundant input dataset and
    /// are never silently merged.
    #[error("duplicate oriented point at ({x}, {y}, {z})")]
    DuplicatePoint {
        /// X coordinate of the rejected point.
        x: Real,
        /// Y coordinate of the rejected point.
        y: Real,
        /// Z coordinate of the rejected point.
        z: Real,
    },

    /// A centroid or bounding-box query was made on an empty point set, so
    /// octree construction cannot proceed.
    #[error("operation requires a non-empty point set")]
    EmptySet,

    /// The assembled system is zero-sized or numerically singular; no unique
    /// weight vector exists.
    #[error("the linear system is singular or empty")]
    SingularSystem,
}

/// Convenience result type for reconstruction operations.
pub type Result<T> = std::result::Result<T, PoissonError>;

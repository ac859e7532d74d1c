/*!
Reconstruction of an implicit indicator field from an unorganized set of
oriented surface samples, following the [Poisson surface reconstruction](https://hhoppe.com/poissonrecon.pdf)
approach of Kazhdan, Bolitho and Hoppe: an octree partitions the samples into
cubic cells, a compactly-supported smoothing kernel is attached to every
populated leaf, closed-form integrals of the kernels against the sample
normals assemble a dense linear system, and the solved weights define a
scalar field separating inside from outside.
*/

#![allow(clippy::too_many_arguments)]
#![warn(missing_docs)]

/// Floating-point type used by this library.
pub type Real = f64;

extern crate nalgebra as na;
extern crate parry3d_f64 as parry;

pub use self::dense_solve::solve_dense;
pub use self::error::{PoissonError, Result};
pub use self::octree::{LeafCell, NodeId, Octree, OctreeNode};
pub use self::point_set::{OrientedPoint, OrientedPointSet, SplitPlane};
pub use self::poisson::IndicatorField;
pub use self::system::{assemble_laplacian, assemble_rhs};

pub mod basis;
mod dense_solve;
mod error;
mod octree;
mod point_set;
mod poisson;
mod system;

use crate::dense_solve::solve_dense;
use crate::octree::{LeafCell, Octree};
use crate::point_set::OrientedPointSet;
use crate::system::{assemble_laplacian, assemble_rhs};
use crate::{basis, Real, Result};
use na::{DVector, Point3, Vector3};

/// An indicator field reconstructed from an oriented point set.
///
/// The field is the weighted sum of the compactly-supported kernels of the
/// populated octree leaves; its values separate the inside of the sampled
/// surface from the outside. A field only exists once assembly and solve
/// have both succeeded.
#[derive(Clone, Debug)]
pub struct IndicatorField {
    leaves: Vec<LeafCell>,
    weights: DVector<Real>,
}

impl IndicatorField {
    /// Runs the full reconstruction pipeline: builds the octree over
    /// `points` down to `max_depth`, assembles the linear system from the
    /// sample normals, and solves it for the basis weights.
    pub fn from_point_set(points: OrientedPointSet, max_depth: usize) -> Result<Self> {
        let octree = Octree::new(points, max_depth)?;
        Self::from_octree(&octree)
    }

    /// Assembles and solves the system for an already-built octree.
    pub fn from_octree(octree: &Octree) -> Result<Self> {
        let leaves = octree.populated_leaves();
        let lhs = assemble_laplacian(&leaves);
        let rhs = assemble_rhs(&leaves);
        let weights = solve_dense(lhs, rhs)?;

        Ok(Self {
            leaves: octree.leaf_cells(),
            weights,
        })
    }

    /// Geometry of the populated leaf cells, index-aligned with
    /// [`Self::weights`].
    pub fn leaf_cells(&self) -> &[LeafCell] {
        &self.leaves
    }

    /// The solved basis-weight vector. Only meaningful together with the
    /// leaf ordering of [`Self::leaf_cells`].
    pub fn weights(&self) -> &DVector<Real> {
        &self.weights
    }

    /// Evaluates the indicator field at `pt` as the weighted sum of the
    /// per-leaf kernels. Exactly zero when `pt` lies outside every leaf's
    /// support cube.
    pub fn eval(&self, pt: &Point3<Real>) -> Real {
        self.leaves
            .iter()
            .zip(self.weights.iter())
            .map(|(cell, weight)| *weight * basis::eval(pt, &cell.center, cell.width))
            .sum()
    }

    /// Evaluates the gradient of the indicator field at `pt`.
    pub fn eval_gradient(&self, pt: &Point3<Real>) -> Vector3<Real> {
        self.leaves
            .iter()
            .zip(self.weights.iter())
            .map(|(cell, weight)| basis::eval_gradient(pt, &cell.center, cell.width) * *weight)
            .sum()
    }
}

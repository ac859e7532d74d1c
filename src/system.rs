//! Assembly of the linear system `L x = v` relating the per-leaf basis
//! weights to the sample normals.
//!
//! Entries have no cross dependencies once the leaf list is fixed, so the
//! rows of `v` and the columns of `L` are computed in parallel, each writing
//! only its own output slot.

use crate::basis;
use crate::octree::OctreeNode;
use crate::Real;
use na::{DMatrix, DVector};
use rayon::prelude::*;
use std::f64::consts::PI;

/// Builds the right-hand-side vector `v`, one entry per leaf.
///
/// Entry `i` accumulates, over every leaf `j` and every sample held by `j`,
/// the closed-form integral of leaf `i`'s kernel derivative along the
/// sample's normal, over the overlap of the two support cubes, scaled by
/// `(2π)⁻³ / (wᵢ³ wⱼ⁵)`. Pairs with an empty overlap contribute nothing, as
/// do leaves without samples.
pub fn assemble_rhs(leaves: &[&OctreeNode]) -> DVector<Real> {
    let norm = (2.0 * PI).powi(-3);

    let entries: Vec<Real> = leaves
        .par_iter()
        .map(|o| {
            let o_support = o.support();
            let mut value = 0.0;

            for op in leaves {
                let points = match op.points() {
                    Some(points) if !points.is_empty() => points,
                    _ => continue,
                };

                let domain = match basis::support_overlap(&o_support, &op.support()) {
                    Some(domain) => domain,
                    None => continue,
                };

                let coeff = norm / (o.width().powi(3) * op.width().powi(5));
                for sample in points.iter() {
                    value += coeff
                        * basis::flux_integral(
                            &domain,
                            &o.center(),
                            &op.center(),
                            &sample.normal,
                        );
                }
            }

            value
        })
        .collect();

    DVector::from_vec(entries)
}

/// Builds the dense system matrix `L`, one row and column per leaf.
///
/// Entry `(i, j)` is the closed-form integral of the kernel-overlap term
/// parameterized by leaf `j`, over the overlap of the two support cubes,
/// scaled by `3 · (2π)⁻³ / (wᵢ⁵ wⱼ³)`. The row and column roles are not
/// interchangeable in the normalization, so `L` is not symmetric in general
/// when leaf widths differ; the assembly is kept exactly as formulated
/// rather than symmetrized.
pub fn assemble_laplacian(leaves: &[&OctreeNode]) -> DMatrix<Real> {
    let n = leaves.len();
    if n == 0 {
        return DMatrix::zeros(0, 0);
    }

    let norm = (2.0 * PI).powi(-3);
    let columns: Vec<DVector<Real>> = (0..n)
        .into_par_iter()
        .map(|j| {
            let op = leaves[j];
            let op_support = op.support();

            DVector::from_iterator(
                n,
                leaves.iter().map(|o| {
                    match basis::support_overlap(&o.support(), &op_support) {
                        Some(domain) => {
                            let coeff = 3.0 * norm / (o.width().powi(5) * op.width().powi(3));
                            coeff * basis::overlap_integral(&domain, &op.center(), op.width())
                        }
                        None => 0.0,
                    }
                }),
            )
        })
        .collect();

    DMatrix::from_columns(&columns)
}

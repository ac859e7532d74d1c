//! The smoothing kernel attached to each leaf cell and the closed-form
//! definite integrals used to assemble the linear system.
//!
//! Each populated leaf carries an isotropic, compactly-supported radial
//! profile centered on the cell and scaled by its width, identically zero
//! outside the cube of side `width`. The system assembly needs two triple
//! integrals over the axis-aligned overlap of two cells' support cubes: the
//! kernel gradient dotted with a sample normal (for the right-hand side) and
//! the kernel overlap (for the matrix). Both are evaluated exactly as the
//! alternating sum of a closed-form antiderivative at the 8 corners of the
//! overlap box, so no numerical quadrature is involved.

use crate::Real;
use itertools::iproduct;
use na::{Point3, Vector3};
use parry::bounding_volume::Aabb;
use std::f64::consts::PI;

/// Evaluates the kernel of a cell with the given `center` and `width` at
/// `pt`. Exactly zero when `pt` lies outside the open support cube on any
/// axis.
pub fn eval(pt: &Point3<Real>, center: &Point3<Real>, width: Real) -> Real {
    let d = pt - center;
    let half = width / 2.0;

    if d.x.abs() < half && d.y.abs() < half && d.z.abs() < half {
        (2.0 * PI).powf(-1.5) / width.powi(3)
            * (1.0 - d.norm_squared() / (2.0 * width * width))
    } else {
        0.0
    }
}

/// Gradient of [`eval`] with respect to `pt`. Zero outside the open support
/// cube.
pub fn eval_gradient(pt: &Point3<Real>, center: &Point3<Real>, width: Real) -> Vector3<Real> {
    let d = pt - center;
    let half = width / 2.0;

    if d.x.abs() < half && d.y.abs() < half && d.z.abs() < half {
        d * (-(2.0 * PI).powf(-1.5) / width.powi(5))
    } else {
        Vector3::zeros()
    }
}

/// The support cube of a cell's kernel: the axis-aligned cube of side
/// `width` around `center`.
pub fn support_cube(center: &Point3<Real>, width: Real) -> Aabb {
    Aabb::from_half_extents(*center, Vector3::repeat(width / 2.0))
}

/// Axis-aligned intersection of two support cubes, computed independently
/// per coordinate as `[max(mins), min(maxs)]`. Returns `None` when any axis
/// yields an empty interval (`min ≥ max`): cells that merely touch along a
/// face or edge do not overlap.
pub fn support_overlap(a: &Aabb, b: &Aabb) -> Option<Aabb> {
    let mins = a.mins.sup(&b.mins);
    let maxs = a.maxs.inf(&b.maxs);

    if mins.x < maxs.x && mins.y < maxs.y && mins.z < maxs.z {
        Some(Aabb::new(mins, maxs))
    } else {
        None
    }
}

/// Alternating sum of `f` over the 8 corners of `domain`: the definite
/// triple integral of the mixed third derivative of `f`, by
/// inclusion–exclusion. Exact to floating-point precision.
fn corner_sum(domain: &Aabb, f: impl Fn(Real, Real, Real) -> Real) -> Real {
    let mut total = 0.0;

    for (i, j, k) in iproduct!(0..2, 0..2, 0..2) {
        let x = if i == 0 { domain.mins.x } else { domain.maxs.x };
        let y = if j == 0 { domain.mins.y } else { domain.maxs.y };
        let z = if k == 0 { domain.mins.z } else { domain.maxs.z };
        // Positive sign when an odd number of upper bounds is selected.
        let sign = if (i + j + k) % 2 == 1 { 1.0 } else { -1.0 };
        total += sign * f(x, y, z);
    }

    total
}

/// Antiderivative of the directional derivative of the kernel at `oc`,
/// taken along the normal `n` of a sample held by the cell at `ocp`.
fn flux_antiderivative(
    x: Real,
    y: Real,
    z: Real,
    oc: &Point3<Real>,
    ocp: &Point3<Real>,
    n: &Vector3<Real>,
) -> Real {
    let (ocx, ocy, ocz) = (oc.x, oc.y, oc.z);
    let (opx, opy, opz) = (ocp.x, ocp.y, ocp.z);
    let (nx, ny, nz) = (n.x, n.y, n.z);
    let oc_sq = ocx * ocx + ocy * ocy + ocz * ocz;
    let ndotp = opx * nx + opy * ny + opz * nz;

    -(1.0 / 24.0)
        * x
        * y
        * z
        * (12.0 * (oc_sq - 2.0) * ndotp
            - 6.0 * ((2.0 * opx * ocx + oc_sq - 2.0) * nx + 2.0 * ocx * (opy * ny + opz * nz)) * x
            + 4.0 * (ndotp + 2.0 * ocx * nx) * x * x
            - 3.0 * nx * x * x * x
            - 6.0
                * (2.0 * opx * ocy * nx
                    + (oc_sq + 2.0 * opy * ocy - 2.0) * ny
                    + 2.0 * opz * ocy * nz)
                * y
            + 6.0 * (ocy * nx + ocx * ny) * x * y
            - 2.0 * ny * x * x * y
            + 4.0 * (ndotp + 2.0 * ocy * ny) * y * y
            - 2.0 * nx * x * y * y
            - 3.0 * ny * y * y * y
            - 6.0
                * (2.0 * opx * ocz * nx
                    + 2.0 * opy * ocz * ny
                    + (oc_sq + 2.0 * opz * ocz - 2.0) * nz)
                * z
            + 6.0 * (ocz * nx + ocx * nz) * x * z
            - 2.0 * nz * x * x * z
            + 6.0 * (ocz * ny + ocy * nz) * y * z
            - 2.0 * nz * y * y * z
            + 4.0 * (ndotp + 2.0 * ocz * nz) * z * z
            - 2.0 * nx * x * z * z
            - 2.0 * ny * y * z * z
            - 3.0 * nz * z * z * z)
}

/// Definite triple integral, over `domain`, of the directional derivative of
/// the kernel centered at `oc`, taken along the sample normal `n`, paired
/// with the cell centered at `ocp`. Used for the right-hand-side vector.
pub fn flux_integral(
    domain: &Aabb,
    oc: &Point3<Real>,
    ocp: &Point3<Real>,
    n: &Vector3<Real>,
) -> Real {
    corner_sum(domain, |x, y, z| flux_antiderivative(x, y, z, oc, ocp, n))
}

/// Antiderivative of the overlap of two kernel profiles, parameterized by
/// the second cell's center `ocp` and width `width`.
fn overlap_antiderivative(x: Real, y: Real, z: Real, ocp: &Point3<Real>, width: Real) -> Real {
    let q_sq = x * x + y * y + z * z;
    let p_sq = ocp.x * ocp.x + ocp.y * ocp.y + ocp.z * ocp.z;

    1.0 / (6.0 * width * width)
        * (x * y * z)
        * (q_sq - 3.0 * (ocp.x * x + ocp.y * y + ocp.z * z) + 3.0 * p_sq - 6.0 * width * width)
}

/// Definite triple integral, over `domain`, of the kernel-overlap term
/// parameterized by the cell centered at `ocp` with the given `width`. Used
/// for the system matrix.
pub fn overlap_integral(domain: &Aabb, ocp: &Point3<Real>, width: Real) -> Real {
    corner_sum(domain, |x, y, z| {
        overlap_antiderivative(x, y, z, ocp, width)
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use na::{point, vector};

    #[test]
    fn flux_integral_matches_reference_value() {
        let domain = Aabb::new(point![-1.0, 1.0, -2.0], point![1.0, 2.0, -1.0]);
        let value = flux_integral(
            &domain,
            &point![1.0, 2.0, 4.0],
            &point![1.0, 5.0, 1.0],
            &vector![5.0, 7.0, 9.0],
        );
        assert_relative_eq!(value, -1572.166_666_666_666_7, epsilon = 1.0e-9);
    }

    #[test]
    fn overlap_antiderivative_matches_reference_values() {
        assert_relative_eq!(
            overlap_antiderivative(3.0, 2.0, 11.0, &point![1.0, 2.0, 1.0], 2.0),
            203.5,
            epsilon = 1.0e-12
        );
        assert_relative_eq!(
            overlap_antiderivative(8.0, 1.0, 2.0, &point![4.0, 3.0, 6.0], 5.0),
            -4.16,
            epsilon = 1.0e-12
        );
    }

    #[test]
    fn integrals_over_genuine_overlap() {
        // Cells of different widths whose cubes properly intersect.
        let a = support_cube(&point![0.0, 0.0, 0.0], 2.0);
        let b = support_cube(&point![0.5, 0.25, -0.25], 1.0);
        let domain = support_overlap(&a, &b).unwrap();
        assert_relative_eq!(domain.mins, point![0.0, -0.25, -0.75], epsilon = 1.0e-12);
        assert_relative_eq!(domain.maxs, point![1.0, 0.75, 0.25], epsilon = 1.0e-12);

        let flux = flux_integral(
            &domain,
            &point![0.0, 0.0, 0.0],
            &point![0.5, 0.25, -0.25],
            &vector![1.0, 2.0, -0.5],
        );
        assert_relative_eq!(flux, 0.093_75, epsilon = 1.0e-9);

        let overlap = overlap_integral(&domain, &point![0.5, 0.25, -0.25], 1.0);
        assert_relative_eq!(overlap, -0.875, epsilon = 1.0e-9);
    }

    #[test]
    fn self_flux_cancels_by_symmetry() {
        // The directional-derivative integrand is odd around the cell
        // center, so the integral over a cell's own cube vanishes.
        for (center, width) in [
            (point![0.3, -0.2, 0.7], 0.8),
            (point![2.0, 1.0, -3.0], 0.5),
            (point![0.0, 0.0, 0.0], 1.0),
        ] {
            let cube = support_cube(&center, width);
            let value = flux_integral(&cube, &center, &center, &vector![1.0, 2.0, 3.0]);
            assert_abs_diff_eq!(value, 0.0, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn overlap_domain_rules() {
        // Same per-axis intervals as the reference checks: centers 2 and 3
        // with widths 4 and 2 overlap on [2, 4]; centers 2 and 6 do not.
        let a = support_cube(&point![2.0, 2.0, 2.0], 4.0);
        let b = support_cube(&point![3.0, 3.0, 3.0], 2.0);
        let overlap = support_overlap(&a, &b).unwrap();
        assert_relative_eq!(overlap.mins, point![2.0, 2.0, 2.0], epsilon = 1.0e-12);
        assert_relative_eq!(overlap.maxs, point![4.0, 4.0, 4.0], epsilon = 1.0e-12);

        let c = support_cube(&point![6.0, 3.0, 3.0], 2.0);
        assert!(support_overlap(&a, &c).is_none());

        // Cells touching along a face do not overlap.
        let d = support_cube(&point![0.0, 0.0, 0.0], 1.0);
        let e = support_cube(&point![1.0, 0.0, 0.0], 1.0);
        assert!(support_overlap(&d, &e).is_none());
    }

    #[test]
    fn kernel_support_is_strict() {
        let center = point![1.0, 1.0, 1.0];
        let width = 2.0;

        let at_center = eval(&center, &center, width);
        assert_relative_eq!(
            at_center,
            (2.0 * PI).powf(-1.5) / 8.0,
            epsilon = 1.0e-12
        );

        // On the face of the support cube and beyond: exactly zero.
        assert_eq!(eval(&point![2.0, 1.0, 1.0], &center, width), 0.0);
        assert_eq!(eval(&point![3.0, 1.0, 1.0], &center, width), 0.0);
        assert_eq!(
            eval_gradient(&point![2.0, 1.0, 1.0], &center, width),
            Vector3::zeros()
        );

        // Just inside: positive, with gradient pointing back to the center.
        let inside = point![1.9, 1.0, 1.0];
        assert!(eval(&inside, &center, width) > 0.0);
        assert!(eval_gradient(&inside, &center, width).x < 0.0);
    }
}

use crate::{PoissonError, Real, Result};
use na::{Point3, Vector3};
use parry::bounding_volume::Aabb;

/// A surface sample: a position together with the surface normal at that
/// position. The normal is stored as provided and never renormalized.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-serialize",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct OrientedPoint {
    /// Sample position.
    pub position: Point3<Real>,
    /// Surface normal at the sample.
    pub normal: Vector3<Real>,
}

impl OrientedPoint {
    /// Creates a sample from a position and a normal.
    pub fn new(position: Point3<Real>, normal: Vector3<Real>) -> Self {
        Self { position, normal }
    }

    /// Exact coordinate equality on positions. Normals are ignored: two
    /// samples at the same location are duplicates even if their normals
    /// differ.
    pub fn same_position(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

/// One of the three axis-aligned splitting planes through a point.
///
/// The coordinate compared when partitioning is the one orthogonal to the
/// plane: `Xy` compares z, `Xz` compares y, `Yz` compares x.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SplitPlane {
    /// The xy-plane; partitions along z.
    Xy,
    /// The xz-plane; partitions along y.
    Xz,
    /// The yz-plane; partitions along x.
    Yz,
}

impl SplitPlane {
    fn orthogonal_axis(self) -> usize {
        match self {
            SplitPlane::Xy => 2,
            SplitPlane::Xz => 1,
            SplitPlane::Yz => 0,
        }
    }
}

/// An ordered collection of oriented samples, unique under positional
/// equality. Insertion order is irrelevant to reconstruction results.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrientedPointSet {
    points: Vec<OrientedPoint>,
}

impl OrientedPointSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sample, rejecting it if a sample with identical coordinates
    /// is already present.
    pub fn add(&mut self, pt: OrientedPoint) -> Result<()> {
        if self.points.iter().any(|other| other.same_position(&pt)) {
            return Err(PoissonError::DuplicatePoint {
                x: pt.position.x,
                y: pt.position.y,
                z: pt.position.z,
            });
        }
        self.points.push(pt);
        Ok(())
    }

    /// Number of samples in the set.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Does the set hold no samples?
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over the samples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &OrientedPoint> {
        self.points.iter()
    }

    /// The samples as a slice, in insertion order.
    pub fn points(&self) -> &[OrientedPoint] {
        &self.points
    }

    /// Arithmetic mean of the sample positions.
    pub fn centroid(&self) -> Result<Point3<Real>> {
        if self.points.is_empty() {
            return Err(PoissonError::EmptySet);
        }
        let sum: Vector3<Real> = self.points.iter().map(|pt| pt.position.coords).sum();
        Ok(Point3::from(sum / self.points.len() as Real))
    }

    /// Tight axis-aligned bounding box of the sample positions.
    pub fn bounding_box(&self) -> Result<Aabb> {
        if self.points.is_empty() {
            return Err(PoissonError::EmptySet);
        }
        Ok(Aabb::from_points(
            self.points.iter().map(|pt| &pt.position),
        ))
    }

    /// Per-axis extent (max − min) of the sample positions. The octree root
    /// cube uses the maximum of the three so it encloses every sample.
    pub fn extents(&self) -> Result<Vector3<Real>> {
        Ok(self.bounding_box()?.extents())
    }

    /// Partitions the samples into two new sets by comparing the coordinate
    /// orthogonal to `plane` against the corresponding coordinate of
    /// `center`. Samples strictly below go to the first set; ties go to the
    /// second. Every sample lands in exactly one of the two sets.
    pub fn split_along_plane(&self, center: &Point3<Real>, plane: SplitPlane) -> (Self, Self) {
        let axis = plane.orthogonal_axis();
        let mut below = Self::new();
        let mut above = Self::new();

        // The inputs are unique by construction and the partition cannot
        // introduce duplicates, so push directly.
        for pt in &self.points {
            if pt.position[axis] < center[axis] {
                below.points.push(*pt);
            } else {
                above.points.push(*pt);
            }
        }

        (below, above)
    }
}

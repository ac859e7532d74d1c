use crate::point_set::{OrientedPointSet, SplitPlane};
use crate::{Real, Result};
use na::{Point3, Vector3};
use parry::bounding_volume::Aabb;

/// Index of a node inside the octree arena.
pub type NodeId = usize;

/// A cubic cell of the octree.
#[derive(Clone, Debug)]
pub struct OctreeNode {
    depth: usize,
    center: Point3<Real>,
    width: Real,
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// A node is either a leaf holding its sample subset, or an internal node
/// owning exactly one child per octant. The two states are mutually
/// exclusive: subdividing a node moves its samples into the children.
#[derive(Clone, Debug)]
enum NodeKind {
    Leaf { points: OrientedPointSet },
    Internal { children: [NodeId; 8] },
}

impl OctreeNode {
    /// Depth of this node; the root is at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Center of the cubic cell.
    pub fn center(&self) -> Point3<Real> {
        self.center
    }

    /// Side length of the cubic cell. Equal to the root width divided by
    /// `2^depth`.
    pub fn width(&self) -> Real {
        self.width
    }

    /// Arena index of the parent node, if any. Upward traversal only; the
    /// parent owns its children, never the reverse.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Is this a leaf node?
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// The samples held by this node, or `None` for internal nodes.
    pub fn points(&self) -> Option<&OrientedPointSet> {
        match &self.kind {
            NodeKind::Leaf { points } => Some(points),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Arena indices of the eight children in canonical octant order, or
    /// `None` for leaves.
    pub fn children(&self) -> Option<&[NodeId; 8]> {
        match &self.kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Internal { children } => Some(children),
        }
    }

    /// Number of samples held by this node (0 for internal nodes).
    pub fn sample_count(&self) -> usize {
        self.points().map_or(0, OrientedPointSet::len)
    }

    /// The support cube of the smoothing kernel attached to this cell: the
    /// axis-aligned cube of side [`Self::width`] around [`Self::center`].
    pub fn support(&self) -> Aabb {
        Aabb::from_half_extents(self.center, Vector3::repeat(self.width / 2.0))
    }
}

/// Geometry of a populated leaf cell, for downstream visualization or export
/// consumers.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-serialize",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LeafCell {
    /// Center of the cell.
    pub center: Point3<Real>,
    /// Side length of the cell.
    pub width: Real,
    /// Number of samples assigned to the cell.
    pub sample_count: usize,
}

/// An axis-aligned cubic spatial partition of an [`OrientedPointSet`],
/// subdivided down to a fixed maximum depth. Immutable once built.
///
/// Nodes live in an arena indexed by [`NodeId`]; parents own their children
/// by index and children keep a non-owning parent index for upward
/// traversal.
#[derive(Clone, Debug)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    max_depth: usize,
    leaves: Vec<NodeId>,
}

impl Octree {
    /// Builds the tree over `points`.
    ///
    /// The root cell is centered at the set's centroid with width equal to
    /// the maximum bounding-box extent, then recursively subdivided: a node
    /// holding samples splits into 8 octants (all created, even empty ones)
    /// until `max_depth`; a node holding no samples stays an empty leaf.
    ///
    /// Fails with [`crate::PoissonError::EmptySet`] when `points` is empty.
    pub fn new(points: OrientedPointSet, max_depth: usize) -> Result<Self> {
        let center = points.centroid()?;
        let width = points.extents()?.max();
        let root = OctreeNode {
            depth: 0,
            center,
            width,
            parent: None,
            kind: NodeKind::Leaf { points },
        };

        let mut nodes = vec![root];
        subdivide(&mut nodes, 0, max_depth);

        let mut leaves = Vec::new();
        collect_leaves(&nodes, 0, max_depth, &mut leaves);

        Ok(Self {
            nodes,
            max_depth,
            leaves,
        })
    }

    /// The root node.
    pub fn root(&self) -> &OctreeNode {
        &self.nodes[0]
    }

    /// The node at the given arena index.
    pub fn node(&self, id: NodeId) -> &OctreeNode {
        &self.nodes[id]
    }

    /// Iterates over every node of the tree in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = &OctreeNode> {
        self.nodes.iter()
    }

    /// The configured maximum depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The leaf nodes at exactly [`Self::max_depth`] that hold at least one
    /// sample, in depth-first canonical octant order. Branches that bottomed
    /// out early because they were empty contribute nothing.
    pub fn populated_leaves(&self) -> Vec<&OctreeNode> {
        self.leaves.iter().map(|&id| &self.nodes[id]).collect()
    }

    /// Geometry records of the populated leaves, index-aligned with
    /// [`Self::populated_leaves`] and with the solved weight vector.
    pub fn leaf_cells(&self) -> Vec<LeafCell> {
        self.leaves
            .iter()
            .map(|&id| {
                let node = &self.nodes[id];
                LeafCell {
                    center: node.center,
                    width: node.width,
                    sample_count: node.sample_count(),
                }
            })
            .collect()
    }
}

/// Splits `id`'s samples into its 8 octants and recurses.
///
/// The split order is fixed: xy-plane (down/up halves), then xz-plane
/// (front/back quarters), then yz-plane (left/right octants), yielding the
/// canonical octant order with x varying fastest, then y, then z.
fn subdivide(nodes: &mut Vec<OctreeNode>, id: NodeId, max_depth: usize) {
    if nodes[id].depth >= max_depth {
        return;
    }

    let points = match &mut nodes[id].kind {
        NodeKind::Leaf { points } if !points.is_empty() => std::mem::take(points),
        // Empty nodes stay leaves; internal nodes were already subdivided.
        _ => return,
    };

    let center = nodes[id].center;
    let child_depth = nodes[id].depth + 1;
    let child_width = nodes[id].width / 2.0;
    // Lower-front-left corner of the parent cell; child centers are octant
    // offsets from here in half-width increments.
    let corner = center - Vector3::repeat(child_width);

    let mut children = [0; 8];
    let mut octant = 0;

    let (down, up) = points.split_along_plane(&center, SplitPlane::Xy);
    for half in [down, up] {
        let (front, back) = half.split_along_plane(&center, SplitPlane::Xz);
        for quarter in [front, back] {
            let (left, right) = quarter.split_along_plane(&center, SplitPlane::Yz);
            for subset in [left, right] {
                let x = (octant & 1) as Real;
                let y = ((octant >> 1) & 1) as Real;
                let z = ((octant >> 2) & 1) as Real;
                let child_center = corner
                    + Vector3::new(
                        (x + 0.5) * child_width,
                        (y + 0.5) * child_width,
                        (z + 0.5) * child_width,
                    );

                nodes.push(OctreeNode {
                    depth: child_depth,
                    center: child_center,
                    width: child_width,
                    parent: Some(id),
                    kind: NodeKind::Leaf { points: subset },
                });
                children[octant] = nodes.len() - 1;
                octant += 1;
            }
        }
    }

    nodes[id].kind = NodeKind::Internal { children };

    for child in children {
        subdivide(nodes, child, max_depth);
    }
}

/// Depth-first collection of populated leaves at exactly `target_depth`.
fn collect_leaves(nodes: &[OctreeNode], id: NodeId, target_depth: usize, out: &mut Vec<NodeId>) {
    match &nodes[id].kind {
        NodeKind::Leaf { points } => {
            if nodes[id].depth == target_depth && !points.is_empty() {
                out.push(id);
            }
        }
        NodeKind::Internal { children } => {
            for &child in children {
                collect_leaves(nodes, child, target_depth, out);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::OrientedPoint;
    use approx::assert_relative_eq;
    use na::{point, vector};

    /// Deterministic samples on the unit sphere.
    fn sphere_samples(n: usize) -> OrientedPointSet {
        let mut set = OrientedPointSet::new();
        for i in 0..n {
            let theta = std::f64::consts::PI * (i as Real + 0.5) / n as Real;
            let phi = std::f64::consts::TAU * 0.618_034 * i as Real;
            let normal = vector![
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos()
            ];
            set.add(OrientedPoint::new(Point3::from(normal), normal))
                .unwrap();
        }
        set
    }

    #[test]
    fn empty_set_is_rejected() {
        assert!(Octree::new(OrientedPointSet::new(), 2).is_err());
    }

    #[test]
    fn partition_invariant() {
        let set = sphere_samples(200);
        let total = set.len();
        let octree = Octree::new(set, 3).unwrap();

        let leaves = octree.populated_leaves();
        let leaf_total: usize = leaves.iter().map(|leaf| leaf.sample_count()).sum();
        assert_eq!(leaf_total, total);

        // Every input sample must land in exactly one leaf.
        for pt in sphere_samples(200).iter() {
            let occurrences: usize = leaves
                .iter()
                .map(|leaf| {
                    leaf.points()
                        .unwrap()
                        .iter()
                        .filter(|held| held.same_position(pt))
                        .count()
                })
                .sum();
            assert_eq!(occurrences, 1);
        }
    }

    #[test]
    fn depth_and_width_invariants() {
        let octree = Octree::new(sphere_samples(100), 3).unwrap();
        let root_width = octree.root().width();

        for node in octree.nodes() {
            assert!(node.depth() <= octree.max_depth());
            assert_relative_eq!(
                node.width(),
                root_width / (2.0 as Real).powi(node.depth() as i32),
                epsilon = 1.0e-12
            );
            if let Some(children) = node.children() {
                for &child in children {
                    assert_eq!(octree.node(child).depth(), node.depth() + 1);
                }
            }
        }

        for leaf in octree.populated_leaves() {
            assert_eq!(leaf.depth(), octree.max_depth());
            assert!(!leaf.points().unwrap().is_empty());
        }
    }

    #[test]
    fn internal_nodes_have_all_eight_children() {
        let octree = Octree::new(sphere_samples(50), 2).unwrap();
        for node in octree.nodes() {
            match node.children() {
                Some(children) => {
                    assert_eq!(children.len(), 8);
                    assert!(node.points().is_none());
                }
                None => assert!(node.is_leaf()),
            }
        }
    }

    #[test]
    fn canonical_octant_order() {
        // One sample per octant of a cube; depth 1 yields one populated leaf
        // per child, in x-fastest, then y, then z order.
        let mut set = OrientedPointSet::new();
        for z in [-0.5, 0.5] {
            for y in [-0.5, 0.5] {
                for x in [-0.5, 0.5] {
                    set.add(OrientedPoint::new(point![x, y, z], vector![x, y, z]))
                        .unwrap();
                }
            }
        }

        let octree = Octree::new(set, 1).unwrap();
        let leaves = octree.populated_leaves();
        assert_eq!(leaves.len(), 8);

        let expected = [
            point![-0.25, -0.25, -0.25],
            point![0.25, -0.25, -0.25],
            point![-0.25, 0.25, -0.25],
            point![0.25, 0.25, -0.25],
            point![-0.25, -0.25, 0.25],
            point![0.25, -0.25, 0.25],
            point![-0.25, 0.25, 0.25],
            point![0.25, 0.25, 0.25],
        ];
        for (leaf, center) in leaves.iter().zip(expected) {
            assert_relative_eq!(leaf.center(), center, epsilon = 1.0e-12);
            assert_relative_eq!(leaf.width(), 0.5, epsilon = 1.0e-12);
            assert_eq!(leaf.sample_count(), 1);
        }

        let cells = octree.leaf_cells();
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[0].sample_count, 1);
    }

    #[test]
    fn deterministic_leaf_order() {
        let a = Octree::new(sphere_samples(80), 3).unwrap();
        let b = Octree::new(sphere_samples(80), 3).unwrap();
        let centers_a: Vec<_> = a.populated_leaves().iter().map(|l| l.center()).collect();
        let centers_b: Vec<_> = b.populated_leaves().iter().map(|l| l.center()).collect();
        assert_eq!(centers_a, centers_b);
    }
}

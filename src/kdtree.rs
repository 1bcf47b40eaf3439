//! Spatial index used by the filtering k-means update.
//!
//! The clustering code only talks to the index through [`SpatialIndex`] and
//! [`IndexNode`], so any binary space partitioning tree exposing bounding
//! boxes, point counts and centroids per node can be plugged in. [`KdTree`]
//! is the implementation used by default.

use crate::bounds::BoundingBox;
use crate::error::{ClusteringError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// A node of a binary space partitioning tree over a fixed sample set
pub trait IndexNode {
    /// Bounding box of all points below this node
    fn bounding_box(&self) -> &BoundingBox;

    /// Number of points below this node (at least one)
    fn number_of_points(&self) -> usize;

    /// Centroid of all points below this node
    fn center_of_mass(&self) -> ArrayView1<'_, f64>;

    /// Coordinate-wise sum of all points below this node
    fn sum_of_points(&self) -> ArrayView1<'_, f64>;

    /// Left and right child, `None` for leaves
    fn children(&self) -> Option<(&Self, &Self)>;

    fn is_leaf(&self) -> bool {
        self.children().is_none()
    }
}

/// An immutable index built once over a sample set
pub trait SpatialIndex {
    type Node: IndexNode;

    fn root(&self) -> &Self::Node;

    /// Dimension of the indexed samples
    fn dimension(&self) -> usize {
        self.root().bounding_box().dimension()
    }

    /// Number of indexed samples
    fn len(&self) -> usize {
        self.root().number_of_points()
    }
}

/// A kd-tree splitting every node at the median of its widest dimension.
///
/// A node becomes a leaf exactly when all of its points coincide, so a leaf
/// stands for one distinct position with a multiplicity.
#[derive(Debug, Clone)]
pub struct KdTree {
    root: KdNode,
}

#[derive(Debug, Clone)]
pub struct KdNode {
    bounds: BoundingBox,
    count: usize,
    sum: Array1<f64>,
    center_of_mass: Array1<f64>,
    children: Option<Box<(KdNode, KdNode)>>,
}

impl KdTree {
    /// Build the tree over all rows of `samples`.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no samples, the samples have no
    /// dimensions, or a coordinate is not finite.
    pub fn new(samples: &ArrayView2<'_, f64>) -> Result<Self> {
        if samples.nrows() == 0 {
            return Err(ClusteringError::EmptyData);
        }
        if samples.ncols() == 0 {
            return Err(ClusteringError::InvalidDimensions(
                "samples must have at least one dimension".to_string(),
            ));
        }
        if let Some(index) = samples
            .outer_iter()
            .position(|row| row.iter().any(|x| !x.is_finite()))
        {
            return Err(ClusteringError::NonFiniteSample { index });
        }

        let mut indices: Vec<usize> = (0..samples.nrows()).collect();
        Ok(Self {
            root: KdNode::build(samples, &mut indices),
        })
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        fn count(node: &KdNode) -> usize {
            match node.children() {
                Some((left, right)) => 1 + count(left) + count(right),
                None => 1,
            }
        }
        count(&self.root)
    }
}

impl SpatialIndex for KdTree {
    type Node = KdNode;

    fn root(&self) -> &KdNode {
        &self.root
    }
}

impl KdNode {
    fn build(samples: &ArrayView2<'_, f64>, indices: &mut [usize]) -> Self {
        let mut bounds = BoundingBox::new(samples.ncols());
        for &i in indices.iter() {
            bounds.add(samples.row(i));
        }

        if bounds.is_degenerate() {
            let mut sum = Array1::<f64>::zeros(samples.ncols());
            for &i in indices.iter() {
                sum += &samples.row(i);
            }
            return Self {
                center_of_mass: samples.row(indices[0]).to_owned(),
                bounds,
                count: indices.len(),
                sum,
                children: None,
            };
        }

        let dim = bounds.widest_dimension();
        indices.sort_by(|&a, &b| samples[[a, dim]].total_cmp(&samples[[b, dim]]));

        let (left_indices, right_indices) = indices.split_at_mut(indices.len() / 2);
        let left = Self::build(samples, left_indices);
        let right = Self::build(samples, right_indices);

        let count = left.count + right.count;
        let sum = &left.sum + &right.sum;
        let center_of_mass = &sum / count as f64;

        Self {
            bounds,
            count,
            sum,
            center_of_mass,
            children: Some(Box::new((left, right))),
        }
    }
}

impl IndexNode for KdNode {
    #[inline]
    fn bounding_box(&self) -> &BoundingBox {
        &self.bounds
    }

    #[inline]
    fn number_of_points(&self) -> usize {
        self.count
    }

    #[inline]
    fn center_of_mass(&self) -> ArrayView1<'_, f64> {
        self.center_of_mass.view()
    }

    #[inline]
    fn sum_of_points(&self) -> ArrayView1<'_, f64> {
        self.sum.view()
    }

    #[inline]
    fn children(&self) -> Option<(&Self, &Self)> {
        self.children.as_deref().map(|(left, right)| (left, right))
    }
}

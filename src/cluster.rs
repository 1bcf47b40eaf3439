use crate::bounds::BoundingBox;
use crate::distance::Metric;
use crate::error::{ClusteringError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// One cluster of a clustering result.
///
/// During the iteration only the center is meaningful. Member samples, their
/// bounding box and the sum of squared distances are filled in once, after
/// the center positions have converged.
#[derive(Debug, Clone)]
pub struct Cluster {
    center: Array1<f64>,
    samples: Array2<f64>,
    bounds: BoundingBox,
    sum_of_norms: f64,
}

/// Weighted sum of the samples assigned to a cluster during one iteration.
///
/// Kept apart from [`Cluster`] so that the assignment step can read every
/// center while writing to the accumulators.
#[derive(Debug, Clone)]
pub struct ClusterUpdate {
    new_center: Array1<f64>,
    normalization_factor: f64,
}

impl Cluster {
    /// Create a cluster without samples located at `center`
    pub fn new(center: Array1<f64>) -> Self {
        let dimension = center.len();
        Self {
            center,
            samples: Array2::zeros((0, dimension)),
            bounds: BoundingBox::new(dimension),
            sum_of_norms: 0.0,
        }
    }

    /// Current center of this cluster
    #[inline]
    pub fn center(&self) -> ArrayView1<'_, f64> {
        self.center.view()
    }

    /// Samples belonging to this cluster, one per row
    #[inline]
    pub fn samples(&self) -> ArrayView2<'_, f64> {
        self.samples.view()
    }

    /// Bounding box of the samples of this cluster
    #[inline]
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Sum of squared metric distances from the samples to the center
    #[inline]
    pub fn sum_of_norms(&self) -> f64 {
        self.sum_of_norms
    }

    /// Number of samples belonging to this cluster
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.nrows() == 0
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.center.len()
    }

    /// Commit the accumulated update and reset the accumulator.
    ///
    /// Returns whether the center moved farther than `tol`. An accumulator
    /// that received no samples leaves the center untouched and reports no
    /// movement.
    pub fn apply_updates<M: Metric>(
        &mut self,
        update: &mut ClusterUpdate,
        metric: &M,
        tol: f64,
    ) -> bool {
        if update.normalization_factor == 0.0 {
            return false;
        }

        let mut new_center = std::mem::replace(
            &mut update.new_center,
            Array1::zeros(self.center.len()),
        );
        new_center *= 1.0 / update.normalization_factor;
        update.normalization_factor = 0.0;

        let moved = metric.distance(self.center.view(), new_center.view()) > tol;
        self.center = new_center;
        moved
    }

    /// Move the center without going through an accumulator
    pub(crate) fn reseed(&mut self, center: ArrayView1<'_, f64>) {
        self.center.assign(&center);
    }

    /// Append a sample to this cluster and grow its bounding box
    pub fn add_sample(&mut self, sample: ArrayView1<'_, f64>) -> Result<()> {
        if sample.len() != self.dimension() {
            return Err(ClusteringError::InvalidDimensions(format!(
                "Expected a sample with {} coordinates, got {}",
                self.dimension(),
                sample.len()
            )));
        }
        self.samples
            .push_row(sample)
            .map_err(|e| ClusteringError::InvalidDimensions(e.to_string()))?;
        self.bounds.add(sample);
        Ok(())
    }

    /// Recompute the sum of squared distances between samples and center
    pub fn compute_sum_of_norms<M: Metric>(&mut self, metric: &M) {
        self.sum_of_norms = self
            .samples
            .outer_iter()
            .map(|sample| {
                let distance = metric.distance(sample, self.center.view());
                distance * distance
            })
            .sum();
    }
}

impl ClusterUpdate {
    /// Create an empty accumulator for clusters in `dimension` dimensions
    pub fn new(dimension: usize) -> Self {
        Self {
            new_center: Array1::zeros(dimension),
            normalization_factor: 0.0,
        }
    }

    /// Add `sample` with the given weight
    #[inline]
    pub fn update(&mut self, sample: ArrayView1<'_, f64>, weight: f64) {
        debug_assert!(weight >= 0.0);
        self.new_center.scaled_add(weight, &sample);
        self.normalization_factor += weight;
    }

    /// Add the precomputed sum of a group of samples whose weights add up
    /// to `weight`
    #[inline]
    pub fn add_sum(&mut self, sum: ArrayView1<'_, f64>, weight: f64) {
        debug_assert!(weight >= 0.0);
        self.new_center += &sum;
        self.normalization_factor += weight;
    }

    /// Total weight accumulated so far
    #[inline]
    pub fn normalization_factor(&self) -> f64 {
        self.normalization_factor
    }

    /// Whether nothing was accumulated since the last commit
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.normalization_factor == 0.0
    }
}

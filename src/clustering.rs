use crate::cluster::Cluster;
use crate::distance::Metric;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

/// Read-only view on the result of a clustering algorithm.
///
/// Implemented by [`KMeansClustering`](crate::KMeansClustering) and
/// [`XMeansClustering`](crate::XMeansClustering).
pub trait Clustering {
    /// The clusters found by the algorithm
    fn clusters(&self) -> &[Cluster];

    /// Reorder the clusters by decreasing number of samples.
    ///
    /// The order among clusters of equal size is unspecified.
    fn sort(&mut self);

    /// Number of clusters
    fn len(&self) -> usize {
        self.clusters().len()
    }

    fn is_empty(&self) -> bool {
        self.clusters().is_empty()
    }

    /// Index of the cluster whose center is nearest to `sample`.
    ///
    /// # Panics
    ///
    /// Panics if there are no clusters.
    fn nearest_cluster_id<M: Metric>(&self, sample: ArrayView1<'_, f64>, metric: &M) -> usize {
        nearest_cluster_id(self.clusters(), sample, metric)
    }

    /// Assign every row of `samples` to its nearest cluster
    fn predict<M: Metric>(&self, samples: &ArrayView2<'_, f64>, metric: &M) -> Array1<usize> {
        nearest_cluster_ids(self.clusters(), samples, metric)
    }

    /// All cluster centers, one per row
    fn centers(&self) -> Array2<f64> {
        let clusters = self.clusters();
        let dimension = clusters.first().map_or(0, Cluster::dimension);
        let mut centers = Array2::zeros((clusters.len(), dimension));
        for (mut row, cluster) in centers.axis_iter_mut(Axis(0)).zip(clusters) {
            row.assign(&cluster.center());
        }
        centers
    }

    /// Sum of the squared sample-to-center distances over all clusters
    fn total_sum_of_norms(&self) -> f64 {
        self.clusters().iter().map(Cluster::sum_of_norms).sum()
    }
}

/// Brute-force search for the cluster nearest to `sample`.
///
/// Ties go to the cluster that comes first.
///
/// # Panics
///
/// Panics if `clusters` is empty.
pub fn nearest_cluster_id<M: Metric>(
    clusters: &[Cluster],
    sample: ArrayView1<'_, f64>,
    metric: &M,
) -> usize {
    assert!(
        !clusters.is_empty(),
        "cannot search for the nearest of zero clusters"
    );

    let mut nearest = 0;
    let mut min_distance = f64::INFINITY;
    for (i, cluster) in clusters.iter().enumerate() {
        let distance = metric.distance(cluster.center(), sample);
        if distance < min_distance {
            min_distance = distance;
            nearest = i;
        }
    }
    nearest
}

/// Nearest cluster for every row of `samples`, computed in parallel
pub(crate) fn nearest_cluster_ids<M: Metric>(
    clusters: &[Cluster],
    samples: &ArrayView2<'_, f64>,
    metric: &M,
) -> Array1<usize> {
    let labels: Vec<usize> = samples
        .axis_iter(Axis(0))
        .into_par_iter()
        .map(|sample| nearest_cluster_id(clusters, sample, metric))
        .collect();
    Array1::from(labels)
}

/// Sort clusters by decreasing number of samples
pub(crate) fn sort_by_size(clusters: &mut [Cluster]) {
    clusters.sort_by(|a, b| b.len().cmp(&a.len()));
}

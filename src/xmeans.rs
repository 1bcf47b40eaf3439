//! x-means: k-means with automatic selection of the number of clusters.
//!
//! Starting from a single cluster, every round tries to split each cluster
//! candidate in two with a local 2-means run and keeps the split where the
//! Bayesian Information Criterion prefers two clusters over one. A global
//! k-means pass after each round rebalances the memberships (D. Pelleg and
//! A. Moore, 2000).

use crate::algorithm::validate_samples;
use crate::bounds::BoundingBox;
use crate::cluster::Cluster;
use crate::clustering::{sort_by_size, Clustering};
use crate::config::{KMeansConfig, XMeansConfig};
use crate::distance::Metric;
use crate::error::{ClusteringError, Result};
use crate::kdtree::KdTree;
use crate::kmeans::KMeansClustering;
use log::{debug, info, trace};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::f64::consts::PI;

/// Lower bound for the pooled variance in the BIC
const MIN_VARIANCE: f64 = f64::EPSILON;

/// x-means clustering.
///
/// # Example
///
/// ```
/// use fastxmeans_rs::{Clustering, Euclidean, XMeansClustering, XMeansConfig};
/// use ndarray::array;
///
/// let samples = array![[0.0, 0.0], [0.3, 0.1], [0.1, 0.4], [0.4, 0.3]];
/// let config = XMeansConfig::new(1);
/// let clustering = XMeansClustering::new(&samples.view(), &Euclidean, &config).unwrap();
///
/// assert_eq!(clustering.len(), 1);
/// assert_eq!(clustering.clusters()[0].len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct XMeansClustering {
    clusters: Vec<Cluster>,
    n_rounds: usize,
}

/// A tentative cluster together with its best split into two
#[derive(Debug)]
struct ClusterCandidate {
    cluster: Cluster,
    children: Option<Vec<Cluster>>,
    /// BIC(parent) - BIC(children); negative values favour the split
    bvalue: f64,
}

/// Affine map of the samples' bounding box onto the unit cube
#[derive(Debug, Clone)]
struct Normalization {
    min: Array1<f64>,
    extent: Array1<f64>,
}

impl XMeansClustering {
    /// Run x-means with at most `config.max_clusters` clusters.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `config.max_clusters` is 0
    /// - There are no samples, or a sample is not finite
    pub fn new<M: Metric>(
        samples: &ArrayView2<'_, f64>,
        metric: &M,
        config: &XMeansConfig,
    ) -> Result<Self> {
        if config.max_clusters == 0 {
            return Err(ClusteringError::InvalidMaxClusters(
                "max_clusters must be greater than 0".to_string(),
            ));
        }
        validate_samples(samples)?;

        let max_clusters = config.max_clusters;
        let kmeans = &config.kmeans;

        if config.verbose {
            info!(
                "Running x-means: {} samples, {} features, at most {} clusters",
                samples.nrows(),
                samples.ncols(),
                max_clusters
            );
        }

        let normalization = Normalization::new(samples);
        let scaled = normalization.scale(samples);
        let scaled = scaled.view();
        let index = KdTree::new(&scaled)?;

        // the first candidate sits at the mean of all samples
        let initial = KMeansClustering::with_index(1, &scaled, &index, metric, kmeans)?;
        let mut candidates: Vec<ClusterCandidate> = initial
            .into_clusters()
            .into_iter()
            .map(ClusterCandidate::new)
            .collect();

        let mut current_number_of_clusters = 0;
        let mut n_rounds = 0;
        while current_number_of_clusters < candidates.len() && candidates.len() < max_clusters {
            current_number_of_clusters = candidates.len();
            n_rounds += 1;

            for candidate in candidates.iter_mut() {
                candidate.split(metric, kmeans)?;
            }

            candidates.sort_by(|a, b| a.bvalue.total_cmp(&b.bvalue));
            let bvalues: Vec<f64> = candidates.iter().map(|c| c.bvalue).collect();
            let cutoff = cutoff_index(&bvalues, max_clusters);
            trace!(
                "  Round {}: bvalues = {:?}, cutoff index = {}",
                n_rounds,
                bvalues,
                cutoff
            );

            let mut positions = Vec::with_capacity(candidates.len() + cutoff);
            for (i, candidate) in candidates.into_iter().enumerate() {
                match candidate.children {
                    Some(children) if i < cutoff => {
                        positions.extend(children.iter().map(|child| child.center().to_owned()));
                    }
                    _ => positions.push(candidate.cluster.center().to_owned()),
                }
            }

            // correction clustering over all samples
            let positions = stack_positions(&positions, scaled.ncols());
            let correction = KMeansClustering::from_positions_with_index(
                &scaled,
                &positions.view(),
                &index,
                metric,
                kmeans,
            )?;
            candidates = correction
                .into_clusters()
                .into_iter()
                .filter(|cluster| !cluster.is_empty())
                .map(ClusterCandidate::new)
                .collect();

            if config.verbose {
                info!(
                    "  Round {}: {} -> {} clusters",
                    n_rounds,
                    current_number_of_clusters,
                    candidates.len()
                );
            } else {
                debug!(
                    "x-means round {}: {} -> {} clusters",
                    n_rounds,
                    current_number_of_clusters,
                    candidates.len()
                );
            }
        }

        // post-process in the original coordinates
        let centers: Vec<Array1<f64>> = candidates
            .iter()
            .map(|candidate| normalization.unscale(candidate.cluster.center()))
            .collect();
        let centers = stack_positions(&centers, samples.ncols());
        let refined = KMeansClustering::from_positions(samples, &centers.view(), metric, kmeans)?;

        if config.verbose {
            info!(
                "  Found {} clusters after {} rounds",
                refined.len(),
                n_rounds
            );
        }

        Ok(Self {
            clusters: refined.into_clusters(),
            n_rounds,
        })
    }

    /// Number of split rounds that were run
    pub fn n_rounds(&self) -> usize {
        self.n_rounds
    }
}

impl Clustering for XMeansClustering {
    fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    fn sort(&mut self) {
        sort_by_size(&mut self.clusters);
    }
}

impl ClusterCandidate {
    fn new(cluster: Cluster) -> Self {
        Self {
            cluster,
            children: None,
            bvalue: f64::INFINITY,
        }
    }

    /// Split the candidate's samples with 2-means and score the split.
    ///
    /// Candidates that cannot be split keep `bvalue = +inf` and no children.
    fn split<M: Metric>(&mut self, metric: &M, config: &KMeansConfig) -> Result<()> {
        self.children = None;
        self.bvalue = f64::INFINITY;

        if self.cluster.len() < 2 {
            return Ok(());
        }

        trace!("  Splitting {} samples", self.cluster.len());
        let samples = self.cluster.samples();
        let split = KMeansClustering::new(2, &samples, metric, config)?;
        let children = split.into_clusters();
        if children.iter().any(Cluster::is_empty) {
            return Ok(());
        }

        let dimension = self.cluster.dimension();
        let parent_bic = compute_bic(std::slice::from_ref(&self.cluster), dimension);
        let children_bic = compute_bic(&children, dimension);
        if let (Some(parent_bic), Some(children_bic)) = (parent_bic, children_bic) {
            self.bvalue = parent_bic - children_bic;
            self.children = Some(children);
        }
        Ok(())
    }
}

/// Bayesian Information Criterion of a set of spherical Gaussian clusters
/// sharing one variance.
///
/// Uses the clusters' member counts and sums of squared distances. Returns
/// `None` if there are no more samples than clusters, where the pooled
/// variance is undefined.
pub fn compute_bic(clusters: &[Cluster], dimension: usize) -> Option<f64> {
    let number_of_clusters = clusters.len();
    let total_number_of_samples: usize = clusters.iter().map(Cluster::len).sum();
    if total_number_of_samples <= number_of_clusters {
        return None;
    }

    let k = number_of_clusters as f64;
    let d = dimension as f64;
    let r = total_number_of_samples as f64;

    // mixing weights, means and variances
    let number_of_parameters = (k - 1.0) + k * d + k;

    let total_sum_of_norms: f64 = clusters.iter().map(Cluster::sum_of_norms).sum();
    let variance = (total_sum_of_norms / (r - k)).max(MIN_VARIANCE);

    let log_likelihood: f64 = clusters
        .iter()
        .filter(|cluster| cluster.len() > 1)
        .map(|cluster| {
            let n = cluster.len() as f64;
            let weight = n * n.ln() - n * r.ln();
            let density = n / 2.0 * (2.0 * PI).ln() + n * d / 2.0 * variance.ln();
            weight - density - cluster.sum_of_norms() / (2.0 * variance)
        })
        .sum();

    let bic = log_likelihood - number_of_parameters / 2.0 * r.ln();
    trace!(
        "    BIC {:.4} ({} clusters, {} samples, variance {:.6e}, log likelihood {:.4})",
        bic,
        number_of_clusters,
        total_number_of_samples,
        variance,
        log_likelihood
    );
    Some(bic)
}

/// Number of candidates (from the front of the ascending `bvalues`) to
/// replace by their children.
///
/// That is the number of negative bvalues, clipped so that the candidate
/// count cannot grow beyond `max_clusters`. A lone candidate is always
/// allowed to split.
fn cutoff_index(bvalues: &[f64], max_clusters: usize) -> usize {
    let headroom = max_clusters.saturating_sub(bvalues.len());
    if bvalues.len() == 1 {
        return headroom.min(1);
    }
    let negative = bvalues.partition_point(|&bvalue| bvalue < 0.0);
    negative.min(headroom)
}

fn stack_positions(positions: &[Array1<f64>], dimension: usize) -> Array2<f64> {
    let mut stacked = Array2::zeros((positions.len(), dimension));
    for (mut row, position) in stacked.axis_iter_mut(Axis(0)).zip(positions) {
        row.assign(position);
    }
    stacked
}

impl Normalization {
    /// Dimensions without extent are shifted but not scaled
    fn new(samples: &ArrayView2<'_, f64>) -> Self {
        let bounds = BoundingBox::from_samples(samples);
        let extent = bounds.extent().mapv(|e| if e > 0.0 { e } else { 1.0 });
        Self {
            min: bounds.min().to_owned(),
            extent,
        }
    }

    fn scale(&self, samples: &ArrayView2<'_, f64>) -> Array2<f64> {
        let mut scaled = samples.to_owned();
        scaled -= &self.min;
        scaled /= &self.extent;
        scaled
    }

    fn unscale(&self, point: ArrayView1<'_, f64>) -> Array1<f64> {
        &point * &self.extent + &self.min
    }
}

use crate::algorithm::{
    initialize_clusters, solve, validate_index, validate_samples, FilterStats, SolveOutcome,
};
use crate::cluster::Cluster;
use crate::clustering::{sort_by_size, Clustering};
use crate::config::KMeansConfig;
use crate::distance::Metric;
use crate::error::{ClusteringError, Result};
use crate::kdtree::{KdTree, SpatialIndex};
use ndarray::ArrayView2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// k-means clustering accelerated by a kd-tree over the samples.
///
/// The clustering is computed on construction. Four constructors cover the
/// combinations of "k clusters seeded automatically" vs. "explicit initial
/// centers" and "build the kd-tree" vs. "reuse a pre-built index".
///
/// # Example
///
/// ```
/// use fastxmeans_rs::{Clustering, Euclidean, KMeansClustering, KMeansConfig};
/// use ndarray::array;
///
/// let samples = array![[0.0, 0.0], [0.5, 0.2], [10.0, 10.0], [10.3, 9.8]];
/// let config = KMeansConfig::default();
/// let clustering = KMeansClustering::new(2, &samples.view(), &Euclidean, &config).unwrap();
///
/// assert_eq!(clustering.len(), 2);
/// assert!(clustering.converged());
/// for cluster in clustering.clusters() {
///     assert_eq!(cluster.len(), 2);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct KMeansClustering {
    clusters: Vec<Cluster>,
    n_iterations: usize,
    converged: bool,
    stats: FilterStats,
}

impl KMeansClustering {
    /// Run k-means with `k` automatically seeded clusters.
    ///
    /// # Arguments
    ///
    /// * `k` - Number of clusters
    /// * `samples` - Samples of shape (n_samples, n_features)
    /// * `metric` - Distance between samples
    /// * `config` - Iteration and seeding settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `k` is 0 or larger than the number of samples
    /// - There are no samples, or a sample is not finite
    pub fn new<M: Metric>(
        k: usize,
        samples: &ArrayView2<'_, f64>,
        metric: &M,
        config: &KMeansConfig,
    ) -> Result<Self> {
        validate_samples(samples)?;
        let index = KdTree::new(samples)?;
        Self::run_seeded(k, samples, &index, metric, config)
    }

    /// Run k-means with `k` automatically seeded clusters on a pre-built index.
    ///
    /// # Errors
    ///
    /// Same as [`KMeansClustering::new`], and additionally if `index` was
    /// not built over `samples`.
    pub fn with_index<I: SpatialIndex, M: Metric>(
        k: usize,
        samples: &ArrayView2<'_, f64>,
        index: &I,
        metric: &M,
        config: &KMeansConfig,
    ) -> Result<Self> {
        validate_samples(samples)?;
        validate_index(samples, index)?;
        Self::run_seeded(k, samples, index, metric, config)
    }

    /// Run k-means starting from the given centers, one per row.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `initial_positions` has no rows
    /// - The dimensions of samples and positions differ
    /// - There are no samples, or a sample is not finite
    pub fn from_positions<M: Metric>(
        samples: &ArrayView2<'_, f64>,
        initial_positions: &ArrayView2<'_, f64>,
        metric: &M,
        config: &KMeansConfig,
    ) -> Result<Self> {
        validate_samples(samples)?;
        let index = KdTree::new(samples)?;
        Self::run_positioned(samples, initial_positions, &index, metric, config)
    }

    /// Run k-means starting from the given centers on a pre-built index.
    ///
    /// # Errors
    ///
    /// Same as [`KMeansClustering::from_positions`], and additionally if
    /// `index` was not built over `samples`.
    pub fn from_positions_with_index<I: SpatialIndex, M: Metric>(
        samples: &ArrayView2<'_, f64>,
        initial_positions: &ArrayView2<'_, f64>,
        index: &I,
        metric: &M,
        config: &KMeansConfig,
    ) -> Result<Self> {
        validate_samples(samples)?;
        validate_index(samples, index)?;
        Self::run_positioned(samples, initial_positions, index, metric, config)
    }

    fn run_seeded<I: SpatialIndex, M: Metric>(
        k: usize,
        samples: &ArrayView2<'_, f64>,
        index: &I,
        metric: &M,
        config: &KMeansConfig,
    ) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let clusters = initialize_clusters(samples, index, k, config, &mut rng)?;
        let outcome = solve(samples, index, clusters, metric, config, &mut rng)?;
        Ok(Self::from(outcome))
    }

    fn run_positioned<I: SpatialIndex, M: Metric>(
        samples: &ArrayView2<'_, f64>,
        initial_positions: &ArrayView2<'_, f64>,
        index: &I,
        metric: &M,
        config: &KMeansConfig,
    ) -> Result<Self> {
        if initial_positions.nrows() == 0 {
            return Err(ClusteringError::InvalidK(
                "at least one initial position is required".to_string(),
            ));
        }
        if initial_positions.ncols() != samples.ncols() {
            return Err(ClusteringError::InvalidDimensions(format!(
                "Expected initial positions with {} features, got {}",
                samples.ncols(),
                initial_positions.ncols()
            )));
        }

        let clusters = initial_positions
            .outer_iter()
            .map(|position| Cluster::new(position.to_owned()))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let outcome = solve(samples, index, clusters, metric, config, &mut rng)?;
        Ok(Self::from(outcome))
    }

    /// Number of Lloyd iterations that were run
    pub fn n_iterations(&self) -> usize {
        self.n_iterations
    }

    /// Whether the centers stopped moving before the iteration limit
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Node counters of the filtering update (zero for brute-force updates)
    pub fn filter_stats(&self) -> FilterStats {
        self.stats
    }

    /// Take ownership of the clusters
    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters
    }
}

impl From<SolveOutcome> for KMeansClustering {
    fn from(outcome: SolveOutcome) -> Self {
        Self {
            clusters: outcome.clusters,
            n_iterations: outcome.n_iterations,
            converged: outcome.converged,
            stats: outcome.stats,
        }
    }
}

impl Clustering for KMeansClustering {
    fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    fn sort(&mut self) {
        sort_by_size(&mut self.clusters);
    }
}

/// How the initial cluster centers of a k-means run are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitStrategy {
    /// Distribute the k seeds over the kd-tree proportionally to the number
    /// of points in each subtree, placing them at leaf centroids.
    #[default]
    KdTree,

    /// Choose k distinct samples uniformly at random.
    Random,
}

/// How cluster accumulators are filled during one Lloyd iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateStrategy {
    /// Pelleg-Moore filtering over the spatial index. Whole subtrees are
    /// assigned at once when a single cluster dominates their bounding box.
    #[default]
    Filtering,

    /// Assign every sample to its nearest cluster individually.
    BruteForce,
}

/// What happens to a cluster that received no samples during an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyClusterPolicy {
    /// Leave the center where it is. The cluster contributes nothing until
    /// some samples come closer to it than to any other cluster.
    #[default]
    Freeze,

    /// Move the center onto a randomly chosen sample.
    Reseed,
}

/// Configuration for the k-means algorithm
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Maximum number of Lloyd iterations before giving up on convergence
    pub max_iters: usize,

    /// Convergence tolerance. An iteration in which no center moves farther
    /// than this (in terms of the metric) terminates the algorithm.
    pub tol: f64,

    /// Random seed for random initialization and re-seeding of empty clusters
    pub seed: u64,

    /// Strategy for the initial cluster centers
    pub init: InitStrategy,

    /// Strategy for the assignment step
    pub update: UpdateStrategy,

    /// Handling of clusters that end an iteration without samples
    pub empty_clusters: EmptyClusterPolicy,

    /// Log progress at info level
    pub verbose: bool,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            max_iters: 1_000,
            tol: 1e-6,
            seed: 0,
            init: InitStrategy::default(),
            update: UpdateStrategy::default(),
            empty_clusters: EmptyClusterPolicy::default(),
            verbose: false,
        }
    }
}

impl KMeansConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of iterations
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the initialization strategy
    pub fn with_init(mut self, init: InitStrategy) -> Self {
        self.init = init;
        self
    }

    /// Set the update strategy
    pub fn with_update(mut self, update: UpdateStrategy) -> Self {
        self.update = update;
        self
    }

    /// Set the empty cluster policy
    pub fn with_empty_clusters(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_clusters = policy;
        self
    }

    /// Set verbose mode
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Configuration for the x-means algorithm
#[derive(Debug, Clone)]
pub struct XMeansConfig {
    /// Upper bound for the number of clusters
    pub max_clusters: usize,

    /// Settings shared by every k-means run x-means performs internally
    pub kmeans: KMeansConfig,

    /// Log progress at info level
    pub verbose: bool,
}

impl XMeansConfig {
    /// Create a new configuration with the given upper bound on clusters
    pub fn new(max_clusters: usize) -> Self {
        Self {
            max_clusters,
            kmeans: KMeansConfig::default(),
            verbose: false,
        }
    }

    /// Set the configuration of the inner k-means runs
    pub fn with_kmeans(mut self, kmeans: KMeansConfig) -> Self {
        self.kmeans = kmeans;
        self
    }

    /// Set verbose mode
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

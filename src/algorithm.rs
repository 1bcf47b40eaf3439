use crate::bounds::BoundingBox;
use crate::cluster::{Cluster, ClusterUpdate};
use crate::clustering::{nearest_cluster_id, nearest_cluster_ids};
use crate::config::{EmptyClusterPolicy, InitStrategy, KMeansConfig, UpdateStrategy};
use crate::distance::Metric;
use crate::error::{ClusteringError, Result};
use crate::kdtree::{IndexNode, SpatialIndex};
use log::{debug, info, trace, warn};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

/// Result of the k-means algorithm
pub(crate) struct SolveOutcome {
    pub clusters: Vec<Cluster>,
    pub n_iterations: usize,
    pub converged: bool,
    pub stats: FilterStats,
}

/// Counters of the filtering update, summed over all iterations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Index nodes looked at
    pub nodes_visited: usize,
    /// Internal nodes assigned as a whole to a dominating cluster
    pub nodes_pruned: usize,
}

/// Check that there is something to cluster and that it is finite
pub(crate) fn validate_samples(samples: &ArrayView2<'_, f64>) -> Result<()> {
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
    Ok(())
}

/// Check that a pre-built index was built over `samples`
pub(crate) fn validate_index<I: SpatialIndex>(
    samples: &ArrayView2<'_, f64>,
    index: &I,
) -> Result<()> {
    if index.len() != samples.nrows() {
        return Err(ClusteringError::IndexMismatch(format!(
            "index covers {} points, but {} samples were given",
            index.len(),
            samples.nrows()
        )));
    }
    if index.dimension() != samples.ncols() {
        return Err(ClusteringError::IndexMismatch(format!(
            "index has {} dimensions, samples have {}",
            index.dimension(),
            samples.ncols()
        )));
    }
    Ok(())
}

/// Create k clusters at positions chosen by the configured strategy
pub(crate) fn initialize_clusters<I: SpatialIndex>(
    samples: &ArrayView2<'_, f64>,
    index: &I,
    k: usize,
    config: &KMeansConfig,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<Cluster>> {
    if k == 0 {
        return Err(ClusteringError::InvalidK("k must be greater than 0".to_string()));
    }

    let n_samples = samples.nrows();
    if n_samples < k {
        return Err(ClusteringError::InsufficientData(format!(
            "Number of samples ({}) is less than k ({})",
            n_samples, k
        )));
    }

    let positions = match config.init {
        InitStrategy::KdTree => {
            let mut positions = Vec::with_capacity(k);
            generate_initial_positions(index.root(), k, &mut positions);
            positions
        }
        InitStrategy::Random => random_initial_positions(samples, k, rng),
    };
    debug_assert_eq!(positions.len(), k);

    Ok(positions.into_iter().map(Cluster::new).collect())
}

/// Spread `n` initial positions over the subtree below `node`.
///
/// Every internal node hands `round(n * left / total)` positions to its left
/// child and the rest to its right child. A leaf receives at most as many
/// positions as it holds points, all of them at its centroid.
pub(crate) fn generate_initial_positions<N: IndexNode>(
    node: &N,
    n: usize,
    positions: &mut Vec<Array1<f64>>,
) {
    if n == 0 {
        return;
    }

    match node.children() {
        None => {
            let n = n.min(node.number_of_points());
            for _ in 0..n {
                positions.push(node.center_of_mass().to_owned());
            }
        }
        Some((left, right)) => {
            let scaled = (n * left.number_of_points()) as f64;
            let left_n = (scaled / node.number_of_points() as f64).round() as usize;
            let right_n = n - left_n;

            generate_initial_positions(left, left_n, positions);
            generate_initial_positions(right, right_n, positions);
        }
    }
}

/// Initialize centers by randomly selecting k samples
fn random_initial_positions(
    samples: &ArrayView2<'_, f64>,
    k: usize,
    rng: &mut ChaCha8Rng,
) -> Vec<Array1<f64>> {
    let indices: Vec<usize> = (0..samples.nrows()).collect();
    indices
        .choose_multiple(rng, k)
        .map(|&i| samples.row(i).to_owned())
        .collect()
}

/// Lower bound of the distance from `center` to any point inside `bounds`.
///
/// The closest point of the box is written to `scratch`.
#[inline]
pub(crate) fn distance_to_box<M: Metric>(
    center: ArrayView1<'_, f64>,
    bounds: &BoundingBox,
    metric: &M,
    scratch: &mut Array1<f64>,
) -> f64 {
    bounds.clip_into(center, scratch);
    metric.distance(center, scratch.view())
}

/// The cluster closest to the box, unless two or more share that distance
fn find_owner_candidate<M: Metric>(
    clusters: &[Cluster],
    bounds: &BoundingBox,
    metric: &M,
    scratch: &mut Array1<f64>,
) -> Option<usize> {
    let mut owner_candidate = None;
    let mut shortest_distance = f64::INFINITY;
    for (i, cluster) in clusters.iter().enumerate() {
        let distance = distance_to_box(cluster.center(), bounds, metric, scratch);
        if distance < shortest_distance {
            shortest_distance = distance;
            owner_candidate = Some(i);
        } else if distance == shortest_distance {
            owner_candidate = None;
        }
    }
    owner_candidate
}

/// Whether every point of `bounds` is strictly closer to the owner candidate
/// than to any other cluster.
///
/// For each challenger only the corner of the box lying farthest in the
/// direction from the candidate to the challenger has to be checked.
fn dominates<M: Metric>(
    clusters: &[Cluster],
    owner: usize,
    bounds: &BoundingBox,
    metric: &M,
    scratch: &mut Array1<f64>,
) -> bool {
    let owner_center = clusters[owner].center();
    clusters
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != owner)
        .all(|(_, challenger)| {
            bounds.extreme_corner_into(owner_center, challenger.center(), scratch);
            let to_challenger = metric.distance(challenger.center(), scratch.view());
            to_challenger > metric.distance(owner_center, scratch.view())
        })
}

/// Accumulate the points below `node` into the cluster updates, assigning
/// whole subtrees at once where a single cluster dominates them.
pub(crate) fn update_from_node<N: IndexNode, M: Metric>(
    node: &N,
    clusters: &[Cluster],
    updates: &mut [ClusterUpdate],
    metric: &M,
    stats: &mut FilterStats,
) {
    let mut scratch = Array1::zeros(node.bounding_box().dimension());
    filter_node(node, clusters, updates, metric, stats, &mut scratch);
}

fn filter_node<N: IndexNode, M: Metric>(
    node: &N,
    clusters: &[Cluster],
    updates: &mut [ClusterUpdate],
    metric: &M,
    stats: &mut FilterStats,
    scratch: &mut Array1<f64>,
) {
    stats.nodes_visited += 1;
    let weight = node.number_of_points() as f64;

    let (left, right) = match node.children() {
        Some(children) => children,
        None => {
            // all points of a leaf coincide
            let nearest = nearest_cluster_id(clusters, node.center_of_mass(), metric);
            updates[nearest].add_sum(node.sum_of_points(), weight);
            return;
        }
    };

    let bounds = node.bounding_box();
    if let Some(owner) = find_owner_candidate(clusters, bounds, metric, scratch) {
        if dominates(clusters, owner, bounds, metric, scratch) {
            stats.nodes_pruned += 1;
            updates[owner].add_sum(node.sum_of_points(), weight);
            return;
        }
    }

    filter_node(left, clusters, updates, metric, stats, scratch);
    filter_node(right, clusters, updates, metric, stats, scratch);
}

/// Accumulate every sample into the update of its nearest cluster
pub(crate) fn update_brute_force<M: Metric>(
    samples: &ArrayView2<'_, f64>,
    clusters: &[Cluster],
    updates: &mut [ClusterUpdate],
    metric: &M,
) {
    let labels = nearest_cluster_ids(clusters, samples, metric);
    for (sample, &label) in samples.axis_iter(Axis(0)).zip(labels.iter()) {
        updates[label].update(sample, 1.0);
    }
}

/// Run Lloyd iterations from the given clusters until no center moves, then
/// assign every sample to its nearest cluster.
pub(crate) fn solve<I: SpatialIndex, M: Metric>(
    samples: &ArrayView2<'_, f64>,
    index: &I,
    mut clusters: Vec<Cluster>,
    metric: &M,
    config: &KMeansConfig,
    rng: &mut ChaCha8Rng,
) -> Result<SolveOutcome> {
    let start = Instant::now();
    let n_features = samples.ncols();
    let k = clusters.len();

    if config.verbose {
        info!(
            "Running k-means: {} samples, {} features, {} clusters",
            samples.nrows(),
            n_features,
            k
        );
    }

    let mut updates = vec![ClusterUpdate::new(n_features); k];
    let mut stats = FilterStats::default();
    let mut n_iterations = 0;
    let mut converged = false;

    while n_iterations < config.max_iters {
        n_iterations += 1;

        match config.update {
            UpdateStrategy::Filtering => {
                update_from_node(index.root(), &clusters, &mut updates, metric, &mut stats)
            }
            UpdateStrategy::BruteForce => {
                update_brute_force(samples, &clusters, &mut updates, metric)
            }
        }

        let mut empty_clusters = Vec::new();
        let mut any_update_noticeable = false;
        for (i, (cluster, update)) in clusters.iter_mut().zip(updates.iter_mut()).enumerate() {
            if update.is_empty() {
                empty_clusters.push(i);
            }
            any_update_noticeable |= cluster.apply_updates(update, metric, config.tol);
        }

        if !empty_clusters.is_empty() {
            match config.empty_clusters {
                EmptyClusterPolicy::Freeze => {
                    trace!("  {} clusters received no samples", empty_clusters.len());
                }
                EmptyClusterPolicy::Reseed => {
                    for &i in &empty_clusters {
                        let sample = rng.gen_range(0..samples.nrows());
                        clusters[i].reseed(samples.row(sample));
                    }
                    any_update_noticeable = true;
                    warn!("  Reseeded {} empty clusters", empty_clusters.len());
                }
            }
        }

        trace!(
            "  Iteration {}: moved = {}, nodes visited = {}, pruned = {}",
            n_iterations,
            any_update_noticeable,
            stats.nodes_visited,
            stats.nodes_pruned
        );

        if !any_update_noticeable {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            "k-means stopped after {} iterations without converging",
            n_iterations
        );
    }

    // post-process resulting structure
    let labels = nearest_cluster_ids(&clusters, samples, metric);
    for (sample, &label) in samples.axis_iter(Axis(0)).zip(labels.iter()) {
        clusters[label].add_sample(sample)?;
    }
    for cluster in clusters.iter_mut() {
        cluster.compute_sum_of_norms(metric);
    }

    let elapsed = start.elapsed().as_secs_f64();
    if config.verbose {
        info!(
            "  Finished after {} iterations ({:.4}s), converged = {}",
            n_iterations, elapsed, converged
        );
    } else {
        debug!(
            "k-means with k = {} over {} samples: {} iterations, {:.4}s",
            k,
            samples.nrows(),
            n_iterations,
            elapsed
        );
    }

    Ok(SolveOutcome {
        clusters,
        n_iterations,
        converged,
        stats,
    })
}

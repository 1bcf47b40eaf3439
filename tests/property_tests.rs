//! Property-based tests for the clustering components.
//!
//! These tests verify invariants that should hold regardless of input:
//! - The filtering update moves centers exactly like the brute-force update
//! - Converged runs of both updates label every sample the same way
//! - Every sample ends up in the cluster with the nearest center
//! - The kd-tree summarizes its samples correctly
//! - Sums of norms match a direct recomputation

use fastxmeans_rs::{
    euclidean_distance, nearest_cluster_id, Cluster, Clustering, Euclidean, IndexNode,
    KMeansClustering, KMeansConfig, KdTree, SpatialIndex, UpdateStrategy,
};
use ndarray::{s, Array1, Array2, Axis};
use proptest::prelude::*;

prop_compose! {
    fn arb_samples(max_dim: usize, max_n: usize)
        (dim in 1..=max_dim, n in 2..=max_n)
        (
            rows in prop::collection::vec(prop::collection::vec(-50.0f64..50.0, dim), n),
            dim in Just(dim),
        )
        -> Array2<f64>
    {
        let n = rows.len();
        Array2::from_shape_vec((n, dim), rows.into_iter().flatten().collect()).unwrap()
    }
}

prop_compose! {
    /// Small integer coordinates, so that duplicates and equidistant samples are common
    fn arb_grid_samples(max_dim: usize, max_n: usize)
        (dim in 1..=max_dim, n in 2..=max_n)
        (
            rows in prop::collection::vec(prop::collection::vec(0i32..8, dim), n),
            dim in Just(dim),
        )
        -> Array2<f64>
    {
        let n = rows.len();
        let values = rows.into_iter().flatten().map(f64::from).collect();
        Array2::from_shape_vec((n, dim), values).unwrap()
    }
}

fn clustering_from_first_rows(
    samples: &Array2<f64>,
    k: usize,
    config: &KMeansConfig,
) -> KMeansClustering {
    let positions = samples.slice(s![..k, ..]).to_owned();
    let (view, start) = (samples.view(), positions.view());
    KMeansClustering::from_positions(&view, &start, &Euclidean, config).unwrap()
}

/// Run k-means to convergence with both update strategies from the same start
fn converge_both(samples: &Array2<f64>, k: usize) -> (KMeansClustering, KMeansClustering) {
    let filtering = KMeansConfig::default();
    let brute_force = filtering.clone().with_update(UpdateStrategy::BruteForce);

    let a = clustering_from_first_rows(samples, k, &filtering);
    let b = clustering_from_first_rows(samples, k, &brute_force);
    (a, b)
}

fn assert_same_partition(
    a: &KMeansClustering,
    b: &KMeansClustering,
    samples: &Array2<f64>,
) -> Result<(), TestCaseError> {
    for (ca, cb) in a.clusters().iter().zip(b.clusters()) {
        let gap = euclidean_distance(ca.center(), cb.center());
        prop_assert!(gap < 1e-9, "centers differ by {}", gap);
        prop_assert_eq!(ca.len(), cb.len());
    }

    let labels_a: Array1<usize> = a.predict(&samples.view(), &Euclidean);
    let labels_b: Array1<usize> = b.predict(&samples.view(), &Euclidean);
    prop_assert_eq!(labels_a, labels_b);
    Ok(())
}

mod update_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn filtering_step_matches_brute_force(
            samples in arb_samples(4, 80),
            k in 1usize..6,
        ) {
            let k = k.min(samples.nrows());
            let filtering = KMeansConfig::default().with_max_iters(1);
            let brute_force = filtering.clone().with_update(UpdateStrategy::BruteForce);

            let a = clustering_from_first_rows(&samples, k, &filtering);
            let b = clustering_from_first_rows(&samples, k, &brute_force);

            for (ca, cb) in a.clusters().iter().zip(b.clusters()) {
                let gap = euclidean_distance(ca.center(), cb.center());
                prop_assert!(
                    gap < 1e-8,
                    "centers differ by {}: {} vs {}",
                    gap,
                    ca.center(),
                    cb.center()
                );
            }
        }

        #[test]
        fn converged_partitions_match(
            samples in arb_samples(3, 60),
            k in 1usize..5,
        ) {
            let k = k.min(samples.nrows());
            let (a, b) = converge_both(&samples, k);
            assert_same_partition(&a, &b, &samples)?;
        }

        #[test]
        fn grid_partitions_match(
            samples in arb_grid_samples(3, 40),
            k in 1usize..5,
        ) {
            let k = k.min(samples.nrows());
            let (a, b) = converge_both(&samples, k);
            assert_same_partition(&a, &b, &samples)?;

            // Integer sums are exact, so both updates agree to the last bit
            prop_assert_eq!(a.centers(), b.centers());
            prop_assert_eq!(a.n_iterations(), b.n_iterations());
        }
    }
}

mod membership_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn samples_belong_to_nearest_cluster(
            samples in arb_samples(4, 80),
            k in 1usize..6,
        ) {
            let k = k.min(samples.nrows());
            let config = KMeansConfig::default();
            let view = samples.view();
            let clustering = KMeansClustering::new(k, &view, &Euclidean, &config).unwrap();
            let clusters = clustering.clusters();

            prop_assert_eq!(clusters.len(), k);
            let assigned: usize = clusters.iter().map(Cluster::len).sum();
            prop_assert_eq!(assigned, samples.nrows());

            for (i, cluster) in clusters.iter().enumerate() {
                for sample in cluster.samples().outer_iter() {
                    prop_assert_eq!(nearest_cluster_id(clusters, sample, &Euclidean), i);
                    prop_assert!(cluster.bounds().contains(sample));
                }
            }
        }

        #[test]
        fn sum_of_norms_matches_recomputation(
            samples in arb_samples(3, 50),
            k in 1usize..4,
        ) {
            let k = k.min(samples.nrows());
            let config = KMeansConfig::default();
            let view = samples.view();
            let clustering = KMeansClustering::new(k, &view, &Euclidean, &config).unwrap();

            for cluster in clustering.clusters() {
                let expected: f64 = cluster
                    .samples()
                    .outer_iter()
                    .map(|s| euclidean_distance(s, cluster.center()).powi(2))
                    .sum();
                let error = (cluster.sum_of_norms() - expected).abs();
                prop_assert!(error <= 1e-9 * (1.0 + expected));
            }
        }
    }
}

mod kdtree_props {
    use super::*;

    fn check_node<N: IndexNode>(node: &N) -> Result<(), TestCaseError> {
        prop_assert!(node.number_of_points() >= 1);
        prop_assert!(!node.bounding_box().is_empty());

        if let Some((left, right)) = node.children() {
            let count = left.number_of_points() + right.number_of_points();
            prop_assert_eq!(count, node.number_of_points());

            let sum = &left.sum_of_points() + &right.sum_of_points();
            prop_assert_eq!(sum.view(), node.sum_of_points());

            check_node(left)?;
            check_node(right)?;
        } else {
            prop_assert!(node.bounding_box().is_degenerate());
        }
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn tree_summarizes_samples(samples in arb_samples(4, 100)) {
            let tree = KdTree::new(&samples.view()).unwrap();
            let root = tree.root();

            prop_assert_eq!(tree.len(), samples.nrows());
            prop_assert_eq!(tree.dimension(), samples.ncols());

            let mean = samples.mean_axis(Axis(0)).unwrap();
            prop_assert!(euclidean_distance(root.center_of_mass(), mean.view()) < 1e-9);
            for sample in samples.outer_iter() {
                prop_assert!(root.bounding_box().contains(sample));
            }

            check_node(root)?;
        }

        #[test]
        fn grid_tree_sums_are_exact(samples in arb_grid_samples(3, 60)) {
            let tree = KdTree::new(&samples.view()).unwrap();
            let total = samples.sum_axis(Axis(0));

            prop_assert_eq!(tree.root().sum_of_points(), total.view());
            check_node(tree.root())?;
        }
    }
}

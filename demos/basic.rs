//! Basic example demonstrating fastxmeans-rs usage
//!
//! Run with: cargo run --example basic --release

use fastxmeans_rs::{
    Clustering, Euclidean, KMeansClustering, KMeansConfig, XMeansClustering, XMeansConfig,
};
use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

fn main() {
    println!("=== fastxmeans-rs example ===\n");

    // Generate synthetic data: 3 clusters in 2D for easy visualization
    let n_samples = 300;
    let n_features = 2;
    let n_clusters = 3;

    println!(
        "Generating {} samples with {} features...",
        n_samples, n_features
    );

    let mut data = Array2::<f64>::zeros((n_samples, n_features));
    let centers = [[-5.0, -5.0], [0.0, 5.0], [5.0, -5.0]];
    let noise = Array2::random((n_samples, n_features), Uniform::new(-1.0, 1.0));

    for i in 0..n_samples {
        let cluster_idx = i % 3;
        data[[i, 0]] = centers[cluster_idx][0] + noise[[i, 0]];
        data[[i, 1]] = centers[cluster_idx][1] + noise[[i, 1]];
    }

    println!("True cluster centers:");
    for (i, center) in centers.iter().enumerate() {
        println!("  Cluster {}: ({:.2}, {:.2})", i, center[0], center[1]);
    }
    println!();

    // k-means with a known number of clusters
    println!("Running k-means with k={}...\n", n_clusters);

    let config = KMeansConfig::default().with_seed(42);
    let kmeans = KMeansClustering::new(n_clusters, &data.view(), &Euclidean, &config)
        .expect("k-means failed");

    println!(
        "Converged: {} after {} iterations ({} of {} visited nodes pruned)",
        kmeans.converged(),
        kmeans.n_iterations(),
        kmeans.filter_stats().nodes_pruned,
        kmeans.filter_stats().nodes_visited
    );
    println!("Learned centers:");
    for (i, cluster) in kmeans.clusters().iter().enumerate() {
        let center = cluster.center();
        println!(
            "  Center {}: ({:.4}, {:.4}) with {} samples",
            i,
            center[0],
            center[1],
            cluster.len()
        );
    }
    println!();

    // x-means without knowing the number of clusters
    let max_clusters = 10;
    println!("Running x-means with at most {} clusters...\n", max_clusters);

    let kmeans_config = KMeansConfig::default().with_seed(42);
    let config = XMeansConfig::new(max_clusters).with_kmeans(kmeans_config);
    let mut xmeans = XMeansClustering::new(&data.view(), &Euclidean, &config)
        .expect("x-means failed");
    xmeans.sort();

    println!(
        "Found {} clusters in {} rounds:",
        xmeans.len(),
        xmeans.n_rounds()
    );
    for (i, cluster) in xmeans.clusters().iter().enumerate() {
        let center = cluster.center();
        println!(
            "  Cluster {}: ({:.4}, {:.4}), {} samples ({:.1}%)",
            i,
            center[0],
            center[1],
            cluster.len(),
            (cluster.len() as f64 / n_samples as f64) * 100.0
        );
    }
    println!();

    // Predict labels
    let labels = xmeans.predict(&data.view(), &Euclidean);

    println!("First 10 sample assignments:");
    for i in 0..10 {
        println!(
            "  Sample {} at ({:.2}, {:.2}) -> Cluster {}",
            i,
            data[[i, 0]],
            data[[i, 1]],
            labels[i]
        );
    }

    println!("\n=== Done! ===");
}

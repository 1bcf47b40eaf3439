//! Binary for clustering samples stored in a .npy file with x-means
//!
//! This binary reads a 2-D float64 array from a .npy file, runs x-means
//! clustering and saves the resulting cluster centers, largest cluster first,
//! to another .npy file.
//!
//! Usage: `cluster-npy <input.npy> <output.npy> <max_clusters> [seed]`

use fastxmeans_rs::{Clustering, Euclidean, KMeansConfig, XMeansClustering, XMeansConfig};
use ndarray::Array2;
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 4 && args.len() != 5 {
        eprintln!(
            "Usage: {} <input.npy> <output.npy> <max_clusters> [seed]",
            args[0]
        );
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let max_clusters: usize = args[3].parse()?;
    let seed: u64 = match args.get(4) {
        Some(seed) => seed.parse()?,
        None => 0,
    };

    // Read input data
    let reader = BufReader::new(File::open(input_path)?);
    let data: Array2<f64> = Array2::read_npy(reader)?;

    eprintln!(
        "Loaded data: {} samples x {} features",
        data.nrows(),
        data.ncols()
    );
    eprintln!(
        "Running x-means with max_clusters={}, seed={}",
        max_clusters, seed
    );

    let kmeans = KMeansConfig::default().with_seed(seed);
    let config = XMeansConfig::new(max_clusters).with_kmeans(kmeans);

    let start = Instant::now();
    let mut clustering = XMeansClustering::new(&data.view(), &Euclidean, &config)?;
    clustering.sort();
    eprintln!(
        "Found {} clusters in {} rounds ({:.3}s)",
        clustering.len(),
        clustering.n_rounds(),
        start.elapsed().as_secs_f64()
    );

    for (i, cluster) in clustering.clusters().iter().enumerate() {
        eprintln!(
            "  Cluster {}: {} samples, sum of norms {:.4}",
            i,
            cluster.len(),
            cluster.sum_of_norms()
        );
    }

    // Save centers
    let centers = clustering.centers();
    let writer = File::create(output_path)?;
    centers.write_npy(writer)?;

    eprintln!("Saved centers {:?} to {}", centers.shape(), output_path);

    Ok(())
}

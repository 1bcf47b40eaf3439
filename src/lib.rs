//! # fastxmeans-rs
//!
//! k-means and x-means clustering on ndarray samples, accelerated by a
//! kd-tree over the samples.
//!
//! ## Features
//!
//! - **Filtering algorithm**: Whole kd-tree nodes are assigned to a center at
//!   once when that center provably owns the node's bounding box
//! - **Automatic k**: x-means grows the number of clusters as long as the
//!   Bayesian Information Criterion favours splitting
//! - **Pluggable metric**: Any [`Metric`] (Euclidean by default) and any
//!   [`SpatialIndex`] can be used
//! - **Parallel computation**: Uses rayon for the final sample assignment
//!   and for predictions
//!
//! ## Example
//!
//! ```rust
//! use fastxmeans_rs::{Clustering, Euclidean, KMeansClustering, KMeansConfig};
//! use ndarray::Array2;
//! use ndarray_rand::RandomExt;
//! use ndarray_rand::rand_distr::Uniform;
//!
//! // Generate random data
//! let data = Array2::random((1000, 8), Uniform::new(-1.0, 1.0));
//!
//! // Cluster into 10 clusters
//! let config = KMeansConfig::default();
//! let clustering = KMeansClustering::new(10, &data.view(), &Euclidean, &config).unwrap();
//!
//! // Get cluster assignments
//! let labels = clustering.predict(&data.view(), &Euclidean);
//! assert_eq!(labels.len(), 1000);
//! ```
//!
//! ## Choosing k automatically
//!
//! ```rust
//! use fastxmeans_rs::{Clustering, Euclidean, KMeansConfig, XMeansClustering, XMeansConfig};
//! use ndarray::Array2;
//! use ndarray_rand::RandomExt;
//! use ndarray_rand::rand_distr::Uniform;
//!
//! let data = Array2::random((500, 3), Uniform::new(0.0, 1.0));
//!
//! let config = XMeansConfig::new(20)
//!     .with_kmeans(KMeansConfig::default().with_max_iters(200).with_seed(42));
//!
//! let mut clustering = XMeansClustering::new(&data.view(), &Euclidean, &config).unwrap();
//! clustering.sort();
//! assert!(clustering.len() >= 1 && clustering.len() <= 20);
//! ```

mod algorithm;
mod bounds;
mod cluster;
mod clustering;
mod config;
mod distance;
mod error;
mod kdtree;
mod kmeans;
mod xmeans;

pub use algorithm::FilterStats;
pub use bounds::BoundingBox;
pub use cluster::{Cluster, ClusterUpdate};
pub use clustering::{nearest_cluster_id, Clustering};
pub use config::{EmptyClusterPolicy, InitStrategy, KMeansConfig, UpdateStrategy, XMeansConfig};
pub use distance::{
    euclidean_distance, manhattan_distance, squared_euclidean_distance, Euclidean, Manhattan,
    Metric, SquaredEuclidean,
};
pub use error::{ClusteringError, Result};
pub use kdtree::{IndexNode, KdNode, KdTree, SpatialIndex};
pub use kmeans::KMeansClustering;
pub use xmeans::{compute_bic, XMeansClustering};

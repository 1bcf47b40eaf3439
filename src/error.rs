use thiserror::Error;

/// Error types for the fastxmeans-rs library
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusteringError {
    /// The number of clusters k is invalid (must be > 0)
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// The upper bound on the number of clusters is invalid (must be > 0)
    #[error("Invalid maximum number of clusters: {0}")]
    InvalidMaxClusters(String),

    /// No samples were given
    #[error("Cannot cluster an empty sample set")]
    EmptyData,

    /// Not enough data points for the requested number of clusters
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Dimension mismatch between samples, positions or clusters
    #[error("Dimension mismatch: {0}")]
    InvalidDimensions(String),

    /// A pre-built spatial index does not describe the given samples
    #[error("Spatial index mismatch: {0}")]
    IndexMismatch(String),

    /// A sample contains NaN or an infinite coordinate
    #[error("Sample {index} has a non-finite coordinate")]
    NonFiniteSample { index: usize },
}

/// Convenient alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, ClusteringError>;

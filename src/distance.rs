use ndarray::ArrayView1;

/// A distance function between two samples of equal dimension.
///
/// Implementations must be symmetric and non-negative. The pruning performed
/// by the filtering update is exact for the Euclidean family of metrics; other
/// metrics still work, but the pruned result is only an approximation of the
/// brute-force assignment.
///
/// Any `Fn(ArrayView1<f64>, ArrayView1<f64>) -> f64` closure or function is a
/// metric as well:
///
/// ```
/// use fastxmeans_rs::Metric;
/// use ndarray::{array, ArrayView1};
///
/// fn chebyshev(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
///     a.iter().zip(b.iter()).fold(0.0, |m, (x, y)| m.max((x - y).abs()))
/// }
///
/// let a = array![0.0, 0.0];
/// let b = array![3.0, -4.0];
/// assert_eq!(chebyshev.distance(a.view(), b.view()), 4.0);
/// ```
pub trait Metric: Sync {
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64;
}

impl<F> Metric for F
where
    F: Fn(ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64 + Sync,
{
    #[inline]
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        self(a, b)
    }
}

/// The (unsquared) Euclidean distance, the default metric
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Metric for Euclidean {
    #[inline]
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        euclidean_distance(a, b)
    }
}

/// The squared Euclidean distance
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclidean;

impl Metric for SquaredEuclidean {
    #[inline]
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        squared_euclidean_distance(a, b)
    }
}

/// The L1 (city block) distance
#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl Metric for Manhattan {
    #[inline]
    fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        manhattan_distance(a, b)
    }
}

/// Squared L2 distance between two vectors
#[inline]
pub fn squared_euclidean_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// L2 distance between two vectors
#[inline]
pub fn euclidean_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    squared_euclidean_distance(a, b).sqrt()
}

/// L1 distance between two vectors
#[inline]
pub fn manhattan_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

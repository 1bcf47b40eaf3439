use ndarray::{Array1, ArrayView1, ArrayView2, Zip};

/// Axis-aligned bounding box of a set of samples.
///
/// A freshly created box is empty (`min = +inf`, `max = -inf` in every
/// dimension) and grows monotonically as points are added.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    min: Array1<f64>,
    max: Array1<f64>,
}

impl BoundingBox {
    /// Create an empty box in `dimension` dimensions
    pub fn new(dimension: usize) -> Self {
        Self {
            min: Array1::from_elem(dimension, f64::INFINITY),
            max: Array1::from_elem(dimension, f64::NEG_INFINITY),
        }
    }

    /// Create the bounding box of all rows of `samples`
    pub fn from_samples(samples: &ArrayView2<'_, f64>) -> Self {
        let mut bounds = Self::new(samples.ncols());
        for sample in samples.outer_iter() {
            bounds.add(sample);
        }
        bounds
    }

    /// Lower corner
    #[inline]
    pub fn min(&self) -> ArrayView1<'_, f64> {
        self.min.view()
    }

    /// Upper corner
    #[inline]
    pub fn max(&self) -> ArrayView1<'_, f64> {
        self.max.view()
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.min.len()
    }

    /// Whether no point has been added yet
    pub fn is_empty(&self) -> bool {
        self.min.iter().zip(self.max.iter()).any(|(lo, hi)| lo > hi)
    }

    /// Grow the box so that it contains `point`
    pub fn add(&mut self, point: ArrayView1<'_, f64>) {
        debug_assert_eq!(point.len(), self.dimension());
        Zip::from(&mut self.min)
            .and(&mut self.max)
            .and(&point)
            .for_each(|lo, hi, &x| {
                *lo = lo.min(x);
                *hi = hi.max(x);
            });
    }

    /// Per-dimension size of the box, zero for an empty box
    pub fn extent(&self) -> Array1<f64> {
        Zip::from(&self.min)
            .and(&self.max)
            .map_collect(|&lo, &hi| (hi - lo).max(0.0))
    }

    /// Index of the dimension with the largest extent. The first such
    /// dimension wins ties.
    pub fn widest_dimension(&self) -> usize {
        let extent = self.extent();
        let mut widest = 0;
        for (i, &e) in extent.iter().enumerate() {
            if e > extent[widest] {
                widest = i;
            }
        }
        widest
    }

    /// Whether the box has zero extent in every dimension
    pub fn is_degenerate(&self) -> bool {
        !self.is_empty() && self.min == self.max
    }

    pub fn contains(&self, point: ArrayView1<'_, f64>) -> bool {
        Zip::from(&self.min)
            .and(&self.max)
            .and(&point)
            .all(|&lo, &hi, &x| lo <= x && x <= hi)
    }

    /// Write the point of the box closest to `point` into `out`
    /// (per-dimension clipping).
    pub fn clip_into(&self, point: ArrayView1<'_, f64>, out: &mut Array1<f64>) {
        Zip::from(out)
            .and(&point)
            .and(&self.min)
            .and(&self.max)
            .for_each(|c, &x, &lo, &hi| *c = x.max(lo).min(hi));
    }

    /// Write the corner of the box lying farthest towards `towards` as seen
    /// from `from` into `out`: per dimension the upper bound where `towards`
    /// is greater than `from`, the lower bound otherwise.
    pub fn extreme_corner_into(
        &self,
        from: ArrayView1<'_, f64>,
        towards: ArrayView1<'_, f64>,
        out: &mut Array1<f64>,
    ) {
        Zip::from(out)
            .and(&self.min)
            .and(&self.max)
            .and(&from)
            .and(&towards)
            .for_each(|c, &lo, &hi, &f, &t| *c = if t > f { hi } else { lo });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn unit_box() -> BoundingBox {
        BoundingBox::from_samples(&array![[0.0, 0.0], [1.0, 1.0]].view())
    }

    #[test]
    fn test_empty_box() {
        let bounds = BoundingBox::new(3);
        assert!(bounds.is_empty());
        assert!(!bounds.is_degenerate());
        assert_eq!(bounds.extent(), array![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_from_samples() {
        let samples = array![[1.0, 5.0], [-2.0, 3.0], [0.5, 7.0]];
        let bounds = BoundingBox::from_samples(&samples.view());

        assert_eq!(bounds.min(), array![-2.0, 3.0].view());
        assert_eq!(bounds.max(), array![1.0, 7.0].view());
        assert_eq!(bounds.widest_dimension(), 1);
        assert!(bounds.contains(array![0.0, 4.0].view()));
        assert!(!bounds.contains(array![0.0, 8.0].view()));
    }

    #[test]
    fn test_widest_dimension_tie() {
        let samples = array![[0.0, 0.0], [1.0, 1.0]];
        let bounds = BoundingBox::from_samples(&samples.view());
        assert_eq!(bounds.widest_dimension(), 0);
    }

    #[test]
    fn test_degenerate() {
        let samples = array![[2.0, 2.0], [2.0, 2.0]];
        assert!(BoundingBox::from_samples(&samples.view()).is_degenerate());
    }

    #[test]
    fn test_clip_into() {
        let bounds = unit_box();
        let mut out = Array1::zeros(2);

        bounds.clip_into(array![2.0, 0.5].view(), &mut out);
        assert_eq!(out, array![1.0, 0.5]);
        bounds.clip_into(array![-3.0, -1.0].view(), &mut out);
        assert_eq!(out, array![0.0, 0.0]);
        bounds.clip_into(array![0.25, 0.75].view(), &mut out);
        assert_eq!(out, array![0.25, 0.75]);
    }

    #[test]
    fn test_extreme_corner_into() {
        let bounds = BoundingBox::from_samples(&array![[0.0, 0.0], [1.0, 2.0]].view());
        let from = array![0.0, 5.0];
        let towards = array![3.0, -1.0];
        let mut out = Array1::zeros(2);

        bounds.extreme_corner_into(from.view(), towards.view(), &mut out);
        assert_eq!(out, array![1.0, 0.0]);
        bounds.extreme_corner_into(towards.view(), from.view(), &mut out);
        assert_eq!(out, array![0.0, 2.0]);
    }

    #[test]
    fn test_buffers_are_fully_overwritten() {
        let bounds = unit_box();
        let mut out = array![1e9, -1e9];

        bounds.clip_into(array![0.5, 0.5].view(), &mut out);
        assert_eq!(out, array![0.5, 0.5]);

        let mut out = array![f64::NAN, f64::NAN];
        let from = array![0.5, 0.5];
        bounds.extreme_corner_into(from.view(), array![-2.0, 3.0].view(), &mut out);
        assert_eq!(out, array![0.0, 1.0]);
    }
}

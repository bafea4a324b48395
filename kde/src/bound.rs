//! Axis-aligned hyper-rectangle bounds.
//!
//! Distance bounds are computed from per-axis gaps (for the minimum) and per-axis spans (for the
//! maximum) and handed to [`Metric::norm`], so they hold for every L_p metric.

use crate::data::Dataset;
use crate::metric::Metric;

pub trait Bound {

    fn min_distance<M: Metric>(&self, other: &Self, metric: &M) -> f64;

    fn max_distance<M: Metric>(&self, other: &Self, metric: &M) -> f64;

    fn min_distance_to_point<M: Metric>(&self, point: &[f64], metric: &M) -> f64;

    fn max_distance_to_point<M: Metric>(&self, point: &[f64], metric: &M) -> f64;
}

#[derive(Debug, PartialEq, Clone)]
pub struct HRectBound {
    pub ranges: Vec<(f64, f64)>,
}

impl HRectBound {

    pub fn empty(dimension: usize) -> Self {
        Self { ranges: vec![(f64::INFINITY, f64::NEG_INFINITY); dimension] }
    }

    /// Smallest rectangle holding the points of `dataset` listed in `indices`.
    pub fn from_indices(dataset: &Dataset, indices: &[usize]) -> Self {

        let mut bound = Self::empty(dataset.dimension());
        for &i in indices {
            bound.expand(dataset.point(i));
        }

        return bound;
    }

    pub fn expand(&mut self, point: &[f64]) {

        for (range, x) in self.ranges.iter_mut().zip(point.iter()) {
            range.0 = f64::min(range.0, *x);
            range.1 = f64::max(range.1, *x);
        }
    }

    pub fn dimension(&self) -> usize {
        self.ranges.len()
    }

    pub fn width(&self, axis: usize) -> f64 {

        let (lo, hi) = self.ranges[axis];
        match hi >= lo {
            true => hi - lo,
            false => 0.0,
        }
    }

    /// Axis with the largest extent; ties go to the lowest axis.
    pub fn widest_axis(&self) -> usize {

        let mut best_axis = 0;
        let mut best_width = f64::NEG_INFINITY;
        for axis in 0..self.dimension() {
            let width = self.width(axis);
            if width > best_width {
                best_axis = axis;
                best_width = width;
            }
        }

        return best_axis;
    }

    pub fn contains(&self, point: &[f64]) -> bool {
        self.ranges.iter().zip(point.iter()).all(|(range, x)| *x >= range.0 && *x <= range.1)
    }
}

impl Bound for HRectBound {

    fn min_distance<M: Metric>(&self, other: &Self, metric: &M) -> f64 {

        let gaps: Vec<f64> = self
            .ranges
            .iter()
            .zip(other.ranges.iter())
            .map(|(a, b)| f64::max(0.0, f64::max(b.0 - a.1, a.0 - b.1)))
            .collect();

        metric.norm(&gaps)
    }

    fn max_distance<M: Metric>(&self, other: &Self, metric: &M) -> f64 {

        let spans: Vec<f64> = self
            .ranges
            .iter()
            .zip(other.ranges.iter())
            .map(|(a, b)| f64::max(b.1 - a.0, a.1 - b.0))
            .collect();

        metric.norm(&spans)
    }

    fn min_distance_to_point<M: Metric>(&self, point: &[f64], metric: &M) -> f64 {

        let gaps: Vec<f64> = self
            .ranges
            .iter()
            .zip(point.iter())
            .map(|(range, x)| f64::max(0.0, f64::max(x - range.1, range.0 - x)))
            .collect();

        metric.norm(&gaps)
    }

    fn max_distance_to_point<M: Metric>(&self, point: &[f64], metric: &M) -> f64 {

        let spans: Vec<f64> = self
            .ranges
            .iter()
            .zip(point.iter())
            .map(|(range, x)| f64::max((x - range.0).abs(), (x - range.1).abs()))
            .collect();

        metric.norm(&spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{EuclideanDistance, ManhattanDistance};
    use assert_approx_eq::assert_approx_eq;

    fn rect(ranges: &[(f64, f64)]) -> HRectBound {
        HRectBound { ranges: ranges.to_vec() }
    }

    #[test]
    fn disjoint_rectangles() {

        let a = rect(&[(0.0, 1.0), (0.0, 1.0)]);
        let b = rect(&[(4.0, 5.0), (5.0, 6.0)]);

        assert_approx_eq!(a.min_distance(&b, &EuclideanDistance), 5.0);
        assert_approx_eq!(a.max_distance(&b, &EuclideanDistance), (61.0f64).sqrt());
        assert_approx_eq!(a.min_distance(&b, &ManhattanDistance), 7.0);
        assert_approx_eq!(a.max_distance(&b, &ManhattanDistance), 11.0);
    }

    #[test]
    fn overlapping_rectangles_have_zero_min() {

        let a = rect(&[(0.0, 2.0), (0.0, 2.0)]);
        let b = rect(&[(1.0, 3.0), (1.0, 3.0)]);

        assert_eq!(a.min_distance(&b, &EuclideanDistance), 0.0);
        assert_approx_eq!(a.max_distance(&b, &EuclideanDistance), (18.0f64).sqrt());
    }

    #[test]
    fn point_bounds_bracket_real_distances() {

        let points = vec![vec![0.1, 0.2], vec![0.8, 0.3], vec![0.5, 0.9]];
        let ds = Dataset::from_points(&points).unwrap();
        let bound = HRectBound::from_indices(&ds, &[0, 1, 2]);
        let query = [2.0, -1.0];

        let lo = bound.min_distance_to_point(&query, &EuclideanDistance);
        let hi = bound.max_distance_to_point(&query, &EuclideanDistance);

        for point in ds.points() {
            let d = EuclideanDistance.distance(point, &query);
            assert!(lo <= d && d <= hi);
            assert!(bound.contains(point));
        }
    }

    #[test]
    fn widest_axis() {

        let a = rect(&[(0.0, 1.0), (0.0, 3.0), (0.0, 2.0)]);
        assert_eq!(a.widest_axis(), 1);
        assert_eq!(HRectBound::empty(2).width(0), 0.0);
    }
}

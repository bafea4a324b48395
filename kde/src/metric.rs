//! Distance metrics.
//!
//! Every metric here is an L_p norm of the coordinate differences. [`Metric::norm`] is what lets a
//! hyper-rectangle turn per-axis gaps into distance bounds without knowing which metric is in use.

pub trait Metric {

    fn distance(&self, a: &[f64], b: &[f64]) -> f64;

    /// Norm of a vector of non-negative per-axis offsets. Must be monotone in every coordinate.
    fn norm(&self, offsets: &[f64]) -> f64;
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct EuclideanDistance;

impl Metric for EuclideanDistance {

    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {

        let mut sum: f64 = 0.0;
        for (x, y) in a.iter().zip(b.iter()) {
            sum += (x - y) * (x - y);
        }

        return sum.sqrt();
    }

    fn norm(&self, offsets: &[f64]) -> f64 {
        offsets.iter().map(|x| x * x).sum::<f64>().sqrt()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ManhattanDistance;

impl Metric for ManhattanDistance {

    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
    }

    fn norm(&self, offsets: &[f64]) -> f64 {
        offsets.iter().map(|x| x.abs()).sum()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ChebyshevDistance;

impl Metric for ChebyshevDistance {

    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b.iter()).fold(0.0, |acc, (x, y)| f64::max(acc, (x - y).abs()))
    }

    fn norm(&self, offsets: &[f64]) -> f64 {
        offsets.iter().fold(0.0, |acc, x| f64::max(acc, x.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn known_distances() {

        let a = [0.0, 0.0, 0.0];
        let b = [1.0, 2.0, 2.0];

        assert_approx_eq!(EuclideanDistance.distance(&a, &b), 3.0);
        assert_approx_eq!(ManhattanDistance.distance(&a, &b), 5.0);
        assert_approx_eq!(ChebyshevDistance.distance(&a, &b), 2.0);
    }

    #[test]
    fn norm_matches_distance_from_origin() {

        let offsets = [3.0, 4.0];
        let origin = [0.0, 0.0];

        assert_approx_eq!(EuclideanDistance.norm(&offsets), EuclideanDistance.distance(&origin, &offsets));
        assert_approx_eq!(ManhattanDistance.norm(&offsets), ManhattanDistance.distance(&origin, &offsets));
        assert_approx_eq!(ChebyshevDistance.norm(&offsets), ChebyshevDistance.distance(&origin, &offsets));
    }
}

//! Dense column-major point storage.
//!
//! A [`Dataset`] is a `dimension x len` matrix: every column is one point. Trees may hand back a
//! reordered copy together with an `old_from_new` permutation.

use rand::Rng;

use crate::error::Error;

#[derive(Debug, PartialEq, Clone)]
pub struct Dataset {
    data: Vec<f64>,
    dimension: usize,
    len: usize,
}

impl Dataset {

    /// Wraps a column-major buffer. `data.len()` must be a multiple of `dimension`.
    pub fn new(data: Vec<f64>, dimension: usize) -> Result<Self, Error> {

        if dimension == 0 {
            return Err(Error::Configuration("dataset dimension cannot be 0".to_string()));
        }

        if data.len() % dimension != 0 {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                found: data.len() % dimension,
            });
        }

        let len = data.len() / dimension;

        return Ok(Self { data, dimension, len });
    }

    pub fn from_points(points: &[Vec<f64>]) -> Result<Self, Error> {

        let dimension = match points.first() {
            None => return Err(Error::EmptyDataset("no points supplied".to_string())),
            Some(x) => x.len(),
        };

        let mut data: Vec<f64> = Vec::with_capacity(dimension * points.len());
        for point in points {
            if point.len() != dimension {
                return Err(Error::DimensionMismatch { expected: dimension, found: point.len() });
            }
            data.extend_from_slice(point);
        }

        return Self::new(data, dimension);
    }

    /// Uniformly distributed points in the unit hypercube.
    pub fn random(dimension: usize, len: usize) -> Result<Self, Error> {

        return Self::random_with_rng(dimension, len, &mut rand::thread_rng());
    }

    pub fn random_with_rng<R: Rng + ?Sized>(dimension: usize, len: usize, rng: &mut R) -> Result<Self, Error> {

        let data: Vec<f64> = (0..dimension * len).map(|_| rng.gen::<f64>()).collect();
        return Self::new(data, dimension);
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn point(&self, index: usize) -> &[f64] {

        let start = index * self.dimension;
        &self.data[start..start + self.dimension]
    }

    pub fn points(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.dimension)
    }

    /// Builds a new dataset whose `i`th column is column `order[i]` of this one.
    pub fn select(&self, order: &[usize]) -> Self {

        let mut data: Vec<f64> = Vec::with_capacity(order.len() * self.dimension);
        for &index in order {
            data.extend_from_slice(self.point(index));
        }

        return Self { data, dimension: self.dimension, len: order.len() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn columns_are_points() {

        let ds = Dataset::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.dimension(), 2);
        assert_eq!(ds.point(1), &[3.0, 4.0]);
        assert_eq!(ds.points().count(), 3);
    }

    #[test]
    fn ragged_buffers_are_rejected() {

        assert!(matches!(Dataset::new(vec![1.0, 2.0, 3.0], 2), Err(Error::DimensionMismatch { .. })));
        assert!(matches!(Dataset::new(vec![], 0), Err(Error::Configuration(_))));

        let ragged = vec![vec![0.0, 1.0], vec![2.0]];
        assert!(Dataset::from_points(&ragged).is_err());
        assert!(matches!(Dataset::from_points(&[]), Err(Error::EmptyDataset(_))));
    }

    #[test]
    fn select_reorders_columns() {

        let ds = Dataset::from_points(&[vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 2.0]]).unwrap();
        let reordered = ds.select(&[2, 0, 1]);

        assert_eq!(reordered.point(0), &[2.0, 2.0]);
        assert_eq!(reordered.point(1), &[0.0, 0.0]);
        assert_eq!(reordered.point(2), &[1.0, 1.0]);
    }

    #[test]
    fn random_points_stay_in_unit_cube() {

        let mut rng = StdRng::seed_from_u64(7);
        let ds = Dataset::random_with_rng(3, 50, &mut rng).unwrap();

        assert_eq!(ds.len(), 50);
        for point in ds.points() {
            for x in point {
                assert!(*x >= 0.0 && *x < 1.0);
            }
        }
    }

    #[test]
    fn random_needs_a_dimension() {

        assert!(matches!(Dataset::random(0, 50), Err(Error::Configuration(_))));
        assert!(matches!(Dataset::random_with_rng(0, 0, &mut StdRng::seed_from_u64(1)), Err(Error::Configuration(_))));
    }
}

//! Smoothing kernels.
//!
//! All kernels are functions of distance only, take their maximum at distance 0 and never increase
//! with distance. That shape is what makes [`Kernel::bounds`] a simple swap of the distance bounds.

use crate::error::Error;

pub trait Kernel {

    fn with_bandwidth(bandwidth: f64) -> Self
    where
        Self: Sized;

    fn bandwidth(&self) -> f64;

    fn evaluate(&self, distance: f64) -> f64;

    /// Returns `(min_weight, max_weight)` over every distance in `[min_distance, max_distance]`.
    fn bounds(&self, min_distance: f64, max_distance: f64) -> (f64, f64) {
        (self.evaluate(max_distance), self.evaluate(min_distance))
    }
}

pub fn check_bandwidth(bandwidth: f64) -> Result<(), Error> {

    match bandwidth.is_finite() && bandwidth > 0.0 {
        true => Ok(()),
        false => Err(Error::Configuration(format!(
            "kernel bandwidth must be a finite value greater than 0, got {}",
            bandwidth
        ))),
    }
}

/// `exp(-d^2 / 2h^2)`, unnormalized.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    bandwidth: f64,
    gamma: f64,
}

impl Kernel for GaussianKernel {

    fn with_bandwidth(bandwidth: f64) -> Self {
        Self { bandwidth, gamma: -0.5 / (bandwidth * bandwidth) }
    }

    fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    fn evaluate(&self, distance: f64) -> f64 {
        (self.gamma * distance * distance).exp()
    }
}

/// `max(0, 1 - d^2 / h^2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EpanechnikovKernel {
    bandwidth: f64,
}

impl Kernel for EpanechnikovKernel {

    fn with_bandwidth(bandwidth: f64) -> Self {
        Self { bandwidth }
    }

    fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    fn evaluate(&self, distance: f64) -> f64 {

        let u = distance / self.bandwidth;
        f64::max(0.0, 1.0 - u * u)
    }
}

/// `max(0, 1 - d / h)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangularKernel {
    bandwidth: f64,
}

impl Kernel for TriangularKernel {

    fn with_bandwidth(bandwidth: f64) -> Self {
        Self { bandwidth }
    }

    fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    fn evaluate(&self, distance: f64) -> f64 {
        f64::max(0.0, 1.0 - distance / self.bandwidth)
    }
}

/// 1 inside the bandwidth, 0 outside.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalKernel {
    bandwidth: f64,
}

impl Kernel for SphericalKernel {

    fn with_bandwidth(bandwidth: f64) -> Self {
        Self { bandwidth }
    }

    fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    fn evaluate(&self, distance: f64) -> f64 {
        match distance <= self.bandwidth {
            true => 1.0,
            false => 0.0,
        }
    }
}

/// `exp(-d / h)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LaplacianKernel {
    bandwidth: f64,
}

impl Kernel for LaplacianKernel {

    fn with_bandwidth(bandwidth: f64) -> Self {
        Self { bandwidth }
    }

    fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    fn evaluate(&self, distance: f64) -> f64 {
        (-distance / self.bandwidth).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn check_shape<K: Kernel>(kernel: &K) {

        assert_approx_eq!(kernel.evaluate(0.0), 1.0);

        let mut last = kernel.evaluate(0.0);
        for i in 1..100 {
            let value = kernel.evaluate(i as f64 * 0.05);
            assert!(value <= last);
            assert!(value >= 0.0);
            last = value;
        }

        let (min, max) = kernel.bounds(0.2, 0.9);
        assert!(min <= max);
        assert_approx_eq!(min, kernel.evaluate(0.9));
        assert_approx_eq!(max, kernel.evaluate(0.2));
    }

    #[test]
    fn kernels_are_monotone() {

        check_shape(&GaussianKernel::with_bandwidth(1.0));
        check_shape(&EpanechnikovKernel::with_bandwidth(1.5));
        check_shape(&TriangularKernel::with_bandwidth(0.7));
        check_shape(&SphericalKernel::with_bandwidth(0.5));
        check_shape(&LaplacianKernel::with_bandwidth(2.0));
    }

    #[test]
    fn gaussian_values() {

        let kernel = GaussianKernel::with_bandwidth(2.0);
        assert_approx_eq!(kernel.evaluate(2.0), (-0.5f64).exp());
        assert_eq!(kernel.bandwidth(), 2.0);
    }

    #[test]
    fn compact_support() {

        assert_eq!(EpanechnikovKernel::with_bandwidth(1.0).evaluate(1.5), 0.0);
        assert_eq!(TriangularKernel::with_bandwidth(1.0).evaluate(1.0), 0.0);
        assert_eq!(SphericalKernel::with_bandwidth(1.0).evaluate(1.0), 1.0);
        assert_eq!(SphericalKernel::with_bandwidth(1.0).evaluate(1.01), 0.0);
    }

    #[test]
    fn bandwidth_validation() {

        assert!(check_bandwidth(1.0).is_ok());
        assert!(check_bandwidth(0.0).is_err());
        assert!(check_bandwidth(-1.0).is_err());
        assert!(check_bandwidth(f64::NAN).is_err());
        assert!(check_bandwidth(f64::INFINITY).is_err());
    }
}

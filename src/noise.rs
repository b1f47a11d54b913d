#![allow(non_snake_case)]

//! Noise models.
//!
//! Process noise enters the CTRV model through the augmented state and is uncorrelated.
//! Measurement noise is additive and correlated in general.

use na::{allocator::Allocator, DefaultAllocator, Dim, DimName, MatrixN, RealField, VectorN};
use na::{Vector2, Vector3, U2, U3};
use nalgebra as na;

use crate::config::FilterConfig;

/// Independent noise of each element, as variances.
#[derive(Clone)]
pub struct UncorrelatedNoise<N: RealField, QD: Dim>
where
    DefaultAllocator: Allocator<N, QD>,
{
    /// Noise variance
    pub q: VectorN<N, QD>,
}

/// Additive measurement noise as a covariance matrix.
#[derive(Clone)]
pub struct CorrelatedNoise<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D>,
{
    /// Noise covariance
    pub Q: MatrixN<N, D>,
}

impl<N: RealField, QD: DimName> UncorrelatedNoise<N, QD>
where
    DefaultAllocator: Allocator<N, QD>,
{
    /// Creates an UncorrelatedNoise from the standard deviation of each element.
    pub fn from_std(std: &VectorN<N, QD>) -> Self {
        UncorrelatedNoise {
            q: std.component_mul(std),
        }
    }
}

impl<'a, N: RealField, QD: DimName> CorrelatedNoise<N, QD>
where
    DefaultAllocator: Allocator<N, QD, QD> + Allocator<N, QD>,
{
    /// Creates a CorrelatedNoise from an UncorrelatedNoise.
    pub fn from_uncorrelated(uncorrelated: &'a UncorrelatedNoise<N, QD>) -> Self {
        CorrelatedNoise {
            Q: MatrixN::from_diagonal(&uncorrelated.q),
        }
    }
}

/// Process noise of the CTRV model: longitudinal and yaw acceleration variances.
pub type ProcessNoise = UncorrelatedNoise<f64, U2>;

/// The fixed noises of the filter, derived once from a [`FilterConfig`].
#[derive(Clone)]
pub struct NoiseModels {
    pub process: ProcessNoise,
    pub lidar: CorrelatedNoise<f64, U2>,
    pub radar: CorrelatedNoise<f64, U3>,
}

impl NoiseModels {
    pub fn from_config(config: &FilterConfig) -> Self {
        let process = UncorrelatedNoise::from_std(&Vector2::new(config.std_a, config.std_yawdd));
        let lidar = UncorrelatedNoise::from_std(&Vector2::new(config.std_laspx, config.std_laspy));
        let radar = UncorrelatedNoise::from_std(&Vector3::new(config.std_radr, config.std_radphi, config.std_radrd));
        NoiseModels {
            process,
            lidar: CorrelatedNoise::from_uncorrelated(&lidar),
            radar: CorrelatedNoise::from_uncorrelated(&radar),
        }
    }
}

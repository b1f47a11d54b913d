#![allow(non_snake_case)]

//! Estimation models.
//!
//! State representations and measurements are modeled as structs.
//! Common estimation operations are defined as traits.

use std::fmt;
use std::str::FromStr;

use na::{allocator::Allocator, DefaultAllocator, Dim, DimName, MatrixMN, MatrixN, VectorN};
use na::{RealField, Vector2, Vector3, U5};
use nalgebra as na;

use crate::error::{EstimateError, Result};
use crate::estimators::unscented::PredictedPoints;

/// Dimension of the CTRV state: px, py, v, yaw, yaw_rate.
pub type StateDim = U5;

/// Kalman State.
///
/// Linear representation as a state vector and the state covariance (symmetric positive semi-definite) matrix.
#[derive(PartialEq, Clone)]
pub struct KalmanState<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// State vector
    pub x: VectorN<N, D>,
    /// State covariance matrix (symmetric positive semi-definite)
    pub X: MatrixN<N, D>,
}

/// The CTRV belief.
pub type CtrvState = KalmanState<f64, StateDim>;

/// A state estimator.
///
pub trait Estimator<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D>,
{
    /// The estimator's estimate of the system's state.
    fn state(&self) -> Result<VectorN<N, D>>;
}

/// A Kalman filter (estimator).
///
/// The linear Kalman state representation x,X is used to represent the system.
pub trait KalmanEstimator<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// Initialise the estimator with a KalmanState.
    fn init(&mut self, state: &KalmanState<N, D>) -> Result<N>;

    /// The estimator's estimate of the system's KalmanState.
    fn kalman_state(&self) -> Result<(N, KalmanState<N, D>)>;
}

/// A measurement update of the CTRV state.
///
/// Linear-Gaussian and sigma point updates share this interface. Both may use the
/// predicted sigma points retained from the last prediction.
pub trait MeasurementUpdate<ZD: DimName>
where
    DefaultAllocator: Allocator<f64, ZD>,
{
    /// Update `state` with the observation `z`.
    ///
    /// Returns the normalised innovation squared of the observation.
    /// On error `state` is unchanged.
    fn observe(&self, state: &mut CtrvState, predicted: &PredictedPoints, z: &VectorN<f64, ZD>) -> Result<f64>;
}

/// Linear observation model.
///
/// Observation is represented by an observation matrix.
#[derive(Clone)]
pub struct LinearObserveModel<N: RealField, D: Dim, ZD: Dim>
where
    DefaultAllocator: Allocator<N, ZD, D>,
{
    /// Observation matrix
    pub Hx: MatrixMN<N, ZD, D>,
}

/// The kind of sensor a measurement comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Linear position sensor, observes px, py.
    Lidar,
    /// Range, bearing and range rate sensor.
    Radar,
}

impl SensorKind {
    /// Number of values in a raw measurement of this sensor.
    pub fn dim(self) -> usize {
        match self {
            SensorKind::Lidar => 2,
            SensorKind::Radar => 3,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Lidar => f.write_str("lidar"),
            SensorKind::Radar => f.write_str("radar"),
        }
    }
}

impl FromStr for SensorKind {
    type Err = EstimateError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "l" | "lidar" | "laser" => Ok(SensorKind::Lidar),
            "r" | "radar" => Ok(SensorKind::Radar),
            _ => Err(EstimateError::UnknownSensor(tag.to_string())),
        }
    }
}

/// Raw measurement values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    /// px, py in m
    Lidar(Vector2<f64>),
    /// range in m, bearing in rad, range rate in m/s
    Radar(Vector3<f64>),
}

/// One observation from a sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementSample {
    pub raw: Observation,
    /// Microseconds
    pub timestamp: i64,
}

impl MeasurementSample {
    pub fn lidar(px: f64, py: f64, timestamp: i64) -> Self {
        MeasurementSample {
            raw: Observation::Lidar(Vector2::new(px, py)),
            timestamp,
        }
    }

    pub fn radar(rho: f64, phi: f64, rho_dot: f64, timestamp: i64) -> Self {
        MeasurementSample {
            raw: Observation::Radar(Vector3::new(rho, phi, rho_dot)),
            timestamp,
        }
    }

    /// Build a sample from untyped values, checking their number against the sensor and that they are finite.
    pub fn from_raw(sensor: SensorKind, values: &[f64], timestamp: i64) -> Result<Self> {
        if values.len() != sensor.dim() {
            return Err(EstimateError::DimensionMismatch {
                sensor,
                expected: sensor.dim(),
                found: values.len(),
            });
        }
        let sample = match sensor {
            SensorKind::Lidar => MeasurementSample::lidar(values[0], values[1], timestamp),
            SensorKind::Radar => MeasurementSample::radar(values[0], values[1], values[2], timestamp),
        };
        sample.validate()?;
        Ok(sample)
    }

    /// Checks all values are finite.
    pub fn validate(&self) -> Result<()> {
        let finite = match &self.raw {
            Observation::Lidar(z) => z.iter().all(|v| v.is_finite()),
            Observation::Radar(z) => z.iter().all(|v| v.is_finite()),
        };
        if finite {
            Ok(())
        } else {
            Err(EstimateError::InvalidMeasurement(self.sensor()))
        }
    }

    pub fn sensor(&self) -> SensorKind {
        match self.raw {
            Observation::Lidar(_) => SensorKind::Lidar,
            Observation::Radar(_) => SensorKind::Radar,
        }
    }
}

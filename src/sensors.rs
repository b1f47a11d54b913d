#![allow(non_snake_case)]

//! Sensor observation models.
//!
//! The lidar observes the position directly and is updated with the linear Kalman observation.
//! The radar observes range, bearing and range rate and is updated with the unscented observation.

use nalgebra::{Matrix2x5, Vector2, Vector3, Vector5, U2, U3, U5};

use crate::angle::{normalize_angle, weighted_circular_mean};
use crate::error::Result;
use crate::estimators::unscented::{self, PredictedPoints, SigmaWeights, UnscentedObserveModel};
use crate::models::{CtrvState, LinearObserveModel, MeasurementUpdate};
use crate::noise::CorrelatedNoise;

/// Below this range the line of sight, and so the range rate, is undefined.
pub const MIN_RANGE: f64 = 1e-6;

/// Bearing element of a radar observation
pub const BEARING: usize = 1;

/// Lidar: linear observation of px, py.
#[derive(Clone)]
pub struct LidarModel {
    pub obs: LinearObserveModel<f64, U5, U2>,
    pub noise: CorrelatedNoise<f64, U2>,
}

impl LidarModel {
    pub fn new(noise: CorrelatedNoise<f64, U2>) -> Self {
        LidarModel {
            obs: LinearObserveModel {
                Hx: Matrix2x5::new(
                    1., 0., 0., 0., 0., //
                    0., 1., 0., 0., 0.,
                ),
            },
            noise,
        }
    }
}

impl MeasurementUpdate<U2> for LidarModel {
    fn observe(&self, state: &mut CtrvState, _predicted: &PredictedPoints, z: &Vector2<f64>) -> Result<f64> {
        state.observe_linear(&self.obs, &self.noise, z)
    }
}

/// Radar: range, bearing and range rate observation.
#[derive(Clone)]
pub struct RadarModel {
    pub noise: CorrelatedNoise<f64, U3>,
}

impl RadarModel {
    pub fn new(noise: CorrelatedNoise<f64, U3>) -> Self {
        RadarModel { noise }
    }
}

impl UnscentedObserveModel<U3> for RadarModel {
    fn h(&self, x: &Vector5<f64>) -> Vector3<f64> {
        radar_observe(x)
    }

    fn normalize(&self, dz: &mut Vector3<f64>) {
        dz[BEARING] = normalize_angle(dz[BEARING]);
    }

    /// Bearing is averaged on the circle so points either side of +-pi do not cancel.
    /// Away from +-pi this approximates, but does not equal, the linear weighted mean.
    fn mean(&self, ZZ: &[Vector3<f64>], weights: &SigmaWeights) -> Vector3<f64> {
        let mut z = unscented::weighted_mean(ZZ, weights);
        z[BEARING] = weighted_circular_mean(weights.iter().zip(ZZ.iter().map(|zi| zi[BEARING])));
        z
    }
}

impl MeasurementUpdate<U3> for RadarModel {
    fn observe(&self, state: &mut CtrvState, predicted: &PredictedPoints, z: &Vector3<f64>) -> Result<f64> {
        unscented::observe_unscented(self, state, predicted, &self.noise, z)
    }
}

/// Range, bearing and range rate of a CTRV state seen from the origin.
pub fn radar_observe(x: &Vector5<f64>) -> Vector3<f64> {
    let (px, py, v, yaw) = (x[0], x[1], x[2], x[3]);

    let rho = px.hypot(py);
    let phi = py.atan2(px);
    let rho_dot = if rho < MIN_RANGE {
        0.
    } else {
        (px * yaw.cos() * v + py * yaw.sin() * v) / rho
    };
    Vector3::new(rho, phi, rho_dot)
}

/// Position of a range and bearing.
pub fn polar_to_cartesian(rho: f64, phi: f64) -> (f64, f64) {
    (rho * phi.cos(), rho * phi.sin())
}

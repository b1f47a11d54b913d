#![allow(non_snake_case)]

//! Constant turn rate and velocity (CTRV) prediction.
//!
//! The state is px, py, v, yaw, yaw_rate. The object moves at constant speed along a circular
//! arc of constant yaw rate. Longitudinal and yaw acceleration noise are part of the augmented
//! state and are propagated through the model with the unscented transform.

use log::trace;
use nalgebra::{Vector5, VectorN, U7};

use crate::error::Result;
use crate::estimators::unscented::{self, AugmentedPoints, PredictedPoints, SigmaWeights};
use crate::models::CtrvState;
use crate::noise::ProcessNoise;

/// Yaw rates at or below this use the straight line motion.
pub const YAW_RATE_EPSILON: f64 = 1e-3;

/// Predict an augmented point `dt` seconds ahead.
pub fn predict_point(xa: &VectorN<f64, U7>, dt: f64) -> Vector5<f64> {
    let (px, py, v, yaw, yawd) = (xa[0], xa[1], xa[2], xa[3], xa[4]);
    let (nu_a, nu_yawdd) = (xa[5], xa[6]);

    let (mut px_p, mut py_p) = if yawd.abs() > YAW_RATE_EPSILON {
        let yaw_p = yaw + yawd * dt;
        (
            px + v / yawd * (yaw_p.sin() - yaw.sin()),
            py + v / yawd * (yaw.cos() - yaw_p.cos()),
        )
    } else {
        (px + v * dt * yaw.cos(), py + v * dt * yaw.sin())
    };
    let mut v_p = v;
    let mut yaw_p = yaw + yawd * dt;
    let mut yawd_p = yawd;

    // Noise
    let half_dt2 = 0.5 * dt * dt;
    px_p += nu_a * half_dt2 * yaw.cos();
    py_p += nu_a * half_dt2 * yaw.sin();
    v_p += nu_a * dt;
    yaw_p += nu_yawdd * half_dt2;
    yawd_p += nu_yawdd * dt;

    Vector5::new(px_p, py_p, v_p, yaw_p, yawd_p)
}

/// Predict all augmented points.
pub fn predict_points(UU: &AugmentedPoints, weights: SigmaWeights, dt: f64) -> PredictedPoints {
    PredictedPoints {
        points: std::array::from_fn(|i| predict_point(&UU[i], dt)),
        weights,
    }
}

/// Unscented CTRV predictor with augmented process noise.
#[derive(Clone)]
pub struct CtrvPredictor {
    pub noise: ProcessNoise,
    pub weights: SigmaWeights,
}

impl CtrvPredictor {
    pub fn new(noise: ProcessNoise) -> Self {
        CtrvPredictor {
            noise,
            weights: SigmaWeights::ctrv(),
        }
    }

    /// The predicted state `dt` seconds after `state`, and the predicted points it was recovered from.
    ///
    /// Fails if the augmented covariance is not positive definite.
    pub fn predict(&self, state: &CtrvState, dt: f64) -> Result<(CtrvState, PredictedPoints)> {
        let aug = unscented::augment(state, &self.noise);
        let UU = unscented::unscented(&aug, &self.weights)?;
        let predicted = predict_points(&UU, self.weights, dt);
        let xX = unscented::kalman(&predicted);
        trace!("predict dt={:.6} x={:?}", dt, xX.x.as_slice());
        Ok((xX, predicted))
    }
}

#![allow(non_snake_case)]

//! Julier-Uhlmann 'Unscented' state estimation.
//!
//! Uses the [`KalmanState`] linear representation of the system.
//! The 'Unscented' transform is used for the non-linear CTRV prediction and for non-linear observations.
//!
//! The state is augmented with the process noise so the transform also captures the
//! non-additive effect of the noise on the prediction.
//! Implements the classic Duplex 'Unscented' transform with a fixed lambda = 3 - n_x.

use nalgebra as na;
use na::{allocator::Allocator, DefaultAllocator, DimName, MatrixMN, MatrixN, VectorN};
use na::{Vector5, U1, U5, U7};

use crate::angle::normalize_angle;
use crate::error::{EstimateError, Result};
use crate::models::{CtrvState, KalmanState};
use crate::noise::{CorrelatedNoise, ProcessNoise};

/// State dimension
pub const N_X: usize = 5;
/// Augmented state dimension, the state and two process noises
pub const N_AUG: usize = 7;
/// Number of sigma points
pub const N_SIGMA: usize = 2 * N_AUG + 1;
/// Heading element of the state
pub const YAW: usize = 3;

pub type AugmentedState = KalmanState<f64, U7>;
pub type AugmentedPoints = [VectorN<f64, U7>; N_SIGMA];
pub type StatePoints = [Vector5<f64>; N_SIGMA];

/// Weights of the points of an unscented distribution.
///
/// weight(0) = lambda / (lambda + n_aug), all others 1 / (2 (lambda + n_aug)). They sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmaWeights {
    lambda: f64,
    n_aug: usize,
}

impl SigmaWeights {
    /// `lambda + n_aug` must not be zero.
    pub fn new(lambda: f64, n_aug: usize) -> Self {
        SigmaWeights { lambda, n_aug }
    }

    /// Weights of the augmented CTRV distribution.
    pub fn ctrv() -> Self {
        SigmaWeights::new(3. - N_X as f64, N_AUG)
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn n_aug(&self) -> usize {
        self.n_aug
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        2 * self.n_aug + 1
    }

    /// Distance scale of the points from the mean, sqrt(lambda + n_aug).
    pub fn spread(&self) -> f64 {
        (self.lambda + self.n_aug as f64).sqrt()
    }

    pub fn weight(&self, i: usize) -> f64 {
        let kappa = self.lambda + self.n_aug as f64;
        if i == 0 {
            self.lambda / kappa
        } else {
            0.5 / kappa
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |i| self.weight(i))
    }
}

/// Sigma points of the predicted state, with their weights.
///
/// Retained after a prediction for use by the following observation.
#[derive(Debug, Clone, Copy)]
pub struct PredictedPoints {
    pub points: StatePoints,
    pub weights: SigmaWeights,
}

/// Augment the state with the zero mean process noise.
pub fn augment(state: &CtrvState, noise: &ProcessNoise) -> AugmentedState {
    let mut aug = AugmentedState::new_zero(U7);
    aug.x.fixed_rows_mut::<U5>(0).copy_from(&state.x);
    aug.X.fixed_slice_mut::<U5, U5>(0, 0).copy_from(&state.X);
    aug.X[(N_X, N_X)] = noise.q[0];
    aug.X[(N_X + 1, N_X + 1)] = noise.q[1];
    aug
}

/// Unscented points of the augmented distribution.
///
/// Point 0 is the mean, points i+1 and i+1+n_aug are the mean plus and minus column i of the scaled
/// Cholesky factor of the covariance.
pub fn unscented(aug: &AugmentedState, weights: &SigmaWeights) -> Result<AugmentedPoints> {
    debug_assert_eq!(weights.n_aug(), N_AUG);
    // Cholesky does not fail on NaN
    if !aug.X.iter().all(|v| v.is_finite()) {
        return Err(EstimateError::NotPositiveDefinite("augmented X not finite"));
    }
    let sigma = aug
        .X
        .clone()
        .cholesky()
        .ok_or(EstimateError::NotPositiveDefinite("augmented X not PD"))?
        .l()
        * weights.spread();

    // Generate UU with the same sample Mean and Covariance
    let mut UU: AugmentedPoints = [aug.x; N_SIGMA];
    for c in 0..N_AUG {
        let sigmaCol = sigma.column(c);
        UU[c + 1] = aug.x + &sigmaCol;
        UU[c + 1 + N_AUG] = aug.x - &sigmaCol;
    }

    Ok(UU)
}

/// Weighted mean of points.
pub fn weighted_mean<D: DimName>(XX: &[VectorN<f64, D>], weights: &SigmaWeights) -> VectorN<f64, D>
where
    DefaultAllocator: Allocator<f64, D>,
{
    XX.iter()
        .zip(weights.iter())
        .fold(VectorN::<f64, D>::zeros(), |x, (xi, w)| x + xi.scale(w))
}

/// Weighted covariance of points about `x`.
///
/// `normalize` is applied to each difference before the outer product, angles must be wrapped there.
pub fn weighted_covariance<D: DimName>(
    XX: &[VectorN<f64, D>],
    weights: &SigmaWeights,
    x: &VectorN<f64, D>,
    normalize: impl Fn(&mut VectorN<f64, D>),
) -> MatrixN<f64, D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D> + Allocator<f64, U1, D>,
{
    let mut X = MatrixN::<f64, D>::zeros();
    for (xi, w) in XX.iter().zip(weights.iter()) {
        let mut XXi = xi - x;
        normalize(&mut XXi);
        X += (&XXi * XXi.transpose()).scale(w);
    }
    X
}

/// Normalise the heading of a state difference.
pub fn normalize_state(dx: &mut Vector5<f64>) {
    dx[YAW] = normalize_angle(dx[YAW]);
}

/// Recover the predicted state from predicted points.
pub fn kalman(predicted: &PredictedPoints) -> CtrvState {
    let x = weighted_mean(&predicted.points, &predicted.weights);
    let X = weighted_covariance(&predicted.points, &predicted.weights, &x, normalize_state);
    KalmanState { x, X }
}

/// A non-linear observation model for the unscented observe.
pub trait UnscentedObserveModel<ZD: DimName>
where
    DefaultAllocator: Allocator<f64, ZD>,
{
    /// Observation function.
    fn h(&self, x: &Vector5<f64>) -> VectorN<f64, ZD>;

    /// Wrap the angular elements of an observation difference.
    fn normalize(&self, dz: &mut VectorN<f64, ZD>);

    /// Mean of the observed points.
    fn mean(&self, ZZ: &[VectorN<f64, ZD>], weights: &SigmaWeights) -> VectorN<f64, ZD> {
        weighted_mean(ZZ, weights)
    }
}

/// Observe the predicted points, giving the points in observation space and their distribution
/// including the observation noise.
pub fn predict_observation<ZD: DimName, M: UnscentedObserveModel<ZD>>(
    model: &M,
    predicted: &PredictedPoints,
    noise: &CorrelatedNoise<f64, ZD>,
) -> ([VectorN<f64, ZD>; N_SIGMA], KalmanState<f64, ZD>)
where
    DefaultAllocator: Allocator<f64, ZD, ZD> + Allocator<f64, ZD> + Allocator<f64, U1, ZD>,
{
    let ZZ: [VectorN<f64, ZD>; N_SIGMA] = std::array::from_fn(|i| model.h(&predicted.points[i]));

    let z = model.mean(&ZZ, &predicted.weights);
    let mut Z = weighted_covariance(&ZZ, &predicted.weights, &z, |dz| model.normalize(dz));
    Z += &noise.Q;

    (ZZ, KalmanState { x: z, X: Z })
}

/// Unscented observation of the predicted state.
///
/// `state` must be the distribution recovered from `predicted`.
/// Returns the normalised innovation squared.
pub fn observe_unscented<ZD: DimName, M: UnscentedObserveModel<ZD>>(
    model: &M,
    state: &mut CtrvState,
    predicted: &PredictedPoints,
    noise: &CorrelatedNoise<f64, ZD>,
    z: &VectorN<f64, ZD>,
) -> Result<f64>
where
    DefaultAllocator: Allocator<f64, ZD, ZD>
        + Allocator<f64, ZD>
        + Allocator<f64, U1, ZD>
        + Allocator<f64, U5, ZD>
        + Allocator<f64, ZD, U5>,
{
    let (ZZ, zZ) = predict_observation(model, predicted, noise);

    // Correlation of state with observation: XZ
    let mut XZ = MatrixMN::<f64, U5, ZD>::zeros();
    for ((xi, zi), w) in predicted.points.iter().zip(ZZ.iter()).zip(predicted.weights.iter()) {
        let mut XXi = xi - state.x;
        normalize_state(&mut XXi);
        let mut ZZi = zi - &zZ.x;
        model.normalize(&mut ZZi);
        XZ += (XXi * ZZi.transpose()).scale(w);
    }

    let S = zZ.X;
    // Inverse innovation covariance
    let SI = S
        .clone()
        .cholesky()
        .ok_or(EstimateError::SingularInnovation("S not PD in observe"))?
        .inverse();

    // Kalman gain, XZ*SI
    let W = &XZ * &SI;

    // Innovation
    let mut s = z - &zZ.x;
    model.normalize(&mut s);
    let nis = (s.transpose() * &SI * &s)[(0, 0)];

    // State update
    let x = state.x + &W * &s;
    // X -= W.S.W'
    let X = &state.X - &W * &S * W.transpose();
    if !(nis.is_finite() && x.iter().all(|v| v.is_finite()) && X.iter().all(|v| v.is_finite())) {
        return Err(EstimateError::SingularInnovation("update not finite in observe"));
    }
    state.x = x;
    state.X = X;

    Ok(nis)
}

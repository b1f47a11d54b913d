#![allow(non_snake_case)]

//! Linear observation of the CTRV belief.
//!
//! The belief is the mean and covariance pair of [`KalmanState`]. Sensors that observe the state
//! linearly, such as the lidar, update it in closed form with the Kalman gain.
//!
//! [`KalmanState`]: ../../models/struct.KalmanState.html

use na::{allocator::Allocator, storage::Storage, DefaultAllocator, Dim, MatrixN, RealField, VectorN, U1};
use nalgebra as na;

use crate::error::{EstimateError, Result};
use crate::linalg::rcond;
use crate::models::{Estimator, KalmanEstimator, KalmanState, LinearObserveModel};
use crate::noise::CorrelatedNoise;

impl<N: RealField, D: Dim> KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    pub fn new_zero(d: D) -> KalmanState<N, D> {
        KalmanState {
            x: VectorN::zeros_generic(d, U1),
            X: MatrixN::zeros_generic(d, d),
        }
    }

    /// A zero state with covariance `variance` * I.
    pub fn new_prior(d: D, variance: N) -> KalmanState<N, D> {
        KalmanState {
            x: VectorN::zeros_generic(d, U1),
            X: MatrixN::identity_generic(d, d) * variance,
        }
    }

    /// Linear observation with correlated additive noise.
    ///
    /// Returns the normalised innovation squared. On error the state is unchanged.
    pub fn observe_linear<ZD: Dim>(
        &mut self,
        obs: &LinearObserveModel<N, D, ZD>,
        noise: &CorrelatedNoise<N, ZD>,
        z: &VectorN<N, ZD>,
    ) -> Result<N>
    where
        DefaultAllocator: Allocator<N, ZD, ZD>
            + Allocator<N, ZD, D>
            + Allocator<N, D, ZD>
            + Allocator<N, ZD>
            + Allocator<N, U1, ZD>,
    {
        // Innovation
        let s = z - &obs.Hx * &self.x;

        let XHt = &self.X * obs.Hx.transpose();
        // S = Hx.X.Hx' + Q
        let S = &obs.Hx * &XHt + &noise.Q;

        // Inverse innovation covariance
        let SI = S
            .cholesky()
            .ok_or(EstimateError::SingularInnovation("S not PD in observe"))?
            .inverse();
        // Kalman gain, X*Hx'*SI
        let W = &XHt * &SI;

        let nis = (s.transpose() * &SI * &s)[(0, 0)];

        // State update
        let x = &self.x + &W * &s;
        // X = (I - W.Hx).X
        let d = self.X.data.shape().0;
        let I = MatrixN::<N, D>::identity_generic(d, d);
        let X = (I - &W * &obs.Hx) * &self.X;
        if !(all_finite(x.iter()) && all_finite(X.iter()) && all_finite(std::iter::once(&nis))) {
            return Err(EstimateError::SingularInnovation("update not finite in observe"));
        }
        self.x = x;
        self.X = X;

        Ok(nis)
    }
}

/// No NaN or infinite elements. inf - inf and NaN - NaN are both NaN.
pub(crate) fn all_finite<'a, N: RealField + 'a>(mut elements: impl Iterator<Item = &'a N>) -> bool {
    elements.all(|v| *v - *v == N::zero())
}

impl<N: RealField, D: Dim> Estimator<N, D> for KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn state(&self) -> Result<VectorN<N, D>> {
        Ok(self.x.clone())
    }
}

impl<N: RealField, D: Dim> KalmanEstimator<N, D> for KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn init(&mut self, state: &KalmanState<N, D>) -> Result<N> {
        let rcond = rcond::check_covariance(&state.X).map_err(EstimateError::NotPositiveDefinite)?;
        // NaN
        if state.x.iter().any(|v| *v != *v) {
            return Err(EstimateError::NotPositiveDefinite("x is NaN"));
        }

        self.x = state.x.clone();
        self.X = state.X.clone();

        Ok(rcond)
    }

    fn kalman_state(&self) -> Result<(N, KalmanState<N, D>)> {
        Ok((
            N::one(),
            KalmanState {
                x: self.x.clone(),
                X: self.X.clone(),
            },
        ))
    }
}

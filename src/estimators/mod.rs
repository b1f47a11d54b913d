//! State estimators of the CTRV filter.
//!
//! [`covariance`] makes linear observations on a Kalman state.
//! [`unscented`] generates, predicts and observes the augmented sigma points.

pub mod covariance;
pub mod unscented;

//! Estimation errors.
//!
//! Every failure of the filter is reported to the caller as an [`EstimateError`].
//! A failing operation commits nothing to the filter state.

use thiserror::Error;

use crate::models::SensorKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("unknown sensor tag: {0:?}")]
    UnknownSensor(String),

    #[error("{sensor:?} measurement needs {expected} values, found {found}")]
    DimensionMismatch {
        sensor: SensorKind,
        expected: usize,
        found: usize,
    },

    #[error("estimator not initialised")]
    NotInitialized,

    #[error("no prediction to observe, predict before each update")]
    NoPrediction,

    #[error("measurement timestamp {found} is before the last processed timestamp {last}")]
    OutOfOrder { last: i64, found: i64 },

    #[error("interval from timestamp {last} to {found} overflows")]
    TimestampOverflow { last: i64, found: i64 },

    #[error("{0} measurement has non-finite values")]
    InvalidMeasurement(SensorKind),

    #[error("covariance not positive definite: {0}")]
    NotPositiveDefinite(&'static str),

    #[error("innovation covariance singular: {0}")]
    SingularInnovation(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, EstimateError>;

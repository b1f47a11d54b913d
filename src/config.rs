//! Filter configuration.
//!
//! Fixed when a filter is constructed. The measurement noise standard deviations are
//! properties of the sensors and the defaults are the manufacturer values.

use crate::error::{EstimateError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    /// Process noise standard deviation longitudinal acceleration in m/s^2
    pub std_a: f64,
    /// Process noise standard deviation yaw acceleration in rad/s^2
    pub std_yawdd: f64,

    /// Lidar measurement noise standard deviation position x in m
    pub std_laspx: f64,
    /// Lidar measurement noise standard deviation position y in m
    pub std_laspy: f64,

    /// Radar measurement noise standard deviation range in m
    pub std_radr: f64,
    /// Radar measurement noise standard deviation bearing in rad
    pub std_radphi: f64,
    /// Radar measurement noise standard deviation range rate in m/s
    pub std_radrd: f64,

    /// If false lidar measurements only predict (they still initialise)
    pub use_lidar: bool,
    /// If false radar measurements only predict (they still initialise)
    pub use_radar: bool,

    /// Diagonal of the state covariance before the first measurement
    pub initial_variance: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            std_a: 3.0,
            std_yawdd: 1.0,
            std_laspx: 0.15,
            std_laspy: 0.15,
            std_radr: 0.3,
            std_radphi: 0.03,
            std_radrd: 0.3,
            use_lidar: true,
            use_radar: true,
            initial_variance: 0.5,
        }
    }
}

impl FilterConfig {
    /// Checks all standard deviations and the initial variance are finite and positive.
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.;
        if !positive(self.std_a) || !positive(self.std_yawdd) {
            return Err(EstimateError::InvalidConfig("process noise std must be finite and > 0"));
        }
        if !positive(self.std_laspx) || !positive(self.std_laspy) {
            return Err(EstimateError::InvalidConfig("lidar noise std must be finite and > 0"));
        }
        if !positive(self.std_radr) || !positive(self.std_radphi) || !positive(self.std_radrd) {
            return Err(EstimateError::InvalidConfig("radar noise std must be finite and > 0"));
        }
        if !positive(self.initial_variance) {
            return Err(EstimateError::InvalidConfig("initial variance must be finite and > 0"));
        }
        Ok(())
    }
}

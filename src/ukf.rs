//! CTRV unscented Kalman filter fusing lidar and radar measurements.
//!
//! [`CtrvUkf`] sequences the estimation for each measurement: initialisation from the first
//! measurement, then a CTRV prediction over the elapsed time followed by the observation of the
//! sensor that produced the measurement.

use log::{debug, trace, warn};
use nalgebra::{Vector2, Vector3, Vector5, VectorN, U5};

use crate::config::FilterConfig;
use crate::ctrv::CtrvPredictor;
use crate::error::{EstimateError, Result};
use crate::estimators::unscented::PredictedPoints;
use crate::models::{CtrvState, Estimator, KalmanEstimator, KalmanState};
use crate::models::{MeasurementSample, MeasurementUpdate, Observation, SensorKind};
use crate::noise::NoiseModels;
use crate::sensors::{self, LidarModel, RadarModel};

/// What processing a measurement did to the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// The measurement initialised the state.
    Initialized(SensorKind),
    /// The state was predicted, the sensor is disabled so no update was made.
    Predicted(SensorKind),
    /// The state was predicted and updated.
    Updated { sensor: SensorKind, nis: f64 },
}

/// Unscented Kalman filter with a CTRV motion model.
///
/// One instance tracks one object.
#[derive(Clone)]
pub struct CtrvUkf {
    config: FilterConfig,
    predictor: CtrvPredictor,
    lidar: LidarModel,
    radar: RadarModel,
    state: CtrvState,
    predicted: Option<PredictedPoints>,
    /// Timestamp of the last processed measurement, None until initialised
    time_us: Option<i64>,
}

impl CtrvUkf {
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        let noise = NoiseModels::from_config(&config);
        Ok(CtrvUkf {
            config,
            predictor: CtrvPredictor::new(noise.process),
            lidar: LidarModel::new(noise.lidar),
            radar: RadarModel::new(noise.radar),
            state: KalmanState::new_prior(U5, config.initial_variance),
            predicted: None,
            time_us: None,
        })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.time_us.is_some()
    }

    /// Timestamp of the last processed measurement.
    pub fn timestamp(&self) -> Option<i64> {
        self.time_us
    }

    pub fn state(&self) -> &CtrvState {
        &self.state
    }

    /// Predicted points of the last prediction, until they are used by an update.
    pub fn predicted_points(&self) -> Option<&PredictedPoints> {
        self.predicted.as_ref()
    }

    pub fn lidar_model(&self) -> &LidarModel {
        &self.lidar
    }

    pub fn radar_model(&self) -> &RadarModel {
        &self.radar
    }

    /// Return to the uninitialised state with the prior covariance.
    pub fn reset(&mut self) {
        self.state = KalmanState::new_prior(U5, self.config.initial_variance);
        self.predicted = None;
        self.time_us = None;
    }

    /// Initialise the state from a measurement.
    ///
    /// Lidar gives the position directly, radar through its range and bearing.
    /// Speed, heading and yaw rate are zero and the covariance is the prior.
    pub fn initialize(&mut self, sample: &MeasurementSample) {
        let (px, py) = match sample.raw {
            Observation::Lidar(z) => (z[0], z[1]),
            Observation::Radar(z) => sensors::polar_to_cartesian(z[0], z[1]),
        };
        self.state = KalmanState::new_prior(U5, self.config.initial_variance);
        self.state.x = Vector5::new(px, py, 0., 0., 0.);
        self.predicted = None;
        self.time_us = Some(sample.timestamp);
        debug!("initialised from {} at t={} px={:.4} py={:.4}", sample.sensor(), sample.timestamp, px, py);
    }

    /// Initialise with a given state at `timestamp`.
    ///
    /// Returns the reciprocal condition number of the covariance.
    pub fn init_at(&mut self, state: &CtrvState, timestamp: i64) -> Result<f64> {
        let rcond = self.state.init(state)?;
        self.predicted = None;
        self.time_us = Some(timestamp);
        Ok(rcond)
    }

    /// Process a measurement: initialise, or predict to its timestamp and update with it.
    ///
    /// A disabled sensor's measurement still predicts and advances the timestamp.
    pub fn process_measurement(&mut self, sample: &MeasurementSample) -> Result<Outcome> {
        if let Err(e) = sample.validate() {
            warn!("dropping measurement at t={}: {}", sample.timestamp, e);
            return Err(e);
        }
        let last = match self.time_us {
            Some(last) => last,
            None => {
                self.initialize(sample);
                return Ok(Outcome::Initialized(sample.sensor()));
            }
        };
        if sample.timestamp < last {
            warn!("dropping {} measurement at t={}, last t={}", sample.sensor(), sample.timestamp, last);
            return Err(EstimateError::OutOfOrder {
                last,
                found: sample.timestamp,
            });
        }

        let dt = match sample.timestamp.checked_sub(last) {
            Some(elapsed) => elapsed as f64 / 1.0e6,
            None => {
                warn!("dropping {} measurement at t={}, interval overflows", sample.sensor(), sample.timestamp);
                return Err(EstimateError::TimestampOverflow {
                    last,
                    found: sample.timestamp,
                });
            }
        };
        self.predict(dt)?;
        self.time_us = Some(sample.timestamp);

        let sensor = sample.sensor();
        let nis = match sample.raw {
            Observation::Lidar(z) if self.config.use_lidar => self.update_lidar(&z)?,
            Observation::Radar(z) if self.config.use_radar => self.update_radar(&z)?,
            _ => {
                trace!("{} disabled, prediction only", sensor);
                return Ok(Outcome::Predicted(sensor));
            }
        };
        debug!("{} update t={} nis={:.4}", sensor, sample.timestamp, nis);
        Ok(Outcome::Updated { sensor, nis })
    }

    /// Process a measurement given by an untyped sensor tag and values.
    pub fn process_raw(&mut self, tag: &str, values: &[f64], timestamp: i64) -> Result<Outcome> {
        let sample = tag
            .parse::<SensorKind>()
            .and_then(|sensor| MeasurementSample::from_raw(sensor, values, timestamp))
            .map_err(|e| {
                warn!("rejected measurement at t={}: {}", timestamp, e);
                e
            })?;
        self.process_measurement(&sample)
    }

    /// Predict the state `dt` seconds ahead.
    pub fn predict(&mut self, dt: f64) -> Result<()> {
        if !self.is_initialized() {
            return Err(EstimateError::NotInitialized);
        }
        let (state, predicted) = self.predictor.predict(&self.state, dt)?;
        self.state = state;
        self.predicted = Some(predicted);
        Ok(())
    }

    /// Update the predicted state with a lidar position. Returns the NIS.
    pub fn update_lidar(&mut self, z: &Vector2<f64>) -> Result<f64> {
        if !z.iter().all(|v| v.is_finite()) {
            return Err(EstimateError::InvalidMeasurement(SensorKind::Lidar));
        }
        let predicted = self.predicted.ok_or(EstimateError::NoPrediction)?;
        let nis = self.lidar.observe(&mut self.state, &predicted, z)?;
        self.predicted = None;
        Ok(nis)
    }

    /// Update the predicted state with a radar range, bearing and range rate. Returns the NIS.
    pub fn update_radar(&mut self, z: &Vector3<f64>) -> Result<f64> {
        if !z.iter().all(|v| v.is_finite()) {
            return Err(EstimateError::InvalidMeasurement(SensorKind::Radar));
        }
        let predicted = self.predicted.ok_or(EstimateError::NoPrediction)?;
        let nis = self.radar.observe(&mut self.state, &predicted, z)?;
        self.predicted = None;
        Ok(nis)
    }
}

impl Estimator<f64, U5> for CtrvUkf {
    fn state(&self) -> Result<VectorN<f64, U5>> {
        if self.is_initialized() {
            Ok(self.state.x)
        } else {
            Err(EstimateError::NotInitialized)
        }
    }
}

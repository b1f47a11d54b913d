//! Simulated CTRV target with noisy lidar and radar measurements.
//!
//! The truth moves exactly on the CTRV model. Measurements are the truth observed with zero mean
//! Gaussian noise of the configured standard deviations.

use nalgebra::{Vector5, VectorN, U5, U7};
use rand_core::RngCore;
use rand_distr::{Distribution, Normal};

use crate::angle::normalize_angle;
use crate::config::FilterConfig;
use crate::ctrv;
use crate::error::{EstimateError, Result};
use crate::models::{MeasurementSample, SensorKind};
use crate::sensors;

pub struct CtrvSimulator {
    truth: Vector5<f64>,
    time_us: i64,
    step_us: i64,
    next: SensorKind,
    lidar: [Normal<f64>; 2],
    radar: [Normal<f64>; 3],
}

fn normal(std: f64) -> Result<Normal<f64>> {
    Normal::new(0., std).map_err(|_| EstimateError::InvalidConfig("noise std must be finite"))
}

impl CtrvSimulator {
    /// A target with state `truth` at `start_us`, measured every `step_us` alternately by lidar and radar.
    pub fn new(truth: Vector5<f64>, start_us: i64, step_us: i64, config: &FilterConfig) -> Result<Self> {
        Ok(CtrvSimulator {
            truth,
            time_us: start_us,
            step_us,
            next: SensorKind::Lidar,
            lidar: [normal(config.std_laspx)?, normal(config.std_laspy)?],
            radar: [normal(config.std_radr)?, normal(config.std_radphi)?, normal(config.std_radrd)?],
        })
    }

    pub fn truth(&self) -> &Vector5<f64> {
        &self.truth
    }

    pub fn time_us(&self) -> i64 {
        self.time_us
    }

    /// Noisy measurement of the current truth.
    pub fn measure<R: RngCore + ?Sized>(&self, sensor: SensorKind, rng: &mut R) -> MeasurementSample {
        match sensor {
            SensorKind::Lidar => MeasurementSample::lidar(
                self.truth[0] + self.lidar[0].sample(rng),
                self.truth[1] + self.lidar[1].sample(rng),
                self.time_us,
            ),
            SensorKind::Radar => {
                let z = sensors::radar_observe(&self.truth);
                MeasurementSample::radar(
                    z[0] + self.radar[0].sample(rng),
                    normalize_angle(z[1] + self.radar[1].sample(rng)),
                    z[2] + self.radar[2].sample(rng),
                    self.time_us,
                )
            }
        }
    }

    /// Move the truth one step and measure it. Sensors alternate, starting with lidar.
    pub fn step<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> MeasurementSample {
        let dt = self.step_us as f64 / 1.0e6;
        let mut xa = VectorN::<f64, U7>::zeros();
        xa.fixed_rows_mut::<U5>(0).copy_from(&self.truth);
        self.truth = ctrv::predict_point(&xa, dt);
        self.time_us += self.step_us;

        let sensor = self.next;
        self.next = match sensor {
            SensorKind::Lidar => SensorKind::Radar,
            SensorKind::Radar => SensorKind::Lidar,
        };
        self.measure(sensor, rng)
    }
}

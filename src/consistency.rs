//! Filter consistency from the normalised innovation squared (NIS).
//!
//! For a consistent filter the NIS of an observation is chi-square distributed with the
//! observation dimension as degrees of freedom. About 5% of values should exceed the 95% bound.

use crate::models::SensorKind;
use crate::ukf::Outcome;

/// 95% quantile of the chi-square distribution with `dof` degrees of freedom.
pub fn chi2_95(dof: usize) -> Option<f64> {
    match dof {
        1 => Some(3.841),
        2 => Some(5.991),
        3 => Some(7.815),
        4 => Some(9.488),
        5 => Some(11.070),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NisCount {
    pub total: usize,
    /// Number above the 95% bound
    pub above: usize,
}

impl NisCount {
    pub fn fraction_above(&self) -> f64 {
        if self.total == 0 {
            0.
        } else {
            self.above as f64 / self.total as f64
        }
    }
}

/// Counts NIS values of each sensor above their 95% bound.
#[derive(Debug, Clone, Default)]
pub struct NisMonitor {
    lidar: NisCount,
    radar: NisCount,
}

impl NisMonitor {
    pub fn new() -> Self {
        NisMonitor::default()
    }

    pub fn record_nis(&mut self, sensor: SensorKind, nis: f64) {
        let bound = chi2_95(sensor.dim()).unwrap_or(f64::INFINITY);
        let count = match sensor {
            SensorKind::Lidar => &mut self.lidar,
            SensorKind::Radar => &mut self.radar,
        };
        count.total += 1;
        if nis > bound {
            count.above += 1;
        }
    }

    /// Record the NIS of an update, other outcomes are ignored.
    pub fn record(&mut self, outcome: &Outcome) {
        if let Outcome::Updated { sensor, nis } = *outcome {
            self.record_nis(sensor, nis);
        }
    }

    pub fn count(&self, sensor: SensorKind) -> NisCount {
        match sensor {
            SensorKind::Lidar => self.lidar,
            SensorKind::Radar => self.radar,
        }
    }
}

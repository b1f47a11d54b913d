//! Track a simulated turning target with lidar and radar.
//!
//! Run with `RUST_LOG=debug` to see each update.

use nalgebra::Vector5;
use rand::SeedableRng;

use ctrv_estimate::consistency::{chi2_95, NisMonitor};
use ctrv_estimate::simulation::CtrvSimulator;
use ctrv_estimate::{CtrvUkf, FilterConfig, SensorKind};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = FilterConfig::default();
    let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    let mut sim = CtrvSimulator::new(Vector5::new(0.6, 0.6, 5.2, 0.0, 0.3), 1_477_010_443_000_000, 50_000, &config)?;
    let mut ukf = CtrvUkf::new(config)?;
    let mut monitor = NisMonitor::new();

    ukf.process_measurement(&sim.measure(SensorKind::Lidar, &mut rng))?;
    for i in 0..500 {
        let sample = sim.step(&mut rng);
        let outcome = ukf.process_measurement(&sample)?;
        monitor.record(&outcome);

        if i % 50 == 0 {
            let x = ukf.state().x;
            let truth = sim.truth();
            log::info!(
                "t={} px={:.3} ({:.3}) py={:.3} ({:.3}) v={:.3} ({:.3}) yaw={:.3} ({:.3})",
                sample.timestamp,
                x[0],
                truth[0],
                x[1],
                truth[1],
                x[2],
                truth[2],
                x[3],
                truth[3]
            );
        }
    }

    for &sensor in &[SensorKind::Lidar, SensorKind::Radar] {
        let count = monitor.count(sensor);
        log::info!(
            "{} NIS above {:.3}: {}/{} ({:.1}%)",
            sensor,
            chi2_95(sensor.dim()).unwrap_or(f64::INFINITY),
            count.above,
            count.total,
            100. * count.fraction_above()
        );
    }
    Ok(())
}

//! CTRV Estimate, unscented Kalman filtering of a moving object from lidar and radar.
//!
//! The kinematic state of an object, position, speed, heading and yaw rate, is estimated from a stream of
//! noisy measurements arriving asynchronously from two sensors. A lidar observes the position directly.
//! A radar observes range, bearing and range rate, a non-linear function of the state.
//!
//! The object's motion is modeled as constant turn rate and velocity (CTRV) with longitudinal and yaw acceleration noise.
//! The noise acts non-linearly on the state so the state is augmented with it and predicted with an 'Unscented' transform.
//! Lidar observations are linear and use the closed form Kalman observation.
//! Radar observations use the 'Unscented' observation.
//!
//! State represention is the [`models::KalmanState`] struct, the mean and covariance of the belief.
//! [`ukf::CtrvUkf`] processes each measurement: it initialises, predicts to the measurement time and observes.
//!
//! # Licensing
//!
//! The copyright notice is that of the MIT license.
//!
//! Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction,
//! including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software,
//! and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
//!
//! The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
//!
//! THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//! FITNESS FOR A PARTICULAR PURPOSE AND NON INFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY,
//! WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

pub mod angle;
pub mod config;
pub mod consistency;
pub mod ctrv;
pub mod error;
pub mod estimators;
pub mod linalg;
pub mod models;
pub mod noise;
pub mod sensors;
#[cfg(feature = "std")]
pub mod simulation;
pub mod ukf;

pub use config::FilterConfig;
pub use error::{EstimateError, Result};
pub use models::{MeasurementSample, Observation, SensorKind};
pub use ukf::{CtrvUkf, Outcome};

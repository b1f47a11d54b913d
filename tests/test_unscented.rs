//! Test the numerical operations of the unscented CTRV prediction.
//!
//! Sigma point weights and symmetry, the CTRV point prediction and recovery of the predicted
//! state are tested.

#![allow(non_snake_case)]

use na::{Matrix5, Vector5, VectorN, U5, U7};
use nalgebra as na;
use rand::Rng;

use ctrv_estimate::angle::normalize_angle;
use ctrv_estimate::ctrv::{self, CtrvPredictor, YAW_RATE_EPSILON};
use ctrv_estimate::error::EstimateError;
use ctrv_estimate::estimators::unscented::{self, SigmaWeights, N_AUG, N_SIGMA, YAW};
use ctrv_estimate::models::{CtrvState, KalmanState};
use ctrv_estimate::noise::{ProcessNoise, UncorrelatedNoise};

fn process_noise() -> ProcessNoise {
    UncorrelatedNoise::from_std(&na::Vector2::new(3., 1.))
}

fn test_state() -> CtrvState {
    KalmanState {
        x: Vector5::new(1., 2., 3., 0.5, 0.1),
        X: Matrix5::from_diagonal(&Vector5::new(0.5, 0.4, 0.3, 0.2, 0.1)),
    }
}

fn augmented_point(x: &Vector5<f64>, nu_a: f64, nu_yawdd: f64) -> VectorN<f64, U7> {
    let mut xa = VectorN::<f64, U7>::zeros();
    xa.fixed_rows_mut::<U5>(0).copy_from(x);
    xa[5] = nu_a;
    xa[6] = nu_yawdd;
    xa
}

#[test]
fn test_weights_sum_to_one() {
    for n_aug in 1..30 {
        for &lambda in &[3. - 5., 3. - n_aug as f64, 0.5, 1.] {
            if (lambda + n_aug as f64).abs() < 1e-9 {
                continue;
            }
            let weights = SigmaWeights::new(lambda, n_aug);
            assert_eq!(weights.iter().count(), 2 * n_aug + 1);
            let sum: f64 = weights.iter().sum();
            approx::assert_abs_diff_eq!(sum, 1., epsilon = 1e-12);
        }
    }

    let weights = SigmaWeights::ctrv();
    assert_eq!(weights.len(), N_SIGMA);
    approx::assert_abs_diff_eq!(weights.weight(0), -2. / 5., epsilon = 1e-15);
    approx::assert_abs_diff_eq!(weights.weight(1), 0.1, epsilon = 1e-15);
    approx::assert_abs_diff_eq!(weights.weight(N_SIGMA - 1), 0.1, epsilon = 1e-15);
}

#[test]
fn test_augment() {
    let state = test_state();
    let aug = unscented::augment(&state, &process_noise());

    approx::assert_relative_eq!(aug.x.fixed_rows::<U5>(0).clone_owned(), state.x);
    assert_eq!(aug.x[5], 0.);
    assert_eq!(aug.x[6], 0.);
    approx::assert_relative_eq!(aug.X.fixed_slice::<U5, U5>(0, 0).clone_owned(), state.X);
    approx::assert_relative_eq!(aug.X[(5, 5)], 9.);
    approx::assert_relative_eq!(aug.X[(6, 6)], 1.);
    assert_eq!(aug.X[(5, 6)], 0.);
    assert_eq!(aug.X[(0, 5)], 0.);
}

#[test]
fn test_sigma_points_symmetric() {
    let mut state = test_state();
    state.X[(0, 1)] = 0.1;
    state.X[(1, 0)] = 0.1;
    let weights = SigmaWeights::ctrv();
    let aug = unscented::augment(&state, &process_noise());
    let UU = unscented::unscented(&aug, &weights).unwrap();

    let L = aug.X.clone().cholesky().unwrap().l();
    approx::assert_relative_eq!(UU[0], aug.x);
    for i in 0..N_AUG {
        approx::assert_relative_eq!(UU[i + 1] + UU[i + 1 + N_AUG], aug.x * 2., epsilon = 1e-12);
        let expect = L.column(i) * weights.spread();
        approx::assert_relative_eq!(UU[i + 1] - aug.x, expect, epsilon = 1e-12);
    }
}

#[test]
fn test_sigma_points_not_pd() {
    let weights = SigmaWeights::ctrv();

    let mut state = test_state();
    state.X[(2, 2)] = -0.3;
    let aug = unscented::augment(&state, &process_noise());
    assert_eq!(
        unscented::unscented(&aug, &weights).unwrap_err(),
        EstimateError::NotPositiveDefinite("augmented X not PD")
    );

    let mut state = test_state();
    state.X[(4, 4)] = f64::NAN;
    let aug = unscented::augment(&state, &process_noise());
    assert!(matches!(
        unscented::unscented(&aug, &weights),
        Err(EstimateError::NotPositiveDefinite(_))
    ));
}

#[test]
fn test_predict_zero_dt() {
    let state = test_state();
    let predictor = CtrvPredictor::new(process_noise());
    let (predicted, points) = predictor.predict(&state, 0.).unwrap();

    approx::assert_relative_eq!(predicted.x, state.x, epsilon = 1e-12);
    approx::assert_relative_eq!(predicted.X, state.X, epsilon = 1e-12);
    // Without motion the predicted points are the state part of the augmented points
    let aug = unscented::augment(&state, &process_noise());
    let UU = unscented::unscented(&aug, &SigmaWeights::ctrv()).unwrap();
    for i in 0..N_SIGMA {
        approx::assert_relative_eq!(points.points[i], UU[i].fixed_rows::<U5>(0).clone_owned(), epsilon = 1e-12);
    }
}

#[test]
fn test_predict_point_straight() {
    let x = Vector5::new(1., 2., 4., std::f64::consts::FRAC_PI_2, 0.);
    let p = ctrv::predict_point(&augmented_point(&x, 0., 0.), 0.5);
    approx::assert_relative_eq!(p, Vector5::new(1., 4., 4., std::f64::consts::FRAC_PI_2, 0.), epsilon = 1e-12);
}

#[test]
fn test_predict_point_turn() {
    // Quarter circle of radius 2 turning left from heading east
    let v = 2. * std::f64::consts::FRAC_PI_2;
    let x = Vector5::new(0., 0., v, 0., std::f64::consts::FRAC_PI_2);
    let p = ctrv::predict_point(&augmented_point(&x, 0., 0.), 1.);
    approx::assert_relative_eq!(p[0], 2., epsilon = 1e-12);
    approx::assert_relative_eq!(p[1], 2., epsilon = 1e-12);
    approx::assert_relative_eq!(p[2], v);
    approx::assert_relative_eq!(p[3], std::f64::consts::FRAC_PI_2);
    approx::assert_relative_eq!(p[4], std::f64::consts::FRAC_PI_2);
}

#[test]
fn test_predict_point_noise() {
    let dt = 0.1;
    let x = Vector5::new(1., 1., 2., 0., 0.);
    let quiet = ctrv::predict_point(&augmented_point(&x, 0., 0.), dt);
    let noisy = ctrv::predict_point(&augmented_point(&x, 2., -1.), dt);

    let d = noisy - quiet;
    approx::assert_relative_eq!(d[0], 0.5 * 2. * dt * dt, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(d[1], 0., epsilon = 1e-12);
    approx::assert_relative_eq!(d[2], 2. * dt, epsilon = 1e-12);
    approx::assert_relative_eq!(d[3], -0.5 * dt * dt, epsilon = 1e-12);
    approx::assert_relative_eq!(d[4], -dt, epsilon = 1e-12);
}

#[test]
fn test_predict_point_continuity() {
    let dt = 0.1;
    for &yaw in &[0.3, -2.9, std::f64::consts::PI] {
        let straight = Vector5::new(3., -1., 5., yaw, 0.);
        let below = Vector5::new(3., -1., 5., yaw, YAW_RATE_EPSILON * 0.9999);
        let above = Vector5::new(3., -1., 5., yaw, YAW_RATE_EPSILON * 1.0001);

        let p0 = ctrv::predict_point(&augmented_point(&straight, 0.5, 0.2), dt);
        let p1 = ctrv::predict_point(&augmented_point(&below, 0.5, 0.2), dt);
        let p2 = ctrv::predict_point(&augmented_point(&above, 0.5, 0.2), dt);

        // Positions of the two branches agree either side of the threshold
        approx::assert_abs_diff_eq!(p1[0], p2[0], epsilon = 1e-4);
        approx::assert_abs_diff_eq!(p1[1], p2[1], epsilon = 1e-4);
        approx::assert_abs_diff_eq!(p0[0], p2[0], epsilon = 1e-4);
        approx::assert_abs_diff_eq!(p0[1], p2[1], epsilon = 1e-4);
    }
}

#[test]
fn test_normalize_angle() {
    let pi = std::f64::consts::PI;
    assert_eq!(normalize_angle(pi), pi);
    assert_eq!(normalize_angle(-pi), pi);
    assert_eq!(normalize_angle(0.), 0.);
    approx::assert_abs_diff_eq!(normalize_angle(2. * pi + 0.5), 0.5, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(normalize_angle(-2. * pi - 0.5), -0.5, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(normalize_angle(1e6), 1e6 - (1e6 / (2. * pi)).round() * 2. * pi, epsilon = 1e-6);

    let mut rng: rand::rngs::StdRng = rand::SeedableRng::seed_from_u64(1u64);
    for _ in 0..10000 {
        let a: f64 = rng.gen_range(-100.0..100.0);
        let n = normalize_angle(a);
        assert!(n > -pi && n <= pi, "{} normalised to {}", a, n);
        let turns = (a - n) / (2. * pi);
        approx::assert_abs_diff_eq!(turns, turns.round(), epsilon = 1e-9);
    }
    // Near the boundary
    for _ in 0..10000 {
        let side = if rng.gen::<bool>() { pi } else { -pi };
        let a = side + rng.gen_range(-1e-6..1e-6);
        let n = normalize_angle(a);
        assert!(n > -pi && n <= pi, "{} normalised to {}", a, n);
    }
}

#[test]
fn test_predicted_heading_residuals() {
    let pi = std::f64::consts::PI;
    let predictor = CtrvPredictor::new(process_noise());
    let mut rng: rand::rngs::StdRng = rand::SeedableRng::seed_from_u64(2u64);

    // A heading variance wide enough for the points to span more than a turn
    let mut reference: Option<f64> = None;
    for _ in 0..200 {
        let side = if rng.gen::<bool>() { pi } else { -pi };
        let yaw = side + rng.gen_range(-0.1..0.1);
        let state = KalmanState {
            x: Vector5::new(0., 0., 0., yaw, 0.),
            X: Matrix5::from_diagonal(&Vector5::new(0.5, 0.5, 0.5, 4., 0.5)),
        };
        let (predicted, points) = predictor.predict(&state, 0.05).unwrap();

        for p in points.points.iter() {
            let mut d = p - predicted.x;
            unscented::normalize_state(&mut d);
            assert!(d[YAW].abs() <= pi);
        }
        // The heading variance does not depend on where the heading is
        match reference {
            None => reference = Some(predicted.X[(YAW, YAW)]),
            Some(r) => approx::assert_relative_eq!(predicted.X[(YAW, YAW)], r, max_relative = 1e-9),
        }
    }
}

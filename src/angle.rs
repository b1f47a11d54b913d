//! Angle normalisation.

use num_traits::{Float, FloatConst};

/// Normalise an angle into the half open interval (-pi, pi].
///
/// Closed form, the cost does not depend on how many turns `a` is away from the interval.
pub fn normalize_angle<T: Float + FloatConst>(a: T) -> T {
    let pi = T::PI();
    let two_pi = pi + pi;
    let r = a - two_pi * ((a + pi) / two_pi).floor();
    if r <= -pi {
        r + two_pi
    } else if r > pi {
        r - two_pi
    } else {
        r
    }
}

/// Weighted circular mean of angles.
///
/// Weights may be negative (as the centre weight of an unscented distribution can be).
pub fn weighted_circular_mean<T: Float + FloatConst>(angles: impl Iterator<Item = (T, T)>) -> T {
    let (s, c) = angles.fold((T::zero(), T::zero()), |(s, c), (w, a)| {
        (s + w * a.sin(), c + w * a.cos())
    });
    s.atan2(c)
}

//! Helper functions used in testing and benchmarking evaluators: point and charge generators,
//! a direct reference summation, error measures and timing.
use std::time::{Duration, Instant};

use rand::{distributions::uniform::SampleUniform, prelude::*};
use rayon::prelude::*;

use crate::{
    traits::{general::Scalar, kernel::Kernel},
    tree::types::Point,
};

/// Points fixture for testing, uniformly samples in each axis from min to max.
///
/// # Arguments
/// * `n_points` - The number of points to sample.
/// * `min` - The minimum coordinate value along each axis, defaults to 0.
/// * `max` - The maximum coordinate value along each axis, defaults to 1.
/// * `seed` - Random seed, defaults to 0.
pub fn points_fixture<T: Scalar + SampleUniform>(
    n_points: usize,
    min: Option<T>,
    max: Option<T>,
    seed: Option<u64>,
) -> Vec<Point<T>> {
    // Generate a set of randomly distributed points
    let seed = seed.unwrap_or(0);
    let mut range = StdRng::seed_from_u64(seed);

    let between = if let (Some(min), Some(max)) = (min, max) {
        rand::distributions::Uniform::from(min..max)
    } else {
        rand::distributions::Uniform::from(T::zero()..T::one())
    };

    (0..n_points)
        .map(|_| {
            Point([
                between.sample(&mut range),
                between.sample(&mut range),
                between.sample(&mut range),
            ])
        })
        .collect()
}

/// Points fixture for testing, uniformly samples on surface of a sphere of diameter 1 centred
/// at (0.5, 0.5, 0.5).
///
/// # Arguments
/// * `n_points` - The number of points to sample.
/// * `seed` - Random seed, defaults to 0.
pub fn points_fixture_sphere<T: Scalar + SampleUniform>(
    n_points: usize,
    seed: Option<u64>,
) -> Vec<Point<T>> {
    let mut range = StdRng::seed_from_u64(seed.unwrap_or(0));
    let pi = T::real(std::f64::consts::PI);
    let two = T::real(2.0);
    let half = T::real(0.5);

    let between = rand::distributions::Uniform::from(T::zero()..T::one());

    (0..n_points)
        .map(|_| {
            let phi = between.sample(&mut range) * two * pi;
            let theta = ((between.sample(&mut range) - half) * two).acos();
            Point([
                half * theta.sin() * phi.cos() + half,
                half * theta.sin() * phi.sin() + half,
                half * theta.cos() + half,
            ])
        })
        .collect()
}

/// Charges fixture for testing, uniformly samples from [0, 1).
///
/// # Arguments
/// * `n_charges` - The number of charges to sample.
/// * `seed` - Random seed, defaults to 0.
pub fn charges_fixture<T: Scalar + SampleUniform>(n_charges: usize, seed: Option<u64>) -> Vec<T> {
    let mut range = StdRng::seed_from_u64(seed.unwrap_or(0));
    let between = rand::distributions::Uniform::from(T::zero()..T::one());
    (0..n_charges).map(|_| between.sample(&mut range)).collect()
}

/// Reference O(N^2) summation of a kernel over all pairs of distinct bodies, parallelised over
/// targets. Results are returned in input order.
///
/// # Arguments
/// * `kernel` - Kernel to sum.
/// * `points` - Body positions.
/// * `charges` - Body charges, one per point.
pub fn direct_evaluate<K: Kernel>(
    kernel: &K,
    points: &[Point<K::Scalar>],
    charges: &[K::Charge],
) -> Vec<K::Range> {
    points
        .par_iter()
        .enumerate()
        .map(|(i, target)| {
            let mut result = K::Range::default();
            for (j, (source, charge)) in points.iter().zip(charges).enumerate() {
                if i != j {
                    kernel.p2p(target, source, charge, &mut result);
                }
            }
            result
        })
        .collect()
}

/// Relative error in the l2 norm, `|approx - exact| / |exact|`. Falls back to the absolute
/// error when the exact solution vanishes.
pub fn l2_error<T: Scalar>(approx: &[T], exact: &[T]) -> T {
    let diff: T = approx
        .iter()
        .zip(exact)
        .map(|(&a, &e)| (a - e) * (a - e))
        .sum();
    let norm: T = exact.iter().map(|&e| e * e).sum();

    if norm > T::zero() {
        (diff / norm).sqrt()
    } else {
        diff.sqrt()
    }
}

/// Run a closure, timing it if requested.
pub fn optionally_time<T>(timed: bool, f: impl FnOnce() -> T) -> (T, Option<Duration>) {
    if timed {
        let start = Instant::now();
        let result = f();
        (result, Some(start.elapsed()))
    } else {
        (f(), None)
    }
}

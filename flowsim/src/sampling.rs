//! Random draws from declared distribution families.
//!
//! All sampling goes through the run-owned RNG so that a seeded run is
//! fully reproducible. Samplers never panic: degenerate parameters
//! (empty ranges, non-positive rates) collapse to a deterministic value
//! instead.

use crate::model::Distribution;
use rand::Rng;
use std::f64::consts::PI;

/// Fallback gap in hours when a distribution family has no meaningful
/// interpretation in the requested role.
const DEFAULT_SAMPLE: f64 = 1.0;

/// Sample a processing duration in hours. Always `>= 0`.
///
/// Normal draws are truncated at zero rather than resampled, which
/// biases high-variance/low-mean distributions toward zero; callers
/// accept this.
pub fn sample_duration<R: Rng>(rng: &mut R, dist: &Distribution) -> f64 {
    match *dist {
        Distribution::Fixed { value } => value,
        Distribution::Normal { mean, std } => gauss(rng, mean, std).max(0.0),
        Distribution::Exponential { rate } => exponential(rng, rate),
        Distribution::Triangular { min, mode, max } => triangular(rng, min, mode, max),
        Distribution::Uniform { min, max } => uniform(rng, min, max),
        // Poisson describes arrival counts, not a duration.
        Distribution::Poisson { .. } => DEFAULT_SAMPLE,
    }
}

/// Sample an inter-arrival gap in hours. Always `> 0` for positive
/// rates.
///
/// `Poisson { rate }` is interpreted as arrivals-per-hour and yields
/// exponential gaps; `Fixed { value }` is a deterministic rate, so the
/// gap is its reciprocal. Any other family falls back to a gap of 1.0.
pub fn sample_interarrival<R: Rng>(rng: &mut R, dist: &Distribution) -> f64 {
    match *dist {
        Distribution::Poisson { rate } if rate > 0.0 => exponential(rng, rate),
        Distribution::Fixed { value } if value > 0.0 => 1.0 / value,
        _ => DEFAULT_SAMPLE,
    }
}

/// Box-Muller transform.
fn gauss<R: Rng>(rng: &mut R, mean: f64, std: f64) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std * z
}

fn exponential<R: Rng>(rng: &mut R, rate: f64) -> f64 {
    if rate <= 0.0 {
        return 0.0;
    }
    let u: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    -u.ln() / rate
}

/// Inverse-transform triangular draw.
fn triangular<R: Rng>(rng: &mut R, min: f64, mode: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    let mode = mode.clamp(min, max);
    let u: f64 = rng.random();
    let fc = (mode - min) / (max - min);
    if u < fc {
        min + (u * (max - min) * (mode - min)).sqrt()
    } else {
        max - ((1.0 - u) * (max - min) * (max - mode)).sqrt()
    }
}

fn uniform<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    rng.random_range(min..max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn fixed_duration_is_exact() {
        let mut r = rng();
        let d = Distribution::Fixed { value: 2.5 };
        for _ in 0..10 {
            assert_eq!(sample_duration(&mut r, &d), 2.5);
        }
    }

    #[test]
    fn normal_truncates_negative_draws() {
        let mut r = rng();
        let d = Distribution::Normal {
            mean: 0.1,
            std: 5.0,
        };
        let mut saw_zero = false;
        for _ in 0..1000 {
            let v = sample_duration(&mut r, &d);
            assert!(v >= 0.0);
            if v == 0.0 {
                saw_zero = true;
            }
        }
        // With mean 0.1 and std 5.0 roughly half the draws truncate.
        assert!(saw_zero);
    }

    #[test]
    fn triangular_stays_in_bounds() {
        let mut r = rng();
        let d = Distribution::Triangular {
            min: 1.0,
            mode: 2.0,
            max: 4.0,
        };
        for _ in 0..1000 {
            let v = sample_duration(&mut r, &d);
            assert!((1.0..=4.0).contains(&v), "out of bounds: {v}");
        }
    }

    #[test]
    fn uniform_degenerate_range_returns_min() {
        let mut r = rng();
        let d = Distribution::Uniform { min: 3.0, max: 3.0 };
        assert_eq!(sample_duration(&mut r, &d), 3.0);
    }

    #[test]
    fn poisson_duration_falls_back_to_default() {
        let mut r = rng();
        let d = Distribution::Poisson { rate: 4.0 };
        assert_eq!(sample_duration(&mut r, &d), 1.0);
    }

    #[test]
    fn fixed_arrival_rate_is_reciprocal_gap() {
        let mut r = rng();
        let d = Distribution::Fixed { value: 4.0 };
        assert_eq!(sample_interarrival(&mut r, &d), 0.25);
    }

    #[test]
    fn poisson_arrival_mean_gap_matches_rate() {
        let mut r = rng();
        let d = Distribution::Poisson { rate: 2.0 };
        let n = 20_000;
        let total: f64 = (0..n).map(|_| sample_interarrival(&mut r, &d)).sum();
        let mean = total / n as f64;
        // Expected gap is 1/rate = 0.5h.
        assert!((mean - 0.5).abs() < 0.02, "mean gap {mean}");
    }

    #[test]
    fn nonpositive_exponential_rate_samples_zero() {
        let mut r = rng();
        let d = Distribution::Exponential { rate: 0.0 };
        assert_eq!(sample_duration(&mut r, &d), 0.0);
    }
}

//! Statistics toolkit: confidence intervals, replication aggregation,
//! two-sample comparison, utilization, and Little's Law validation.
//!
//! Consumed by the results aggregator and directly by external
//! reporting. The capacity-aware [`calculate_utilization`] here is the
//! single source of truth for utilization; the capacity-blind legacy
//! formula lives in the aggregator behind
//! [`UtilizationMode::Legacy`](crate::model::UtilizationMode).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        0.0
    } else {
        data.iter().sum::<f64>() / data.len() as f64
    }
}

/// Sample standard deviation (n-1 denominator); 0 for fewer than two
/// points.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    let var = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    var.sqrt()
}

/// Critical value for the given confidence level: the usual z lookup
/// for n >= 30, otherwise a rough small-sample widening.
fn critical_value(confidence: f64, n: usize) -> f64 {
    if n >= 30 {
        match (confidence * 100.0).round() as u32 {
            90 => 1.645,
            99 => 2.576,
            _ => 1.96,
        }
    } else {
        2.0 + 0.1 * (30 - n) as f64 / 30.0
    }
}

/// Confidence interval around the mean: `mean ± z * (stdev / sqrt(n))`.
/// Degenerates to `(mean, mean)` for fewer than two points.
pub fn confidence_interval(data: &[f64], confidence: f64) -> (f64, f64) {
    let m = mean(data);
    if data.len() < 2 {
        return (m, m);
    }
    let half_width = critical_value(confidence, data.len()) * std_dev(data) / (data.len() as f64).sqrt();
    (m - half_width, m + half_width)
}

/// Summary of one numeric metric across independent replications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationStats {
    /// Mean across replications.
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    /// Lower bound of the 95% confidence interval.
    pub ci_lower: f64,
    /// Upper bound of the 95% confidence interval.
    pub ci_upper: f64,
    /// Smallest observation.
    pub min: f64,
    /// Largest observation.
    pub max: f64,
    /// Number of replications the metric appeared in.
    pub n: usize,
}

/// Aggregates per-metric statistics across replications. Each map holds
/// one replication's named metrics; metrics missing from a replication
/// are simply absent from that sample.
pub fn calculate_replication_statistics(
    replications: &[BTreeMap<String, f64>],
) -> BTreeMap<String, ReplicationStats> {
    let mut samples: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for replication in replications {
        for (name, &value) in replication {
            samples.entry(name).or_default().push(value);
        }
    }
    samples
        .into_iter()
        .map(|(name, values)| {
            let (ci_lower, ci_upper) = confidence_interval(&values, 0.95);
            (
                name.to_string(),
                ReplicationStats {
                    mean: mean(&values),
                    std: std_dev(&values),
                    ci_lower,
                    ci_upper,
                    min: values.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
                    max: values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
                    n: values.len(),
                },
            )
        })
        .collect()
}

/// Outcome of a two-sample comparison between a baseline and a
/// scenario sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleComparison {
    /// `scenario mean - baseline mean`.
    pub mean_difference: f64,
    /// t-like statistic over the pooled standard error.
    pub t_statistic: f64,
    /// Two-tailed p-value from a normal-CDF approximation.
    pub p_value: f64,
    /// `p_value < alpha`.
    pub significant: bool,
}

/// Pooled-standard-error two-sample comparison. Degenerates to
/// `t = 0, p = 1` when either sample has fewer than two points or the
/// pooled error is zero.
pub fn compare_samples(baseline: &[f64], scenario: &[f64], alpha: f64) -> SampleComparison {
    let mean_difference = mean(scenario) - mean(baseline);
    if baseline.len() < 2 || scenario.len() < 2 {
        return SampleComparison {
            mean_difference,
            t_statistic: 0.0,
            p_value: 1.0,
            significant: false,
        };
    }

    let se = (std_dev(baseline).powi(2) / baseline.len() as f64
        + std_dev(scenario).powi(2) / scenario.len() as f64)
        .sqrt();
    if se == 0.0 {
        return SampleComparison {
            mean_difference,
            t_statistic: 0.0,
            p_value: 1.0,
            significant: false,
        };
    }

    let t_statistic = mean_difference / se;
    let p_value = 2.0 * (1.0 - normal_cdf(t_statistic.abs()));
    SampleComparison {
        mean_difference,
        t_statistic,
        p_value,
        significant: p_value < alpha,
    }
}

/// Standard normal CDF via the Abramowitz & Stegun erf approximation.
fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    // Abramowitz & Stegun 7.1.26, |error| <= 1.5e-7.
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let y = 1.0
        - (((((1.061405429 * t - 1.453152027) * t) + 1.421413741) * t - 0.284496736) * t
            + 0.254829592)
            * t
            * (-x * x).exp();
    sign * y
}

/// Fraction of available capacity-time that was busy, as a percentage
/// capped at 100: `busy_time / (total_time * capacity) * 100`.
pub fn calculate_utilization(busy_time: f64, total_time: f64, capacity: usize) -> f64 {
    if total_time <= 0.0 || capacity == 0 {
        return 0.0;
    }
    (busy_time / (total_time * capacity as f64) * 100.0).min(100.0)
}

/// Steps whose utilization meets the threshold, sorted non-increasing.
pub fn detect_bottlenecks(
    utilizations: &BTreeMap<String, f64>,
    threshold: f64,
) -> Vec<(String, f64)> {
    let mut hits: Vec<(String, f64)> = utilizations
        .iter()
        .filter(|(_, &u)| u >= threshold)
        .map(|(id, &u)| (id.clone(), u))
        .collect();
    hits.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    hits
}

/// Outcome of a Little's Law sanity check (`L = λW`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LittleLawCheck {
    /// `throughput * avg_cycle_time`.
    pub expected_wip: f64,
    /// The observed average work-in-process.
    pub observed_wip: f64,
    /// `|observed - expected| / expected`.
    pub deviation: f64,
    /// `deviation <= tolerance`.
    pub valid: bool,
}

/// Validates observed work-in-process against Little's Law within a
/// relative tolerance.
pub fn little_law_validation(
    avg_wip: f64,
    throughput: f64,
    avg_cycle_time: f64,
    tolerance: f64,
) -> LittleLawCheck {
    let expected_wip = throughput * avg_cycle_time;
    let deviation = if expected_wip == 0.0 {
        if avg_wip == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        (avg_wip - expected_wip).abs() / expected_wip
    };
    LittleLawCheck {
        expected_wip,
        observed_wip: avg_wip,
        deviation,
        valid: deviation <= tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std_basics() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
        assert_eq!(std_dev(&[5.0]), 0.0);
        let s = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((s - 2.138).abs() < 1e-3);
    }

    #[test]
    fn confidence_interval_degenerates_below_two_points() {
        assert_eq!(confidence_interval(&[7.0], 0.95), (7.0, 7.0));
        assert_eq!(confidence_interval(&[], 0.95), (0.0, 0.0));
    }

    #[test]
    fn confidence_interval_widens_for_small_samples() {
        let data_small: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let data_large: Vec<f64> = (0..40).map(|i| (i % 10) as f64).collect();
        let (lo_s, hi_s) = confidence_interval(&data_small, 0.95);
        let (lo_l, hi_l) = confidence_interval(&data_large, 0.95);
        // Same spread, but the small sample uses the widened critical
        // value (2.0 + 0.1 * 20/30 vs 1.96) over fewer points.
        assert!(hi_s - lo_s > hi_l - lo_l);
    }

    #[test]
    fn z_lookup_matches_confidence_levels() {
        let data: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let (lo90, hi90) = confidence_interval(&data, 0.90);
        let (lo95, hi95) = confidence_interval(&data, 0.95);
        let (lo99, hi99) = confidence_interval(&data, 0.99);
        assert!(hi90 - lo90 < hi95 - lo95);
        assert!(hi95 - lo95 < hi99 - lo99);
    }

    #[test]
    fn replication_statistics_per_metric() {
        let reps = vec![
            BTreeMap::from([("cycle".to_string(), 4.0), ("cost".to_string(), 10.0)]),
            BTreeMap::from([("cycle".to_string(), 6.0), ("cost".to_string(), 10.0)]),
        ];
        let agg = calculate_replication_statistics(&reps);
        assert_eq!(agg["cycle"].mean, 5.0);
        assert_eq!(agg["cycle"].min, 4.0);
        assert_eq!(agg["cycle"].max, 6.0);
        assert_eq!(agg["cycle"].n, 2);
        assert_eq!(agg["cost"].std, 0.0);
    }

    #[test]
    fn identical_samples_are_not_significant() {
        let a = vec![5.0, 5.0, 5.0, 5.0];
        let cmp = compare_samples(&a, &a, 0.05);
        assert_eq!(cmp.t_statistic, 0.0);
        assert_eq!(cmp.p_value, 1.0);
        assert!(!cmp.significant);
    }

    #[test]
    fn clearly_different_samples_are_significant() {
        let baseline: Vec<f64> = (0..30).map(|i| 10.0 + (i % 3) as f64 * 0.1).collect();
        let scenario: Vec<f64> = (0..30).map(|i| 20.0 + (i % 3) as f64 * 0.1).collect();
        let cmp = compare_samples(&baseline, &scenario, 0.05);
        assert!(cmp.t_statistic > 10.0);
        assert!(cmp.p_value < 0.001);
        assert!(cmp.significant);
        assert!((cmp.mean_difference - 10.0).abs() < 1e-9);
    }

    #[test]
    fn tiny_samples_degenerate() {
        let cmp = compare_samples(&[1.0], &[9.0, 9.5], 0.05);
        assert_eq!(cmp.t_statistic, 0.0);
        assert_eq!(cmp.p_value, 1.0);
        assert!(!cmp.significant);
    }

    #[test]
    fn utilization_divides_by_capacity() {
        assert_eq!(calculate_utilization(50.0, 100.0, 1), 50.0);
        assert_eq!(calculate_utilization(50.0, 100.0, 4), 12.5);
        // Capped at 100.
        assert_eq!(calculate_utilization(500.0, 100.0, 1), 100.0);
        assert_eq!(calculate_utilization(10.0, 0.0, 1), 0.0);
    }

    #[test]
    fn bottleneck_detection_filters_and_sorts() {
        let utils = BTreeMap::from([
            ("a".to_string(), 95.0),
            ("b".to_string(), 60.0),
            ("c".to_string(), 80.0),
        ]);
        let hits = detect_bottlenecks(&utils, 70.0);
        assert_eq!(
            hits,
            vec![("a".to_string(), 95.0), ("c".to_string(), 80.0)]
        );
    }

    #[test]
    fn little_law_holds_for_consistent_inputs() {
        // λ = 2/h, W = 1.5h => L = 3.
        let check = little_law_validation(3.1, 2.0, 1.5, 0.1);
        assert!(check.valid);
        assert!((check.expected_wip - 3.0).abs() < 1e-9);

        let check = little_law_validation(5.0, 2.0, 1.5, 0.1);
        assert!(!check.valid);
    }
}

//! Heuristic KPI prediction.
//!
//! Maps simulated metrics onto the KPI codes a process is linked to by
//! substring matching. The baseline is a flat placeholder (real
//! baselines come from the caller's historical data, outside this
//! engine) and the confidence interval a flat ±10% band, not derived
//! from variance. Impact direction treats lower as uniformly better,
//! which is wrong for throughput-like KPIs; callers relying on the
//! historical behavior get exactly that.

use crate::results::{ImpactDirection, KpiPrediction};
use std::collections::BTreeMap;

/// Placeholder baseline used for every KPI.
const BASELINE: f64 = 100.0;

/// The slice of simulated metrics the predictor draws from.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SimulatedMetrics {
    pub(crate) avg_cycle_time: f64,
    pub(crate) total_completed: usize,
    pub(crate) cost_per_unit: f64,
    pub(crate) defect_rate: f64,
}

/// One prediction per linked KPI code, keyed by code.
pub(crate) fn predict(
    linked_kpis: &[String],
    metrics: &SimulatedMetrics,
) -> BTreeMap<String, KpiPrediction> {
    linked_kpis
        .iter()
        .map(|code| {
            let lower = code.to_lowercase();
            let predicted = if lower.contains("cycle_time") {
                metrics.avg_cycle_time
            } else if lower.contains("throughput") {
                metrics.total_completed as f64
            } else if lower.contains("cost") {
                metrics.cost_per_unit
            } else if lower.contains("quality") || lower.contains("defect") {
                metrics.defect_rate * 100.0
            } else {
                BASELINE
            };

            let change_percent = (predicted - BASELINE) / BASELINE * 100.0;
            let impact_direction = if change_percent < 0.0 {
                ImpactDirection::Positive
            } else if change_percent > 0.0 {
                ImpactDirection::Negative
            } else {
                ImpactDirection::Neutral
            };

            (
                code.clone(),
                KpiPrediction {
                    kpi_code: code.clone(),
                    baseline_value: BASELINE,
                    predicted_value: predicted,
                    change_percent,
                    confidence_interval: (predicted * 0.9, predicted * 1.1),
                    impact_direction,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> SimulatedMetrics {
        SimulatedMetrics {
            avg_cycle_time: 4.0,
            total_completed: 150,
            cost_per_unit: 42.0,
            defect_rate: 0.08,
        }
    }

    #[test]
    fn matches_codes_by_substring() {
        let linked = vec![
            "order_cycle_time".to_string(),
            "daily_throughput".to_string(),
            "unit_cost".to_string(),
            "quality_score".to_string(),
            "unmapped_kpi".to_string(),
        ];
        let predictions = predict(&linked, &metrics());
        assert_eq!(predictions["order_cycle_time"].predicted_value, 4.0);
        assert_eq!(predictions["daily_throughput"].predicted_value, 150.0);
        assert_eq!(predictions["unit_cost"].predicted_value, 42.0);
        assert_eq!(predictions["quality_score"].predicted_value, 8.0);
        assert_eq!(predictions["unmapped_kpi"].predicted_value, BASELINE);
        assert_eq!(
            predictions["unmapped_kpi"].impact_direction,
            ImpactDirection::Neutral
        );
    }

    #[test]
    fn confidence_interval_is_flat_ten_percent() {
        let predictions = predict(&["unit_cost".to_string()], &metrics());
        let p = &predictions["unit_cost"];
        assert_eq!(p.confidence_interval, (42.0 * 0.9, 42.0 * 1.1));
    }

    #[test]
    fn higher_throughput_reports_negative_direction() {
        // Documented quirk: direction is uniformly lower-is-better, so a
        // throughput above baseline comes back NEGATIVE.
        let predictions = predict(&["throughput".to_string()], &metrics());
        let p = &predictions["throughput"];
        assert!(p.change_percent > 0.0);
        assert_eq!(p.impact_direction, ImpactDirection::Negative);
    }
}

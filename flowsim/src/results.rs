//! Output contract of the engine.
//!
//! [`SimulationResult`] and [`ComparisonResult`] are the only values that
//! escape a run; all runtime state (entities, pools, stats) is dropped
//! once they are assembled. Maps use `BTreeMap` so that serializing the
//! same result twice yields byte-identical output, which the determinism
//! guarantee relies on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// The run reached its virtual-time horizon and produced full results.
    Completed,
    /// The process had no steps; the run completed immediately with
    /// zero-valued results.
    CompletedEmpty,
}

/// Cycle-time statistics over tracked completed entities, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CycleTimeStats {
    /// Mean cycle time; 0 when no entity completed.
    pub avg: f64,
    /// Minimum cycle time.
    pub min: f64,
    /// Maximum cycle time.
    pub max: f64,
    /// Sample standard deviation; 0 with fewer than two completions.
    pub std: f64,
}

/// Cost statistics over tracked completed entities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostStats {
    /// Sum of per-entity total cost.
    pub total_cost: f64,
    /// `total_cost / completed`; 0 when nothing completed.
    pub cost_per_unit: f64,
}

/// Defect and rework statistics over all tracked entities, completed or
/// not.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityStats {
    /// Number of tracked entities flagged defective.
    pub defect_count: usize,
    /// `defect_count / tracked_entity_count` in `[0, 1]`.
    pub defect_rate: f64,
    /// Sum of rework counters across tracked entities.
    pub total_rework: u64,
}

/// Severity of a bottleneck, derived from utilization thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Utilization at or below 70%.
    Low,
    /// Utilization above 70%.
    Medium,
    /// Utilization above 80%.
    High,
    /// Utilization above 90%.
    Critical,
}

impl Severity {
    /// Classify a utilization percentage.
    pub fn from_utilization(utilization: f64) -> Self {
        if utilization > 90.0 {
            Severity::Critical
        } else if utilization > 80.0 {
            Severity::High
        } else if utilization > 70.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Congestion summary for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckInfo {
    /// Step id.
    pub step_id: String,
    /// Step name.
    pub step_name: String,
    /// Utilization percentage in `[0, 100]`.
    pub utilization: f64,
    /// Mean wait before service, hours.
    pub wait_time_avg: f64,
    /// Longest wait before service, hours.
    pub wait_time_max: f64,
    /// Mean queue length sampled at the moment entities joined.
    pub queue_length_avg: f64,
    /// Severity bucket derived from `utilization`.
    pub severity: Severity,
}

/// Direction of a predicted KPI change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactDirection {
    /// The change is an improvement (lower predicted value).
    Positive,
    /// The change is a regression (higher predicted value).
    Negative,
    /// No change.
    Neutral,
}

/// Heuristic prediction of a KPI's value under the simulated scenario.
///
/// The baseline is a placeholder of 100.0 and the confidence interval a
/// flat ±10%; real baselines belong to the caller. Direction uniformly
/// treats lower as better, which is wrong for throughput-like KPIs — a
/// documented quirk kept for compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiPrediction {
    /// The KPI code this prediction is for.
    pub kpi_code: String,
    /// Assumed current value of the KPI.
    pub baseline_value: f64,
    /// Value implied by the simulated metrics.
    pub predicted_value: f64,
    /// `(predicted - baseline) / baseline * 100`.
    pub change_percent: f64,
    /// `(predicted * 0.9, predicted * 1.1)`.
    pub confidence_interval: (f64, f64),
    /// Direction of the impact.
    pub impact_direction: ImpactDirection,
}

/// A structural problem found in the process graph. Warnings never fail
/// a run; the affected branch is dropped and the run continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum GraphWarning {
    /// A transition references a step missing from `steps`; entities
    /// taking it terminate silently.
    UnknownTransitionTarget {
        /// Source step id of the dangling transition.
        from_step: String,
        /// The unresolved target step id.
        to_step: String,
    },
    /// No step is marked START; the first listed step was used instead.
    MissingStartStep {
        /// Id of the step used as the entry point.
        fallback_step: String,
    },
}

/// Everything one simulation run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Identifier of this run (`sim-{scenario_id}-{seed}` unless the
    /// caller supplied one).
    pub id: String,
    /// The scenario that was run.
    pub scenario_id: String,
    /// Terminal status.
    pub status: RunStatus,
    /// Cycle-time statistics over tracked completed entities.
    pub cycle_time: CycleTimeStats,
    /// Number of tracked entities that reached an END step.
    pub total_completed: usize,
    /// Tracked completions per virtual hour.
    pub throughput_rate: f64,
    /// Per-step utilization percentage, keyed by step id.
    pub resource_utilization: BTreeMap<String, f64>,
    /// Cost statistics.
    pub cost: CostStats,
    /// Defect and rework statistics.
    pub quality: QualityStats,
    /// Congested steps, sorted non-increasing by utilization.
    pub bottlenecks: Vec<BottleneckInfo>,
    /// Heuristic KPI predictions keyed by KPI code.
    pub kpi_predictions: BTreeMap<String, KpiPrediction>,
    /// Structural problems encountered while building the graph.
    pub warnings: Vec<GraphWarning>,
    /// The seed the run's RNG was seeded with; rerunning with this seed
    /// reproduces the result exactly.
    pub seed: u64,
    /// Virtual time at which the run started (always 0).
    pub started_at: f64,
    /// Virtual time at which the run stopped (the horizon).
    pub completed_at: f64,
    /// Number of events dispatched by the scheduler.
    pub events_processed: u64,
}

/// Result of running several scenarios against one base process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// One full result per scenario, keyed by scenario id.
    pub results: BTreeMap<String, SimulationResult>,
    /// KPI x scenario matrix of predicted values, for the comparison
    /// KPIs requested by the caller.
    pub kpi_comparison: BTreeMap<String, BTreeMap<String, f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_thresholds() {
        assert_eq!(Severity::from_utilization(95.0), Severity::Critical);
        assert_eq!(Severity::from_utilization(90.0), Severity::High);
        assert_eq!(Severity::from_utilization(85.0), Severity::High);
        assert_eq!(Severity::from_utilization(80.0), Severity::Medium);
        assert_eq!(Severity::from_utilization(75.0), Severity::Medium);
        assert_eq!(Severity::from_utilization(70.0), Severity::Low);
        assert_eq!(Severity::from_utilization(0.0), Severity::Low);
    }
}

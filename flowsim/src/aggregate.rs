//! Reduction of raw run state into a [`SimulationResult`].
//!
//! Consumes the entity arena and per-step stats left behind by the
//! event loop; nothing here mutates run state. Warm-up entities are
//! already flagged untracked by the engine and are skipped everywhere
//! except resource congestion, which they influenced while the run was
//! live.

use crate::engine::SimulationRun;
use crate::kpi;
use crate::model::{ProcessDefinition, ScenarioDefinition, UtilizationMode};
use crate::results::{
    BottleneckInfo, CostStats, CycleTimeStats, GraphWarning, QualityStats, RunStatus, Severity,
    SimulationResult,
};
use crate::stats;
use std::collections::BTreeMap;

/// Zero-valued result for a process with no steps.
pub(crate) fn empty_result(
    id: String,
    scenario: &ScenarioDefinition,
    seed: u64,
) -> SimulationResult {
    SimulationResult {
        id,
        scenario_id: scenario.id.clone(),
        status: RunStatus::CompletedEmpty,
        cycle_time: CycleTimeStats::default(),
        total_completed: 0,
        throughput_rate: 0.0,
        resource_utilization: BTreeMap::new(),
        cost: CostStats::default(),
        quality: QualityStats::default(),
        bottlenecks: Vec::new(),
        kpi_predictions: BTreeMap::new(),
        warnings: Vec::new(),
        seed,
        started_at: 0.0,
        completed_at: 0.0,
        events_processed: 0,
    }
}

/// Reduces a finished run into the caller-facing result.
pub(crate) fn assemble(
    run: &SimulationRun<'_>,
    process: &ProcessDefinition,
    scenario: &ScenarioDefinition,
    id: String,
    seed: u64,
    warnings: Vec<GraphWarning>,
) -> SimulationResult {
    let total_time = run.final_time();
    let tracked: Vec<_> = run.entities.iter().filter(|e| e.tracked).collect();
    let completed: Vec<_> = tracked.iter().filter(|e| e.completed).copied().collect();

    // Cycle time = span from first service start to last service end,
    // plus accumulated queue waits.
    let cycle_times: Vec<f64> = completed
        .iter()
        .map(|e| {
            let first_start = e.start_times.values().fold(f64::INFINITY, |a, &b| a.min(b));
            let first_start = if first_start.is_finite() {
                first_start
            } else {
                e.arrival_time
            };
            let last_end = e.end_times.values().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            let last_end = if last_end.is_finite() {
                last_end
            } else {
                e.arrival_time
            };
            let queued: f64 = e.queue_times.values().sum();
            (last_end - first_start) + queued
        })
        .collect();

    let cycle_time = if cycle_times.is_empty() {
        CycleTimeStats::default()
    } else {
        CycleTimeStats {
            avg: stats::mean(&cycle_times),
            min: cycle_times.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
            max: cycle_times.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
            std: stats::std_dev(&cycle_times),
        }
    };

    let throughput_rate = if total_time > 0.0 {
        completed.len() as f64 / total_time
    } else {
        0.0
    };

    let mut resource_utilization = BTreeMap::new();
    for (&idx, st) in &run.step_stats {
        let step = &process.steps[idx];
        let utilization = match run.config.utilization_mode {
            UtilizationMode::CapacityAware => {
                stats::calculate_utilization(st.total_processing_time, total_time, step.capacity())
            }
            UtilizationMode::Legacy => {
                if total_time > 0.0 {
                    (st.total_processing_time / total_time * 100.0).min(100.0)
                } else {
                    0.0
                }
            }
        };
        resource_utilization.insert(step.id.clone(), utilization);
    }

    let total_cost: f64 = completed.iter().map(|e| e.total_cost).sum();
    let cost = CostStats {
        total_cost,
        cost_per_unit: if completed.is_empty() {
            0.0
        } else {
            total_cost / completed.len() as f64
        },
    };

    // Defects count over all tracked entities, completed or in flight.
    let defect_count = tracked.iter().filter(|e| e.defect).count();
    let quality = QualityStats {
        defect_count,
        defect_rate: if tracked.is_empty() {
            0.0
        } else {
            defect_count as f64 / tracked.len() as f64
        },
        total_rework: tracked.iter().map(|e| e.rework_count).sum(),
    };

    let mut bottlenecks: Vec<BottleneckInfo> = run
        .step_stats
        .iter()
        .filter(|(_, st)| st.processing_count > 0)
        .map(|(&idx, st)| {
            let step = &process.steps[idx];
            let utilization = resource_utilization.get(&step.id).copied().unwrap_or(0.0);
            BottleneckInfo {
                step_id: step.id.clone(),
                step_name: step.name.clone(),
                utilization,
                wait_time_avg: st.total_wait_time / st.processing_count as f64,
                wait_time_max: st.wait_time_max,
                queue_length_avg: if st.queue_lengths.is_empty() {
                    0.0
                } else {
                    st.queue_lengths.iter().sum::<usize>() as f64 / st.queue_lengths.len() as f64
                },
                severity: Severity::from_utilization(utilization),
            }
        })
        .collect();
    bottlenecks.sort_by(|a, b| {
        b.utilization
            .total_cmp(&a.utilization)
            .then_with(|| a.step_id.cmp(&b.step_id))
    });

    let kpi_predictions = kpi::predict(
        &process.linked_kpis,
        &kpi::SimulatedMetrics {
            avg_cycle_time: cycle_time.avg,
            total_completed: completed.len(),
            cost_per_unit: cost.cost_per_unit,
            defect_rate: quality.defect_rate,
        },
    );

    SimulationResult {
        id,
        scenario_id: scenario.id.clone(),
        status: RunStatus::Completed,
        cycle_time,
        total_completed: completed.len(),
        throughput_rate,
        resource_utilization,
        cost,
        quality,
        bottlenecks,
        kpi_predictions,
        warnings,
        seed,
        started_at: 0.0,
        completed_at: total_time,
        events_processed: run.events_processed,
    }
}

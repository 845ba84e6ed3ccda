//! Running scenario sets against one base process.
//!
//! Each scenario run owns its clock, pools, and RNG, so runs share no
//! mutable state and `compare_scenarios` executes them on OS threads.
//! `run_replications` re-runs a single scenario with derived seeds and
//! aggregates per-metric statistics across the replications.

use crate::engine::run_simulation;
use crate::error::SimResult;
use crate::model::{ProcessDefinition, ScenarioDefinition};
use crate::results::{ComparisonResult, SimulationResult};
use crate::stats::{calculate_replication_statistics, ReplicationStats};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Runs every scenario against `process` (one OS thread per scenario)
/// and assembles a KPI x scenario matrix of predicted values for the
/// requested comparison KPIs.
#[instrument(skip_all, fields(process_id = %process.id, scenarios = scenarios.len()))]
pub fn compare_scenarios(
    process: &ProcessDefinition,
    scenarios: &[ScenarioDefinition],
    comparison_kpis: &[String],
) -> SimResult<ComparisonResult> {
    let outcomes: Vec<SimResult<SimulationResult>> = std::thread::scope(|scope| {
        let handles: Vec<_> = scenarios
            .iter()
            .map(|scenario| scope.spawn(move || run_simulation(process, scenario, None)))
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(outcome) => outcome,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    });

    let mut results = BTreeMap::new();
    for outcome in outcomes {
        let result = outcome?;
        results.insert(result.scenario_id.clone(), result);
    }
    debug!(runs = results.len(), "all scenario runs finished");

    let mut kpi_comparison: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for kpi in comparison_kpis {
        let row: BTreeMap<String, f64> = results
            .iter()
            .filter_map(|(scenario_id, result)| {
                result
                    .kpi_predictions
                    .get(kpi)
                    .map(|p| (scenario_id.clone(), p.predicted_value))
            })
            .collect();
        kpi_comparison.insert(kpi.clone(), row);
    }

    Ok(ComparisonResult {
        results,
        kpi_comparison,
    })
}

/// Results of re-running one scenario several times with derived seeds.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationReport {
    /// One full result per replication, in replication order.
    pub results: Vec<SimulationResult>,
    /// Per-metric statistics across the replications.
    pub statistics: BTreeMap<String, ReplicationStats>,
}

/// Runs `replications` independent copies of the scenario, seeding
/// replication `i` with `base_seed + i`, and aggregates the headline
/// metrics across them.
#[instrument(skip_all, fields(scenario_id = %scenario.id, replications))]
pub fn run_replications(
    process: &ProcessDefinition,
    scenario: &ScenarioDefinition,
    replications: usize,
) -> SimResult<ReplicationReport> {
    let base_seed = scenario
        .simulation_config
        .random_seed
        .unwrap_or_else(|| rand::rng().random());

    let mut results = Vec::with_capacity(replications);
    let mut metric_maps = Vec::with_capacity(replications);
    for i in 0..replications {
        let mut replication = scenario.clone();
        replication.simulation_config.random_seed = Some(base_seed.wrapping_add(i as u64));
        let result = run_simulation(process, &replication, None)?;
        metric_maps.push(headline_metrics(&result));
        results.push(result);
    }

    Ok(ReplicationReport {
        statistics: calculate_replication_statistics(&metric_maps),
        results,
    })
}

fn headline_metrics(result: &SimulationResult) -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("avg_cycle_time".to_string(), result.cycle_time.avg),
        ("throughput_rate".to_string(), result.throughput_rate),
        (
            "total_completed".to_string(),
            result.total_completed as f64,
        ),
        ("total_cost".to_string(), result.cost.total_cost),
        ("cost_per_unit".to_string(), result.cost.cost_per_unit),
        ("defect_rate".to_string(), result.quality.defect_rate),
    ])
}

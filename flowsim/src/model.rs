//! Declarative process and scenario definitions.
//!
//! These types are the input contract of the engine: an external service
//! layer hands over an already-validated [`ProcessDefinition`] plus a
//! [`ScenarioDefinition`] and receives a
//! [`SimulationResult`](crate::results::SimulationResult) back. The engine
//! only ever reads these values; scenario overlays operate on a private
//! deep copy.

use serde::{Deserialize, Serialize};

/// A declarative description of a business process: steps, probabilistic
/// transitions, and the KPIs the process is linked to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    /// Unique identifier of the process.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Ordered list of steps. The first step marked
    /// [`StepType::Start`] is the entry point; if none is marked, the
    /// first step in this list is used.
    pub steps: Vec<ProcessStep>,
    /// Probabilistic edges between steps.
    pub transitions: Vec<Transition>,
    /// KPI codes this process is linked to; drives KPI prediction.
    #[serde(default)]
    pub linked_kpis: Vec<String>,
    /// How outgoing transitions of a step are interpreted.
    #[serde(default)]
    pub routing: RoutingPolicy,
    /// What happens when a defect is rolled at the end of a step.
    #[serde(default)]
    pub rework: ReworkPolicy,
}

/// The role a step plays in the process graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepType {
    /// Entry point; holds no time and consumes no resources.
    Start,
    /// A unit of work with duration, cost, and capacity.
    Task,
    /// A branching point; behaves like a task but usually routes.
    Decision,
    /// Terminal step; marks the entity completed.
    End,
}

/// A single step of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessStep {
    /// Unique identifier of the step within the process.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// The role of this step.
    pub step_type: StepType,
    /// Distribution the processing duration is sampled from (hours).
    pub duration_distribution: Distribution,
    /// Probability in `[0, 1]` that processing produces a defect.
    #[serde(default)]
    pub defect_rate: f64,
    /// Fixed cost charged once per visit.
    #[serde(default)]
    pub fixed_cost: f64,
    /// Variable cost charged per unit of volume (unit volume assumed).
    #[serde(default)]
    pub variable_cost_per_unit: f64,
    /// Resource capacity: how many entities this step can process
    /// concurrently. Unset means 1.
    #[serde(default)]
    pub max_concurrent: Option<u32>,
}

impl ProcessStep {
    /// Effective resource capacity of this step, never below 1.
    pub fn capacity(&self) -> usize {
        self.max_concurrent.map_or(1, |c| c.max(1) as usize)
    }
}

/// A probabilistic edge from one step to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Source step id.
    pub from_step: String,
    /// Target step id.
    pub to_step: String,
    /// Probability in `[0, 1]` that this edge is taken.
    pub probability: f64,
}

/// A distribution family for durations and inter-arrival times.
///
/// Durations are sampled in hours. For arrivals, `rate` families are
/// interpreted as arrivals-per-hour (see
/// [`sample_interarrival`](crate::sampling::sample_interarrival)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    /// A constant value.
    Fixed {
        /// The constant value returned by every draw.
        value: f64,
    },
    /// Gaussian; negative draws are truncated to zero.
    Normal {
        /// Mean of the distribution.
        mean: f64,
        /// Standard deviation.
        std: f64,
    },
    /// Exponential with the given rate (events per hour).
    Exponential {
        /// Rate parameter; non-positive rates sample as zero.
        rate: f64,
    },
    /// Triangular over `[min, max]` with the given mode.
    Triangular {
        /// Lower bound.
        min: f64,
        /// Most likely value.
        mode: f64,
        /// Upper bound.
        max: f64,
    },
    /// Uniform over `[min, max]`.
    Uniform {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Poisson arrival process with the given rate (arrivals per hour).
    /// As a duration distribution this is not meaningful and samples as
    /// the default gap of 1.0.
    Poisson {
        /// Arrivals per hour.
        rate: f64,
    },
}

/// How the outgoing transitions of a step are interpreted when routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingPolicy {
    /// Every outgoing transition is an independent Bernoulli trial: an
    /// entity can fan out into zero, one, or several concurrent
    /// downstream paths. Historical semantics, the default.
    #[default]
    Independent,
    /// Outgoing probabilities are normalized and exactly one successor
    /// is sampled (none when all probabilities are zero).
    Exclusive,
}

/// What happens when a step's defect trial succeeds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ReworkPolicy {
    /// Defect is a terminal quality flag: `defect` is set and
    /// `rework_count` incremented, nothing else happens. The default.
    #[default]
    None,
    /// The entity is routed back into the named step instead of
    /// continuing downstream.
    Reroute {
        /// Step id the defective entity re-enters.
        step: String,
    },
    /// The entity holds its resource for `factor x duration` extra time
    /// before releasing and routing normally.
    ExtraDuration {
        /// Multiplier applied to the sampled duration.
        factor: f64,
    },
}

/// A scenario: arrival pattern, parameter overrides, and run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    /// Unique identifier of the scenario.
    pub id: String,
    /// Distribution of inter-arrival gaps (rate families are
    /// arrivals-per-hour).
    pub arrival_distribution: Distribution,
    /// Overrides applied to a copy of the base process before the run.
    #[serde(default)]
    pub parameter_changes: Vec<ParameterChange>,
    /// Clock horizon, warm-up, and seeding.
    pub simulation_config: SimulationConfig,
}

/// The aspect of a step a [`ParameterChange`] overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Override the central tendency of the duration distribution.
    StepDuration,
    /// Override the defect probability.
    DefectRate,
    /// Override fixed or variable cost (selected by `parameter`).
    Cost,
    /// Override the resource capacity (`max_concurrent`).
    ResourceCapacity,
}

/// A single override a scenario applies to one step of the base process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterChange {
    /// Id of the step the change applies to.
    pub target: String,
    /// Which aspect of the step changes.
    pub change_type: ChangeType,
    /// For [`ChangeType::Cost`]: `"fixed_cost"` selects the fixed cost,
    /// anything else the variable cost. Ignored otherwise.
    #[serde(default)]
    pub parameter: Option<String>,
    /// The new value.
    pub new_value: f64,
}

/// How per-step utilization is computed by the results aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationMode {
    /// Busy time divided by `total_time x capacity` — the capacity-aware
    /// formula, single source of truth. The default.
    #[default]
    CapacityAware,
    /// Busy time divided by `total_time` alone, ignoring multi-unit
    /// capacity. Preserved for bit-for-bit compatibility with results
    /// produced by the original engine.
    Legacy,
}

/// Clock, warm-up, and seeding configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Seed for the run's RNG. When absent the engine seeds itself from
    /// entropy and records the chosen seed on the result.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Initial interval whose arrivals are excluded from reported
    /// statistics but still consume resources (pre-existing load).
    #[serde(default)]
    pub warm_up_period_hours: f64,
    /// Length of the measured interval after warm-up.
    pub simulation_duration_hours: f64,
    /// Utilization formula selection.
    #[serde(default)]
    pub utilization_mode: UtilizationMode,
}

impl SimulationConfig {
    /// The virtual-time horizon of the run: warm-up plus measured
    /// duration.
    pub fn horizon_hours(&self) -> f64 {
        self.warm_up_period_hours + self.simulation_duration_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_defaults_to_one() {
        let mut step = ProcessStep {
            id: "a".into(),
            name: "A".into(),
            step_type: StepType::Task,
            duration_distribution: Distribution::Fixed { value: 1.0 },
            defect_rate: 0.0,
            fixed_cost: 0.0,
            variable_cost_per_unit: 0.0,
            max_concurrent: None,
        };
        assert_eq!(step.capacity(), 1);
        step.max_concurrent = Some(0);
        assert_eq!(step.capacity(), 1);
        step.max_concurrent = Some(4);
        assert_eq!(step.capacity(), 4);
    }

    #[test]
    fn distribution_serde_tagging() {
        let dist = Distribution::Normal {
            mean: 2.0,
            std: 0.5,
        };
        let json = serde_json::to_string(&dist).unwrap();
        assert!(json.contains("\"kind\":\"normal\""));
        let back: Distribution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dist);
    }
}

//! # Flowsim
//!
//! A deterministic discrete-event simulation engine for business
//! processes: entities flow through a declared process graph under
//! resource constraints while a virtual clock dispatches events in
//! time order, producing cycle-time, throughput, utilization, cost,
//! quality, and bottleneck metrics, with statistical comparison across
//! scenarios.
//!
//! The engine is a pure computation boundary. It receives an
//! already-validated [`ProcessDefinition`] and [`ScenarioDefinition`]
//! and returns a [`SimulationResult`]; persistence, HTTP, and
//! authentication belong to the caller.
//!
//! ## Example
//!
//! ```rust
//! use flowsim::{
//!     run_simulation, Distribution, ProcessDefinition, ProcessStep, ScenarioDefinition,
//!     SimulationConfig, StepType, Transition,
//! };
//!
//! let process = ProcessDefinition {
//!     id: "order-fulfilment".into(),
//!     name: "Order fulfilment".into(),
//!     steps: vec![
//!         ProcessStep {
//!             id: "start".into(),
//!             name: "Start".into(),
//!             step_type: StepType::Start,
//!             duration_distribution: Distribution::Fixed { value: 0.0 },
//!             defect_rate: 0.0,
//!             fixed_cost: 0.0,
//!             variable_cost_per_unit: 0.0,
//!             max_concurrent: None,
//!         },
//!         ProcessStep {
//!             id: "pick".into(),
//!             name: "Pick".into(),
//!             step_type: StepType::Task,
//!             duration_distribution: Distribution::Fixed { value: 0.5 },
//!             defect_rate: 0.0,
//!             fixed_cost: 2.0,
//!             variable_cost_per_unit: 0.5,
//!             max_concurrent: Some(2),
//!         },
//!         ProcessStep {
//!             id: "end".into(),
//!             name: "End".into(),
//!             step_type: StepType::End,
//!             duration_distribution: Distribution::Fixed { value: 0.0 },
//!             defect_rate: 0.0,
//!             fixed_cost: 0.0,
//!             variable_cost_per_unit: 0.0,
//!             max_concurrent: None,
//!         },
//!     ],
//!     transitions: vec![
//!         Transition { from_step: "start".into(), to_step: "pick".into(), probability: 1.0 },
//!         Transition { from_step: "pick".into(), to_step: "end".into(), probability: 1.0 },
//!     ],
//!     linked_kpis: vec!["order_cycle_time".into()],
//!     routing: Default::default(),
//!     rework: Default::default(),
//! };
//!
//! let scenario = ScenarioDefinition {
//!     id: "baseline".into(),
//!     arrival_distribution: Distribution::Poisson { rate: 1.5 },
//!     parameter_changes: vec![],
//!     simulation_config: SimulationConfig {
//!         random_seed: Some(42),
//!         warm_up_period_hours: 0.0,
//!         simulation_duration_hours: 40.0,
//!         utilization_mode: Default::default(),
//!     },
//! };
//!
//! let result = run_simulation(&process, &scenario, None).unwrap();
//! assert!(result.total_completed > 0);
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

/// Reduction of raw run state into results.
mod aggregate;
/// Scenario comparison and replication runs.
pub mod compare;
/// The simulation core: clock, arrivals, entity processes.
pub mod engine;
/// Error types for scenario validation.
pub mod error;
/// Event scheduling for the virtual clock.
pub mod events;
/// In-memory view of the process graph.
pub mod graph;
/// Heuristic KPI prediction.
mod kpi;
/// Declarative process and scenario definitions.
pub mod model;
/// Scenario overlay onto a copy of the base process.
pub mod overlay;
/// Capacity-bounded resource pools.
mod resources;
/// Output contract: simulation and comparison results.
pub mod results;
/// Random draws from declared distribution families.
pub mod sampling;
/// Statistics toolkit: intervals, comparisons, Little's Law.
pub mod stats;

// Public API exports
pub use compare::{compare_scenarios, run_replications, ReplicationReport};
pub use engine::run_simulation;
pub use error::{EngineError, SimResult};
pub use events::SimTime;
pub use model::{
    ChangeType, Distribution, ParameterChange, ProcessDefinition, ProcessStep, ReworkPolicy,
    RoutingPolicy, ScenarioDefinition, SimulationConfig, StepType, Transition, UtilizationMode,
};
pub use results::{
    BottleneckInfo, ComparisonResult, CostStats, CycleTimeStats, GraphWarning, ImpactDirection,
    KpiPrediction, QualityStats, RunStatus, Severity, SimulationResult,
};
pub use stats::{
    calculate_replication_statistics, calculate_utilization, compare_samples, confidence_interval,
    detect_bottlenecks, little_law_validation, LittleLawCheck, ReplicationStats, SampleComparison,
};

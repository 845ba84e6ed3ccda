//! Shared builders for integration tests.

#![allow(dead_code)]

use flowsim::{
    Distribution, ProcessDefinition, ProcessStep, ScenarioDefinition, SimulationConfig, StepType,
    Transition,
};

pub fn step(id: &str, step_type: StepType, dist: Distribution) -> ProcessStep {
    ProcessStep {
        id: id.into(),
        name: id.to_uppercase(),
        step_type,
        duration_distribution: dist,
        defect_rate: 0.0,
        fixed_cost: 0.0,
        variable_cost_per_unit: 0.0,
        max_concurrent: None,
    }
}

pub fn start(id: &str) -> ProcessStep {
    step(id, StepType::Start, Distribution::Fixed { value: 0.0 })
}

pub fn end(id: &str) -> ProcessStep {
    step(id, StepType::End, Distribution::Fixed { value: 0.0 })
}

pub fn task(id: &str, hours: f64) -> ProcessStep {
    step(id, StepType::Task, Distribution::Fixed { value: hours })
}

pub fn transition(from: &str, to: &str, probability: f64) -> Transition {
    Transition {
        from_step: from.into(),
        to_step: to.into(),
        probability,
    }
}

pub fn process(steps: Vec<ProcessStep>, transitions: Vec<Transition>) -> ProcessDefinition {
    ProcessDefinition {
        id: "proc".into(),
        name: "Test process".into(),
        steps,
        transitions,
        linked_kpis: vec![],
        routing: Default::default(),
        rework: Default::default(),
    }
}

/// `START -> a(task_hours) -> END` with full-probability transitions.
pub fn linear_process(task_hours: f64) -> ProcessDefinition {
    process(
        vec![start("start"), task("a", task_hours), end("end")],
        vec![transition("start", "a", 1.0), transition("a", "end", 1.0)],
    )
}

/// Deterministic arrivals at `rate` per hour, seeded.
pub fn fixed_arrival_scenario(
    id: &str,
    rate: f64,
    seed: u64,
    warm_up: f64,
    duration: f64,
) -> ScenarioDefinition {
    ScenarioDefinition {
        id: id.into(),
        arrival_distribution: Distribution::Fixed { value: rate },
        parameter_changes: vec![],
        simulation_config: SimulationConfig {
            random_seed: Some(seed),
            warm_up_period_hours: warm_up,
            simulation_duration_hours: duration,
            utilization_mode: Default::default(),
        },
    }
}

/// Poisson arrivals at `rate` per hour, seeded.
pub fn poisson_arrival_scenario(id: &str, rate: f64, seed: u64, duration: f64) -> ScenarioDefinition {
    ScenarioDefinition {
        id: id.into(),
        arrival_distribution: Distribution::Poisson { rate },
        parameter_changes: vec![],
        simulation_config: SimulationConfig {
            random_seed: Some(seed),
            warm_up_period_hours: 0.0,
            simulation_duration_hours: duration,
            utilization_mode: Default::default(),
        },
    }
}

//! The simulation core: virtual clock, arrivals, and entity processes.
//!
//! One [`SimulationRun`] value owns everything mutable for a single run
//! (clock, event queue, resource pools, entity arena, per-step stats,
//! RNG) and is dropped once the result is assembled, so nothing leaks
//! across runs and scenario comparisons can run on separate threads.
//!
//! Entity processes are an explicit state machine over the event queue
//! rather than coroutines: an entity suspends only while waiting for a
//! resource slot (parked in a FIFO queue) or while holding one (a
//! `ServiceDone` event pending), and resumes strictly in virtual-time
//! order.

use crate::error::SimResult;
use crate::events::{EngineEvent, EventQueue, SimTime};
use crate::graph::ProcessGraph;
use crate::model::{
    ProcessDefinition, ReworkPolicy, RoutingPolicy, ScenarioDefinition, SimulationConfig, StepType,
};
use crate::resources::{ResourcePools, Waiter};
use crate::results::SimulationResult;
use crate::sampling::{sample_duration, sample_interarrival};
use crate::{aggregate, overlay};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, instrument, trace};

/// One simulated work item flowing through the process.
///
/// Engine-owned and never exposed raw; the arena index is its identity.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProcessEntity {
    /// Virtual time the entity entered the system.
    pub(crate) arrival_time: f64,
    /// Whether the entity arrived after the warm-up period and counts
    /// toward reported statistics.
    pub(crate) tracked: bool,
    /// First service start per step index.
    pub(crate) start_times: HashMap<usize, f64>,
    /// Last service end per step index.
    pub(crate) end_times: HashMap<usize, f64>,
    /// Accumulated wait before service per step index.
    pub(crate) queue_times: HashMap<usize, f64>,
    /// Reached an END step.
    pub(crate) completed: bool,
    /// At least one defect trial succeeded.
    pub(crate) defect: bool,
    /// Number of successful defect trials.
    pub(crate) rework_count: u64,
    /// Accumulated fixed plus variable cost.
    pub(crate) total_cost: f64,
}

/// Aggregate counters per step. Only ever incremented within one run.
#[derive(Debug, Clone, Default)]
pub(crate) struct StepStats {
    /// Services started (rework holds excluded).
    pub(crate) processing_count: u64,
    /// Sum of waits before service, hours.
    pub(crate) total_wait_time: f64,
    /// Longest single wait, hours.
    pub(crate) wait_time_max: f64,
    /// Busy time: sum of sampled hold durations, accrued when the hold
    /// begins, rework penalties included.
    pub(crate) total_processing_time: f64,
    /// Queue length sampled at each join.
    pub(crate) queue_lengths: Vec<usize>,
}

/// All mutable state of one simulation run.
pub(crate) struct SimulationRun<'a> {
    process: &'a ProcessDefinition,
    graph: &'a ProcessGraph<'a>,
    pub(crate) config: &'a SimulationConfig,
    arrival_dist: &'a crate::model::Distribution,
    clock: SimTime,
    horizon: f64,
    warm_up: f64,
    queue: EventQueue,
    pools: ResourcePools,
    pub(crate) entities: Vec<ProcessEntity>,
    pub(crate) step_stats: HashMap<usize, StepStats>,
    rng: ChaCha8Rng,
    pub(crate) events_processed: u64,
}

impl<'a> SimulationRun<'a> {
    pub(crate) fn new(
        process: &'a ProcessDefinition,
        graph: &'a ProcessGraph<'a>,
        scenario: &'a ScenarioDefinition,
        seed: u64,
    ) -> Self {
        let config = &scenario.simulation_config;
        Self {
            process,
            graph,
            config,
            arrival_dist: &scenario.arrival_distribution,
            clock: SimTime::ZERO,
            horizon: config.horizon_hours(),
            warm_up: config.warm_up_period_hours,
            queue: EventQueue::new(),
            pools: ResourcePools::new(),
            entities: Vec::new(),
            step_stats: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            events_processed: 0,
        }
    }

    /// Final value of the virtual clock, in hours.
    pub(crate) fn final_time(&self) -> f64 {
        self.clock.hours()
    }

    /// Dispatches events in virtual-time order until the horizon is
    /// reached, then clamps the clock to the horizon.
    pub(crate) fn execute(&mut self) {
        if self.horizon <= 0.0 {
            return;
        }
        let first_gap = sample_interarrival(&mut self.rng, self.arrival_dist);
        self.queue.schedule_at(EngineEvent::Arrival, SimTime(first_gap));

        while let Some(scheduled) = self.queue.pop_earliest() {
            if scheduled.time().hours() >= self.horizon {
                break;
            }
            self.clock = scheduled.time();
            self.events_processed += 1;
            match scheduled.into_event() {
                EngineEvent::Arrival => self.handle_arrival(),
                EngineEvent::ServiceDone {
                    entity,
                    step,
                    duration,
                    rework,
                } => self.handle_service_done(entity, step, duration, rework),
            }
        }
        self.clock = SimTime(self.horizon);
    }

    fn handle_arrival(&mut self) {
        let now = self.clock.hours();
        let entity = self.entities.len();
        self.entities.push(ProcessEntity {
            arrival_time: now,
            tracked: now >= self.warm_up,
            ..ProcessEntity::default()
        });
        trace!(entity, now, "entity arrived");

        if let Some(start) = self.graph.start() {
            self.enter_step(entity, start);
        }

        let gap = sample_interarrival(&mut self.rng, self.arrival_dist);
        self.queue
            .schedule_at(EngineEvent::Arrival, self.clock.after(gap));
    }

    /// Walks an entity into a step and onward through any zero-time
    /// steps (START routes immediately, END terminates).
    fn enter_step(&mut self, entity: usize, start_idx: usize) {
        let mut pending = VecDeque::from([start_idx]);
        while let Some(idx) = pending.pop_front() {
            match self.graph.step(idx).step_type {
                StepType::Start => pending.extend(self.route_from(idx)),
                StepType::End => {
                    let e = &mut self.entities[entity];
                    e.completed = true;
                    e.end_times.insert(idx, self.clock.hours());
                }
                StepType::Task | StepType::Decision => self.join_queue(entity, idx),
            }
        }
    }

    fn join_queue(&mut self, entity: usize, idx: usize) {
        let step = self.graph.step(idx);
        let waiting = self.pools.queue_len(idx);
        self.step_stats
            .entry(idx)
            .or_default()
            .queue_lengths
            .push(waiting);

        if self.pools.try_acquire(idx, step.capacity()) {
            self.start_service(entity, idx, 0.0);
        } else {
            self.pools.enqueue(
                idx,
                step.capacity(),
                Waiter {
                    entity,
                    enqueued_at: self.clock,
                },
            );
        }
    }

    /// Begins a hold on an already-acquired slot. Busy time accrues
    /// here, when the hold begins, so a service truncated by the
    /// horizon still shows up as load.
    fn start_service(&mut self, entity: usize, idx: usize, wait: f64) {
        let step = self.graph.step(idx);
        let now = self.clock.hours();

        let e = &mut self.entities[entity];
        *e.queue_times.entry(idx).or_insert(0.0) += wait;
        e.start_times.entry(idx).or_insert(now);

        let duration = sample_duration(&mut self.rng, &step.duration_distribution);

        let stats = self.step_stats.entry(idx).or_default();
        stats.processing_count += 1;
        stats.total_wait_time += wait;
        stats.wait_time_max = stats.wait_time_max.max(wait);
        stats.total_processing_time += duration;
        trace!(entity, step = %step.id, wait, duration, "service started");
        self.queue.schedule_at(
            EngineEvent::ServiceDone {
                entity,
                step: idx,
                duration,
                rework: false,
            },
            self.clock.after(duration),
        );
    }

    fn handle_service_done(&mut self, entity: usize, idx: usize, duration: f64, rework: bool) {
        let step = self.graph.step(idx);
        let now = self.clock.hours();

        let e = &mut self.entities[entity];
        e.end_times.insert(idx, now);

        if !rework {
            e.total_cost += step.fixed_cost + step.variable_cost_per_unit;

            if self.rng.random::<f64>() < step.defect_rate {
                let e = &mut self.entities[entity];
                e.defect = true;
                e.rework_count += 1;
                trace!(entity, step = %step.id, "defect");
                match self.process.rework.clone() {
                    ReworkPolicy::None => {}
                    ReworkPolicy::ExtraDuration { factor } => {
                        // Keep the slot for the penalty hold; the extra
                        // busy time counts toward the step's load.
                        let penalty = duration * factor;
                        self.step_stats.entry(idx).or_default().total_processing_time += penalty;
                        self.queue.schedule_at(
                            EngineEvent::ServiceDone {
                                entity,
                                step: idx,
                                duration: penalty,
                                rework: true,
                            },
                            self.clock.after(penalty),
                        );
                        return;
                    }
                    ReworkPolicy::Reroute { step: target } => {
                        self.release_and_grant(idx);
                        if let Some(target_idx) = self.graph.resolve(&target) {
                            self.enter_step(entity, target_idx);
                        }
                        return;
                    }
                }
            }
        }

        self.release_and_grant(idx);
        for next in self.route_from(idx) {
            self.enter_step(entity, next);
        }
    }

    /// Releases the slot on `idx`; a queued waiter (FIFO) takes it over
    /// immediately at the current timestamp.
    fn release_and_grant(&mut self, idx: usize) {
        if let Some(waiter) = self.pools.release(idx) {
            let wait = self.clock.hours() - waiter.enqueued_at.hours();
            self.start_service(waiter.entity, idx, wait);
        }
    }

    /// Samples the successor steps of `idx` under the process's routing
    /// policy, dropping transitions whose target is unknown.
    fn route_from(&mut self, idx: usize) -> Vec<usize> {
        let graph = self.graph;
        let rng = &mut self.rng;
        let successors = graph.successors(idx);

        match self.process.routing {
            RoutingPolicy::Independent => successors
                .iter()
                .filter_map(|&t| {
                    let tr = graph.transition(t);
                    if rng.random::<f64>() < tr.probability {
                        graph.resolve(&tr.to_step)
                    } else {
                        None
                    }
                })
                .collect(),
            RoutingPolicy::Exclusive => {
                let total: f64 = successors
                    .iter()
                    .map(|&t| graph.transition(t).probability.max(0.0))
                    .sum();
                if total <= 0.0 {
                    return Vec::new();
                }
                let mut u = rng.random::<f64>() * total;
                for &t in successors {
                    let p = graph.transition(t).probability.max(0.0);
                    if u < p {
                        return graph.resolve(&graph.transition(t).to_step).into_iter().collect();
                    }
                    u -= p;
                }
                // Rounding left us past the end; take the last positive edge.
                successors
                    .iter()
                    .rev()
                    .find(|&&t| graph.transition(t).probability > 0.0)
                    .and_then(|&t| graph.resolve(&graph.transition(t).to_step))
                    .into_iter()
                    .collect()
            }
        }
    }
}

/// Runs one scenario against a process and returns the full result.
///
/// Pure in its inputs plus the seed: with `random_seed` set, two calls
/// with identical arguments produce identical results. When the seed is
/// absent one is drawn from entropy and recorded on the result.
#[instrument(skip_all, fields(process_id = %process.id, scenario_id = %scenario.id))]
pub fn run_simulation(
    process: &ProcessDefinition,
    scenario: &ScenarioDefinition,
    simulation_id: Option<String>,
) -> SimResult<SimulationResult> {
    let seed = scenario
        .simulation_config
        .random_seed
        .unwrap_or_else(|| rand::rng().random());
    let id = simulation_id.unwrap_or_else(|| format!("sim-{}-{}", scenario.id, seed));

    let overlaid = overlay::apply(process, &scenario.parameter_changes)?;
    if overlaid.steps.is_empty() {
        debug!("process has no steps; returning zero-valued result");
        return Ok(aggregate::empty_result(id, scenario, seed));
    }

    let (graph, warnings) = ProcessGraph::build(&overlaid);
    let mut run = SimulationRun::new(&overlaid, &graph, scenario, seed);
    run.execute();
    debug!(
        entities = run.entities.len(),
        events = run.events_processed,
        "run reached horizon"
    );
    Ok(aggregate::assemble(&run, &overlaid, scenario, id, seed, warnings))
}

//! In-memory view of the process graph.
//!
//! Built once per run from the (already overlaid) process definition.
//! Step lookups and successor queries are index-based so the hot path
//! never hashes step ids; dangling transition targets are reported as
//! warnings at build time and resolve to "no successor" during routing.

use crate::model::{ProcessDefinition, ProcessStep, StepType, Transition};
use crate::results::GraphWarning;
use std::collections::HashMap;

/// Index-based view over a process definition's steps and transitions.
#[derive(Debug)]
pub struct ProcessGraph<'a> {
    process: &'a ProcessDefinition,
    index: HashMap<&'a str, usize>,
    /// Outgoing transition indices per step index, in definition order.
    outgoing: Vec<Vec<usize>>,
    start: Option<usize>,
}

impl<'a> ProcessGraph<'a> {
    /// Builds the graph view and collects structural warnings: dangling
    /// transition endpoints and a missing START step.
    pub fn build(process: &'a ProcessDefinition) -> (Self, Vec<GraphWarning>) {
        let mut warnings = Vec::new();

        let index: HashMap<&str, usize> = process
            .steps
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.as_str(), i))
            .collect();

        let mut outgoing = vec![Vec::new(); process.steps.len()];
        for (t_idx, t) in process.transitions.iter().enumerate() {
            let from = index.get(t.from_step.as_str()).copied();
            let to_known = index.contains_key(t.to_step.as_str());
            if from.is_none() || !to_known {
                warnings.push(GraphWarning::UnknownTransitionTarget {
                    from_step: t.from_step.clone(),
                    to_step: t.to_step.clone(),
                });
            }
            // A transition with a dangling source can never fire; one
            // with a dangling target stays routable and drops entities.
            if let Some(from) = from {
                outgoing[from].push(t_idx);
            }
        }

        let marked_start = process
            .steps
            .iter()
            .position(|s| s.step_type == StepType::Start);
        let start = marked_start.or(if process.steps.is_empty() {
            None
        } else {
            Some(0)
        });
        if marked_start.is_none() {
            if let Some(first) = process.steps.first() {
                warnings.push(GraphWarning::MissingStartStep {
                    fallback_step: first.id.clone(),
                });
            }
        }

        (
            Self {
                process,
                index,
                outgoing,
                start,
            },
            warnings,
        )
    }

    /// Index of the entry step: the first step marked START, or the
    /// first step in the definition as a fallback. `None` only for an
    /// empty process.
    pub fn start(&self) -> Option<usize> {
        self.start
    }

    /// The step at `idx`.
    pub fn step(&self, idx: usize) -> &'a ProcessStep {
        &self.process.steps[idx]
    }

    /// Resolve a step id to its index; `None` for unknown ids.
    pub fn resolve(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Indices into the definition's transition list for all transitions
    /// leaving the step at `idx`.
    pub fn successors(&self, idx: usize) -> &[usize] {
        &self.outgoing[idx]
    }

    /// The transition at `t_idx`.
    pub fn transition(&self, t_idx: usize) -> &'a Transition {
        &self.process.transitions[t_idx]
    }
}

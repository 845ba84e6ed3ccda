//! Capacity-bounded resource pools, one per step.
//!
//! All queue state is owned here; the engine never touches waiter lists
//! or busy counts directly. Pools are created lazily on first use and
//! waiters are served strictly FIFO within a step.

use crate::events::SimTime;
use std::collections::{HashMap, VecDeque};

/// An entity waiting for a slot on a step's resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waiter {
    /// Index of the waiting entity in the run's entity arena.
    pub entity: usize,
    /// Virtual time at which the entity joined the queue.
    pub enqueued_at: SimTime,
}

#[derive(Debug)]
struct StepPool {
    capacity: usize,
    in_service: usize,
    waiters: VecDeque<Waiter>,
}

/// Per-step capacity-limited queues, keyed by step index.
#[derive(Debug, Default)]
pub struct ResourcePools {
    pools: HashMap<usize, StepPool>,
}

impl ResourcePools {
    /// Creates an empty pool manager.
    pub fn new() -> Self {
        Self::default()
    }

    fn pool(&mut self, step: usize, capacity: usize) -> &mut StepPool {
        self.pools.entry(step).or_insert_with(|| StepPool {
            capacity,
            in_service: 0,
            waiters: VecDeque::new(),
        })
    }

    /// Number of entities currently waiting on the step's queue.
    pub fn queue_len(&self, step: usize) -> usize {
        self.pools.get(&step).map_or(0, |p| p.waiters.len())
    }

    /// Tries to take a free slot on the step. Returns `true` and marks
    /// the slot busy on success; the caller must start service
    /// immediately.
    pub fn try_acquire(&mut self, step: usize, capacity: usize) -> bool {
        let pool = self.pool(step, capacity);
        if pool.in_service < pool.capacity {
            pool.in_service += 1;
            true
        } else {
            false
        }
    }

    /// Appends a waiter to the step's FIFO queue.
    pub fn enqueue(&mut self, step: usize, capacity: usize, waiter: Waiter) {
        self.pool(step, capacity).waiters.push_back(waiter);
    }

    /// Releases one busy slot on the step. If a waiter is queued it is
    /// handed the slot (the slot stays busy) and returned so the caller
    /// can start its service; otherwise the slot is freed.
    pub fn release(&mut self, step: usize) -> Option<Waiter> {
        let pool = self.pools.get_mut(&step)?;
        match pool.waiters.pop_front() {
            Some(waiter) => Some(waiter),
            None => {
                pool.in_service = pool.in_service.saturating_sub(1);
                None
            }
        }
    }
}

//! Event scheduling for the virtual clock.
//!
//! The scheduler is a classic discrete-event loop: events live in a
//! priority queue ordered by virtual time, with a monotonically
//! increasing sequence number breaking ties so that events scheduled at
//! the same instant fire in insertion order. This FIFO tie-break is what
//! makes runs reproducible.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A point in virtual time, in hours since the start of the run.
///
/// Wraps `f64` to provide the total ordering the event heap needs.
/// Times inside the engine are always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimTime(pub f64);

impl SimTime {
    /// The start of the run.
    pub const ZERO: SimTime = SimTime(0.0);

    /// Hours since the start of the run.
    pub fn hours(self) -> f64 {
        self.0
    }

    /// This time advanced by `gap` hours.
    pub fn after(self, gap: f64) -> SimTime {
        SimTime(self.0 + gap)
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Events the engine schedules against the virtual clock.
///
/// Resource grants are not events: they happen synchronously inside
/// handlers at the current timestamp, so every state change at time `t`
/// is applied before any event at a later time fires.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A new entity enters the process; the handler schedules the next
    /// arrival after a sampled inter-arrival gap.
    Arrival,
    /// An entity finishes holding a step's resource.
    ServiceDone {
        /// Index of the entity in the run's entity arena.
        entity: usize,
        /// Index of the step in the process definition.
        step: usize,
        /// The sampled hold duration, needed for stats and rework.
        duration: f64,
        /// Whether this hold was a rework penalty rather than the
        /// original service.
        rework: bool,
    },
}

/// An event scheduled for execution at a specific virtual time.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent {
    time: SimTime,
    sequence: u64,
    event: EngineEvent,
}

impl ScheduledEvent {
    /// Creates a new scheduled event.
    pub fn new(time: SimTime, event: EngineEvent, sequence: u64) -> Self {
        Self {
            time,
            sequence,
            event,
        }
    }

    /// Returns the scheduled execution time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Consumes the scheduled event and returns the event.
    pub fn into_event(self) -> EngineEvent {
        self.event
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max heap; reverse so the earliest time wins,
        // with earlier sequence numbers first at equal times.
        match other.time.cmp(&self.time) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            ord => ord,
        }
    }
}

/// A priority queue of pending events in chronological order.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<ScheduledEvent>,
    next_sequence: u64,
}

impl EventQueue {
    /// Creates a new empty event queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules an event at an absolute virtual time, assigning the
    /// next sequence number.
    pub fn schedule_at(&mut self, event: EngineEvent, time: SimTime) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(ScheduledEvent::new(time, event, sequence));
    }

    /// Removes and returns the earliest scheduled event.
    pub fn pop_earliest(&mut self) -> Option<ScheduledEvent> {
        self.heap.pop()
    }

    /// Returns `true` if no events are pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_time_order() {
        let mut queue = EventQueue::new();
        queue.schedule_at(EngineEvent::Arrival, SimTime(3.0));
        queue.schedule_at(EngineEvent::Arrival, SimTime(1.0));
        queue.schedule_at(EngineEvent::Arrival, SimTime(2.0));

        assert_eq!(queue.pop_earliest().unwrap().time(), SimTime(1.0));
        assert_eq!(queue.pop_earliest().unwrap().time(), SimTime(2.0));
        assert_eq!(queue.pop_earliest().unwrap().time(), SimTime(3.0));
        assert!(queue.is_empty());
    }

    #[test]
    fn same_time_fifo_by_sequence() {
        let mut queue = EventQueue::new();
        let t = SimTime(5.0);
        for entity in 0..4 {
            queue.schedule_at(
                EngineEvent::ServiceDone {
                    entity,
                    step: 0,
                    duration: 1.0,
                    rework: false,
                },
                t,
            );
        }
        for expected in 0..4 {
            match queue.pop_earliest().unwrap().into_event() {
                EngineEvent::ServiceDone { entity, .. } => assert_eq!(entity, expected),
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[test]
    fn sim_time_total_order() {
        assert!(SimTime(0.5) < SimTime(1.5));
        assert_eq!(SimTime::ZERO.after(2.0), SimTime(2.0));
        assert_eq!(SimTime(1.5).hours(), 1.5);
    }
}

//! Event queue with deterministic ordering.
//!
//! Events are ordered by:
//! 1. Time (earlier first)
//! 2. Sequence number (FIFO among equal timestamps)
//!
//! Events past the horizon are dropped on insertion; this is what ends a run.

use crate::models::Event;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry: an event plus its scheduling sequence number
#[derive(Debug)]
struct QueuedEvent {
    sequence: u64,
    event: Event,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: reverse so the earliest event is on top
        other
            .event
            .time()
            .total_cmp(&self.event.time())
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Min-priority queue of events bounded by a horizon
///
/// # Example
/// ```
/// use routing_sim_core::orchestrator::EventQueue;
/// use routing_sim_core::{Event, EventKind, NodeKind};
///
/// let mut queue = EventQueue::new(10.0);
/// queue.schedule(Event::new(5.0, EventKind::ProcessingStart { node: NodeKind::Lazy }));
/// queue.schedule(Event::new(2.0, EventKind::ProcessingStart { node: NodeKind::Worker }));
/// assert!(!queue.schedule(Event::new(11.0, EventKind::SimulationStart)));
///
/// assert_eq!(queue.pop().unwrap().time(), 2.0);
/// assert_eq!(queue.pop().unwrap().time(), 5.0);
/// assert!(queue.pop().is_none());
/// assert_eq!(queue.dropped(), 1);
/// ```
#[derive(Debug)]
pub struct EventQueue {
    heap: BinaryHeap<QueuedEvent>,
    horizon: f64,
    next_sequence: u64,
    dropped: u64,
}

impl EventQueue {
    pub fn new(horizon: f64) -> Self {
        Self {
            heap: BinaryHeap::new(),
            horizon,
            next_sequence: 0,
            dropped: 0,
        }
    }

    /// Insert an event, returns false when it lies past the horizon
    ///
    /// NaN timestamps are treated as past the horizon.
    pub fn schedule(&mut self, event: Event) -> bool {
        if event.time().is_nan() || event.time() > self.horizon {
            self.dropped += 1;
            return false;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueuedEvent { sequence, event });
        true
    }

    /// Remove and return the earliest event
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|queued| queued.event)
    }

    /// Drop every pending event and reset counters for a new run
    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_sequence = 0;
        self.dropped = 0;
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Events rejected past the horizon since the last clear
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

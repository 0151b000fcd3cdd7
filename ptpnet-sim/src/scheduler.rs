//! Virtual-time event queue driving a simulation

use std::{cmp::Ordering, collections::BinaryHeap};

use ptpnet::{
    datastructures::messages::WIRE_SIZE,
    network::{LinkId, ScheduledEvent},
    time::{Duration, Time},
};

/// Something that happens at a specific virtual time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    /// A protocol step requested by the network
    Protocol(ScheduledEvent),
    /// A message arriving on `link`, the link owned by the receiver
    Deliver { link: LinkId, data: [u8; WIRE_SIZE] },
}

#[derive(Debug)]
struct QueuedEvent {
    time: Time,
    sequence: u64,
    event: SimEvent,
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
    // reversed: BinaryHeap is a max-heap, the earliest event must come out first
    fn cmp(&self, other: &Self) -> Ordering {
        (other.time, other.sequence).cmp(&(self.time, self.sequence))
    }
}

/// Events ordered by virtual time. Events for the same instant come out in
/// the order they were scheduled.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<QueuedEvent>,
    now: Time,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time of the event that was popped last
    pub fn now(&self) -> Time {
        self.now
    }

    /// Schedule `event` at `now() + delay`. Negative delays are treated as
    /// zero.
    pub fn schedule_after(&mut self, delay: Duration, event: SimEvent) {
        let delay = delay.max(Duration::ZERO);
        self.schedule_at(self.now + delay, event);
    }

    pub fn schedule_at(&mut self, time: Time, event: SimEvent) {
        let time = time.max(self.now);
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueuedEvent {
            time,
            sequence,
            event,
        });
    }

    pub fn peek_time(&self) -> Option<Time> {
        self.heap.peek().map(|queued| queued.time)
    }

    /// Remove the earliest event and advance `now()` to its time
    pub fn pop(&mut self) -> Option<(Time, SimEvent)> {
        let queued = self.heap.pop()?;
        self.now = queued.time;
        Some((queued.time, queued.event))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

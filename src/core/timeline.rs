use std::{cmp::Ordering, fmt};

use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashMap;

use super::{
    event::{Event, EventKind, Sequence},
    state::{ProcessId, Ticks},
};
use crate::error::{Result, SimError};

/// Heap key: earliest time first, then insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventKey {
    pub time: Ticks,
    pub sequence: Sequence,
}

// KeyedPriorityQueue is a max-heap, so the natural (time, sequence) order is flipped
impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending events, delivered in ascending `(time, sequence)` order.
///
/// The timeline does not check causality: callers may schedule at any time,
/// including one earlier than events already delivered.
pub struct Timeline {
    queue: KeyedPriorityQueue<Sequence, EventKey>,
    pending: FxHashMap<Sequence, Event>,
    next_sequence: u64,
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("pending", &self.queue.len())
            .field("next_time", &self.peek_time())
            .field("scheduled_total", &self.next_sequence)
            .finish()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            queue: KeyedPriorityQueue::new(),
            pending: FxHashMap::default(),
            next_sequence: 0,
        }
    }

    pub fn schedule(&mut self, time: Ticks, process: ProcessId, kind: EventKind) -> Sequence {
        let sequence = Sequence(self.next_sequence);
        self.next_sequence += 1;

        let event = Event {
            time,
            sequence,
            process,
            kind,
        };
        let displaced = self.queue.push(sequence, EventKey { time, sequence });
        debug_assert!(displaced.is_none(), "Sequence {sequence:?} scheduled twice");
        self.pending.insert(sequence, event);

        sequence
    }

    pub fn pop_earliest(&mut self) -> Result<Event> {
        let (sequence, _) = self.queue.pop().ok_or(SimError::EmptyTimeline)?;
        let event = self
            .pending
            .remove(&sequence)
            .expect("Queued sequence missing its event payload");
        Ok(event)
    }

    pub fn peek_time(&self) -> Option<Ticks> {
        self.queue.peek().map(|(_, key)| key.time)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Number of events ever scheduled on this timeline.
    pub fn scheduled_total(&self) -> u64 {
        self.next_sequence
    }
}

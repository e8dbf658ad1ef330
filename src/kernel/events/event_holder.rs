use super::process::{Process, ProcessId};
use crate::kernel::VirtualTime;

use std::cmp::Ordering;

/// Helper struct for the event queue. This struct holds a [`Box`] to the suspended process alongside the data
/// necessary to sort events within the priority queue, namely the resumption time and a record of the event's
/// insertion sequence.
///
/// The implementation of [`Ord`] on this struct cares first about the resumption time, comparing the insertion
/// sequences only to break ties, so that simultaneous events run in the order they were scheduled.
#[derive(Debug)]
pub(super) struct EventHolder<State> {
    pub execution_time: VirtualTime,
    pub insertion_sequence: u64,
    pub process_id: ProcessId,
    pub process: Box<dyn Process<State>>,
}

impl<State> PartialEq<Self> for EventHolder<State> {
    fn eq(&self, other: &Self) -> bool {
        self.insertion_sequence == other.insertion_sequence && self.execution_time == other.execution_time
    }
}

impl<State> Eq for EventHolder<State> {}

impl<State> PartialOrd<Self> for EventHolder<State> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<State> Ord for EventHolder<State> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.execution_time
            .cmp(&other.execution_time)
            .then_with(|| self.insertion_sequence.cmp(&other.insertion_sequence))
    }
}

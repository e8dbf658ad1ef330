use crate::kernel::VirtualTime;

/// Occupancy counters of the pool and its entrance.
///
/// The gate is a manual capacity counter rather than a [`Resource`]: waiting swimmers poll [`can_enter()`] instead of
/// being woken when a place frees up. Every mutation is checked, and a change that would leave `0 <= inside <=
/// capacity` or make the waiting count negative is reported as [`Error::InvariantViolation`].
///
/// [`Resource`]: crate::kernel::Resource
/// [`can_enter()`]: PoolState::can_enter
/// [`Error::InvariantViolation`]: crate::Error::InvariantViolation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    capacity: usize,
    gate_open: bool,
    num_inside: usize,
    num_waiting: usize,
}

impl PoolState {
    /// An empty pool with an open gate.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            gate_open: true,
            num_inside: 0,
            num_waiting: 0,
        }
    }

    /// The admission predicate: the gate is open and there is room inside.
    pub fn can_enter(&self) -> bool {
        self.gate_open && self.num_inside < self.capacity
    }

    pub fn set_gate_open(&mut self, open: bool) {
        self.gate_open = open;
    }

    pub fn join_queue(&mut self) {
        self.num_waiting += 1;
    }

    pub fn leave_queue(&mut self, now: VirtualTime) -> crate::Result {
        self.num_waiting = self.num_waiting.checked_sub(1).ok_or_else(|| violation(now, "waiting count below zero"))?;
        Ok(())
    }

    pub fn add_swimmer(&mut self, now: VirtualTime) -> crate::Result {
        if self.num_inside >= self.capacity {
            return Err(violation(
                now,
                &format!("admitting a swimmer would exceed capacity {}", self.capacity),
            ));
        }
        self.num_inside += 1;
        Ok(())
    }

    pub fn remove_swimmer(&mut self, now: VirtualTime) -> crate::Result {
        self.num_inside = self.num_inside.checked_sub(1).ok_or_else(|| violation(now, "swimmer count below zero"))?;
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn gate_open(&self) -> bool {
        self.gate_open
    }

    pub fn num_inside(&self) -> usize {
        self.num_inside
    }

    pub fn num_waiting(&self) -> usize {
        self.num_waiting
    }
}

fn violation(time: VirtualTime, message: &str) -> crate::Error {
    crate::Error::InvariantViolation {
        time,
        message: message.to_owned(),
    }
}

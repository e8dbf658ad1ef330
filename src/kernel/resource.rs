use super::ProcessId;

use std::collections::VecDeque;

/// A capacity-limited entity with a FIFO wait list.
///
/// A [`Resource`] does not suspend anything by itself; it is bookkeeping that lives in the simulation state and
/// cooperates with [`Step::Passivate`] and [`Context::activate()`]:
///
/// 1. A process calls [`try_acquire()`]. If a unit is free it is granted immediately and the process continues.
///    Otherwise the process is appended to the wait list and should return [`Step::Passivate`].
/// 2. The holder calls [`release()`] when done. If somebody is waiting, the freed unit is handed straight to the
///    longest waiter and its id is returned; the releasing process must [`activate()`] it.
///
/// Handing the unit over on release keeps a newcomer from overtaking a process that is already waiting.
///
/// [`Step::Passivate`]: crate::kernel::Step::Passivate
/// [`Context::activate()`]: crate::kernel::Context::activate
/// [`activate()`]: crate::kernel::Context::activate
/// [`try_acquire()`]: Resource::try_acquire
/// [`release()`]: Resource::release
#[derive(Debug, Clone)]
pub struct Resource {
    capacity: usize,
    in_use: usize,
    waiters: VecDeque<ProcessId>,
}

impl Resource {
    /// Create a resource with `capacity` units, all free.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `capacity` is zero.
    ///
    /// [`Error::Configuration`]: crate::Error::Configuration
    pub fn new(capacity: usize) -> crate::Result<Self> {
        if capacity == 0 {
            return Err(crate::Error::Configuration("resource capacity must be positive".into()));
        }

        Ok(Self {
            capacity,
            in_use: 0,
            waiters: VecDeque::new(),
        })
    }

    /// Grant one unit to `id` if one is free and nobody is queued ahead of it, otherwise put `id` at the back of the
    /// wait list. Returns whether the unit was granted.
    pub fn try_acquire(&mut self, id: ProcessId) -> bool {
        if self.in_use < self.capacity && self.waiters.is_empty() {
            self.in_use += 1;
            true
        } else {
            self.waiters.push_back(id);
            false
        }
    }

    /// Give back one unit. If a process is waiting, the unit passes directly to it and its id is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`] if no unit is currently held. `now` is only used for the error report.
    ///
    /// [`Error::InvariantViolation`]: crate::Error::InvariantViolation
    pub fn release(&mut self, now: super::VirtualTime) -> crate::Result<Option<ProcessId>> {
        if self.in_use == 0 {
            return Err(crate::Error::InvariantViolation {
                time: now,
                message: "released a resource that was not held".into(),
            });
        }

        match self.waiters.pop_front() {
            Some(next) => Ok(Some(next)),
            None => {
                self.in_use -= 1;
                Ok(None)
            },
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Units currently held.
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Length of the wait list.
    pub fn waiting(&self) -> usize {
        self.waiters.len()
    }
}

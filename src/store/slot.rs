use super::SettlementPolicy;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Snapshot of one resource: latest value, loading flag and error message.
///
/// `value` and `error` may both be set: a stale value stays visible while a
/// new fetch is loading, and `clear_error` never touches the value.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub value: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            value: None,
            loading: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Failed,
}

impl<T> ResourceState<T> {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.value.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }
}

/// Handed out by [`ResourceSlot::begin`] and consumed when the fetch settles.
#[must_use = "a fetch ticket must be settled"]
#[derive(Debug)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct SlotInner<T> {
    state: ResourceState<T>,
    generation: u64,
}

/// State machine for a single remote resource.
///
/// Transitions are synchronous; the lock is never held across an await.
pub struct ResourceSlot<T> {
    name: &'static str,
    policy: SettlementPolicy,
    inner: Mutex<SlotInner<T>>,
}

impl<T> ResourceSlot<T> {
    pub fn new(name: &'static str, policy: SettlementPolicy) -> Self {
        Self {
            name,
            policy,
            inner: Mutex::new(SlotInner {
                state: ResourceState::default(),
                generation: 0,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn lock(&self) -> MutexGuard<'_, SlotInner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enters loading. Any previous error is cleared; a previous value stays.
    pub fn begin(&self) -> Ticket {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state.loading = true;
        inner.state.error = None;
        debug!(slot = self.name, generation = inner.generation, "Fetch started");
        Ticket {
            generation: inner.generation,
        }
    }

    /// Applies the outcome of a fetch. Returns `false` when the outcome was
    /// discarded because a newer fetch superseded it (only under
    /// [`SettlementPolicy::LatestIssued`]).
    pub fn settle(&self, ticket: Ticket, outcome: Result<T, String>) -> bool {
        let mut inner = self.lock();
        if self.policy == SettlementPolicy::LatestIssued && ticket.generation != inner.generation {
            warn!(
                slot = self.name,
                stale = ticket.generation,
                current = inner.generation,
                "Discarding stale fetch result"
            );
            return false;
        }

        inner.state.loading = false;
        match outcome {
            Ok(value) => {
                debug!(slot = self.name, generation = ticket.generation, "Fetch succeeded");
                inner.state.value = Some(value);
            }
            Err(message) => {
                debug!(slot = self.name, generation = ticket.generation, %message, "Fetch failed");
                inner.state.value = None;
                inner.state.error = Some(message);
            }
        }
        true
    }

    /// Dismisses the error without retrying.
    pub fn clear_error(&self) {
        self.lock().state.error = None;
    }

    /// Back to the initial state. Under `LatestIssued` fetches still in
    /// flight are invalidated as well.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = ResourceState::default();
        debug!(slot = self.name, "Slot reset");
    }
}

impl<T: Clone> ResourceSlot<T> {
    pub fn snapshot(&self) -> ResourceState<T> {
        self.lock().state.clone()
    }
}

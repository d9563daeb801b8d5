//! Table implementation.

use crate::errors::PendingError;
use shared_types::{CorrelationId, WorkerId};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Completion callback; receives the collected payloads in arrival order.
pub type OnComplete<P> = Box<dyn FnOnce(Vec<P>) + Send>;

/// Result of [`PendingRequestTable::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Entry created; waiting for responses.
    Opened,
    /// `expected == 0`: the callback already ran with an empty sequence.
    CompletedImmediately,
    /// An entry with this id is already open; nothing changed.
    Duplicate,
}

/// A request waiting for responses
struct PendingRequest<P> {
    origin: WorkerId,
    expected: usize,
    collected: Vec<P>,
    deadline: Instant,
    on_complete: OnComplete<P>,
}

/// Lifetime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingStats {
    /// Requests opened (including immediate completions)
    pub opened: u64,
    /// Requests closed by reaching the expected count
    pub completed: u64,
    /// Requests closed by deadline
    pub expired: u64,
    /// Responses dropped for an unknown id
    pub stale: u64,
    /// `open` calls ignored because the id was already open
    pub duplicate: u64,
}

/// Open requests keyed by correlation id, with a deadline heap for the sweep.
pub struct PendingRequestTable<P> {
    entries: HashMap<CorrelationId, PendingRequest<P>>,
    /// Min-heap of deadlines. Entries closed early stay here until popped.
    deadlines: BinaryHeap<Reverse<(Instant, CorrelationId)>>,
    ttl: Duration,
    stats: PendingStats,
}

impl<P> PendingRequestTable<P> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            deadlines: BinaryHeap::new(),
            ttl,
            stats: PendingStats::default(),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a request for `id`, closing after `expected` responses or at
    /// `now + ttl`, whichever comes first.
    pub fn open(
        &mut self,
        id: CorrelationId,
        origin: WorkerId,
        expected: usize,
        on_complete: OnComplete<P>,
    ) -> OpenOutcome {
        if self.entries.contains_key(&id) {
            self.stats.duplicate += 1;
            debug!(correlation_id = %id, origin = %origin, "Request already open, ignoring");
            return OpenOutcome::Duplicate;
        }

        self.stats.opened += 1;

        if expected == 0 {
            self.stats.completed += 1;
            debug!(correlation_id = %id, origin = %origin, "No recipients, completing immediately");
            on_complete(Vec::new());
            return OpenOutcome::CompletedImmediately;
        }

        let deadline = Instant::now() + self.ttl;
        self.entries.insert(
            id,
            PendingRequest {
                origin,
                expected,
                collected: Vec::with_capacity(expected),
                deadline,
                on_complete,
            },
        );
        self.deadlines.push(Reverse((deadline, id)));

        debug!(
            correlation_id = %id,
            origin = %origin,
            expected,
            ttl_ms = self.ttl.as_millis(),
            "Opened pending request"
        );
        OpenOutcome::Opened
    }

    /// Append a response. Returns `Ok(true)` when this response closed the
    /// request (the callback has run), `Ok(false)` while still waiting.
    pub fn accumulate(&mut self, id: CorrelationId, payload: P) -> Result<bool, PendingError> {
        let Some(entry) = self.entries.get_mut(&id) else {
            self.stats.stale += 1;
            warn!(correlation_id = %id, "Response for unknown or expired correlation ID");
            return Err(PendingError::Stale { correlation_id: id });
        };

        entry.collected.push(payload);
        let collected = entry.collected.len();
        let expected = entry.expected;
        debug!(correlation_id = %id, collected, expected, "Accumulated response");

        if collected < expected {
            return Ok(false);
        }

        if let Some(entry) = self.entries.remove(&id) {
            self.stats.completed += 1;
            debug!(
                correlation_id = %id,
                origin = %entry.origin,
                collected,
                "Completed pending request"
            );
            (entry.on_complete)(entry.collected);
        }
        Ok(true)
    }

    /// Drop the entry for `id` without running its callback.
    ///
    /// Returns `false` if it was already closed.
    pub fn expire(&mut self, id: CorrelationId) -> bool {
        match self.entries.remove(&id) {
            Some(entry) => {
                self.stats.expired += 1;
                warn!(
                    correlation_id = %id,
                    origin = %entry.origin,
                    collected = entry.collected.len(),
                    expected = entry.expected,
                    "Removing expired pending request"
                );
                true
            }
            None => false,
        }
    }

    /// Expire every entry whose deadline is at or before `now`.
    ///
    /// Returns the number of entries removed.
    pub fn expire_due(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        while let Some(&Reverse((deadline, id))) = self.deadlines.peek() {
            if deadline > now {
                break;
            }
            self.deadlines.pop();
            let still_open = self
                .entries
                .get(&id)
                .is_some_and(|entry| entry.deadline == deadline);
            if still_open && self.expire(id) {
                removed += 1;
            }
        }
        removed
    }

    /// Earliest deadline among open entries.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        while let Some(&Reverse((deadline, id))) = self.deadlines.peek() {
            if self.entries.contains_key(&id) {
                return Some(deadline);
            }
            self.deadlines.pop();
        }
        None
    }

    #[must_use]
    pub fn is_pending(&self, id: &CorrelationId) -> bool {
        self.entries.contains_key(id)
    }

    /// Responses collected so far for an open request.
    #[must_use]
    pub fn collected_count(&self, id: &CorrelationId) -> Option<usize> {
        self.entries.get(id).map(|entry| entry.collected.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> PendingStats {
        self.stats
    }
}

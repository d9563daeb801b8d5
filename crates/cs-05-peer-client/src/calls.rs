//! # Outbound Call Table
//!
//! Requester-side mirror of the coordinator's pending table: one entry per
//! unanswered `ask`, each with its own deadline. Once the coordinator
//! connection is gone the table is closed: open calls are failed and no new
//! call is accepted.

use shared_types::{CorrelationId, Payload, ProtocolError};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::warn;

pub(crate) type CallResult = Result<Vec<Payload>, ProtocolError>;

struct OutboundCall {
    sender: oneshot::Sender<CallResult>,
    deadline: Instant,
}

/// Unanswered calls keyed by correlation id.
#[derive(Default)]
pub struct OutboundCallTable {
    calls: HashMap<CorrelationId, OutboundCall>,
    /// Min-heap of deadlines. Calls settled early stay here until popped.
    deadlines: BinaryHeap<Reverse<(Instant, CorrelationId)>>,
    closed: bool,
}

impl OutboundCallTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a call. Returns `None` once the table is closed.
    pub(crate) fn insert(
        &mut self,
        id: CorrelationId,
        deadline: Instant,
    ) -> Option<oneshot::Receiver<CallResult>> {
        if self.closed {
            return None;
        }
        let (sender, receiver) = oneshot::channel();
        self.calls.insert(id, OutboundCall { sender, deadline });
        self.deadlines.push(Reverse((deadline, id)));
        Some(receiver)
    }

    /// Settle a call. Returns `false` if no call is open for `id`, or if
    /// its caller has stopped waiting.
    pub(crate) fn settle(&mut self, id: CorrelationId, result: CallResult) -> bool {
        match self.calls.remove(&id) {
            Some(call) => call.sender.send(result).is_ok(),
            None => false,
        }
    }

    /// Drop a call without settling it.
    pub fn remove(&mut self, id: &CorrelationId) -> bool {
        self.calls.remove(id).is_some()
    }

    /// Remove calls whose deadline is at or before `now`. Their callers
    /// observe the dropped sender.
    pub fn remove_expired(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        while let Some(&Reverse((deadline, id))) = self.deadlines.peek() {
            if deadline > now {
                break;
            }
            self.deadlines.pop();
            let still_open = self
                .calls
                .get(&id)
                .is_some_and(|call| call.deadline == deadline);
            if still_open {
                self.calls.remove(&id);
                warn!(correlation_id = %id, "Outbound call expired without aggregate");
                removed += 1;
            }
        }
        removed
    }

    /// Close the table: every open call is dropped and later inserts are
    /// refused. Returns the number of calls failed.
    pub fn close(&mut self) -> usize {
        self.closed = true;
        self.deadlines.clear();
        let failed = self.calls.len();
        for id in self.calls.drain().map(|(id, _)| id) {
            warn!(correlation_id = %id, "Outbound call abandoned, coordinator gone");
        }
        failed
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn contains(&self, id: &CorrelationId) -> bool {
        self.calls.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

//! Client implementation.

use crate::calls::OutboundCallTable;
use crate::errors::AskError;
use crate::ports::LocalOracle;
use parking_lot::Mutex;
use shared_bus::SharedSink;
use shared_types::{CorrelationId, MessageKind, Payload, PeerMessage, ProtocolError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Statistics for the peer client
#[derive(Debug, Default)]
pub struct ClientStats {
    /// Calls issued through `ask`
    pub asked: AtomicU64,
    /// Calls settled by an aggregate
    pub resolved: AtomicU64,
    /// Calls dropped at their local deadline
    pub expired: AtomicU64,
    /// Calls failed because the coordinator connection closed
    pub abandoned: AtomicU64,
    /// Peer requests answered
    pub answered: AtomicU64,
    /// Aggregates with no open call
    pub stale: AtomicU64,
}

/// Worker-side endpoint of the prediction protocol.
///
/// Shared between the task that calls [`ask`](Self::ask) and the dispatch
/// task that feeds it inbound messages.
pub struct PeerClient {
    coordinator: SharedSink,
    calls: Mutex<OutboundCallTable>,
    ttl: Duration,
    stats: ClientStats,
}

impl PeerClient {
    #[must_use]
    pub fn new(coordinator: SharedSink, ttl: Duration) -> Self {
        Self {
            coordinator,
            calls: Mutex::new(OutboundCallTable::new()),
            ttl,
            stats: ClientStats::default(),
        }
    }

    /// Ask the coordinator's chosen peers about `payload`.
    ///
    /// Resolves with the collected peer answers in arrival order (possibly
    /// empty), with [`AskError::Expired`] once the local deadline passes, or
    /// with [`AskError::Closed`] if the coordinator connection is gone.
    pub async fn ask(&self, payload: Payload) -> Result<Vec<Payload>, AskError> {
        let correlation_id = CorrelationId::new();
        let receiver = self
            .calls
            .lock()
            .insert(correlation_id, Instant::now() + self.ttl);
        let Some(receiver) = receiver else {
            return Err(AskError::Closed { correlation_id });
        };
        self.stats.asked.fetch_add(1, Ordering::Relaxed);

        if let Err(e) = self
            .coordinator
            .deliver(PeerMessage::request(correlation_id, payload))
        {
            self.calls.lock().remove(&correlation_id);
            warn!(correlation_id = %correlation_id, error = %e, "Request not sent");
            return Err(AskError::Transport(e));
        }
        debug!(correlation_id = %correlation_id, "Asked peers");

        match receiver.await {
            Ok(result) => Ok(result?),
            Err(_) if self.calls.lock().is_closed() => Err(AskError::Closed { correlation_id }),
            Err(_) => Err(AskError::Expired { correlation_id }),
        }
    }

    /// Handle one message from the coordinator.
    pub fn handle_inbound(
        &self,
        message: PeerMessage,
        oracle: &dyn LocalOracle,
    ) -> Result<(), ProtocolError> {
        match message.kind {
            MessageKind::Request => self.answer(message.id, &message.payload, oracle),
            MessageKind::Aggregate => self.resolve(message),
            other => {
                warn!(
                    message_type = %other,
                    correlation_id = %message.id,
                    "Unrecognized message type, dropping"
                );
                Err(ProtocolError::UnrecognizedMessage {
                    kind: other.to_string(),
                })
            }
        }
    }

    fn answer(
        &self,
        id: CorrelationId,
        request: &Payload,
        oracle: &dyn LocalOracle,
    ) -> Result<(), ProtocolError> {
        let answer = oracle.answer(request).map_err(|e| {
            warn!(correlation_id = %id, error = %e, "Could not answer peer request");
            e
        })?;
        match self.coordinator.deliver(PeerMessage::response(id, answer)) {
            Ok(()) => {
                self.stats.answered.fetch_add(1, Ordering::Relaxed);
                debug!(correlation_id = %id, "Answered peer request");
            }
            Err(e) => warn!(correlation_id = %id, error = %e, "Response not sent"),
        }
        Ok(())
    }

    fn resolve(&self, message: PeerMessage) -> Result<(), ProtocolError> {
        let Some(correlation_id) = message.correlates_to else {
            warn!(correlation_id = %message.id, "Aggregate without correlatesTo, dropping");
            return Err(ProtocolError::missing_correlation("aggregate"));
        };

        let mut calls = self.calls.lock();
        if !calls.contains(&correlation_id) {
            drop(calls);
            self.stats.stale.fetch_add(1, Ordering::Relaxed);
            warn!(correlation_id = %correlation_id, "Aggregate for unknown or expired call");
            return Err(ProtocolError::StaleCorrelation { correlation_id });
        }

        let result = message.payload.into_sequence();
        let malformed = result.as_ref().err().cloned();
        let collected = result.as_ref().map_or(0, Vec::len);
        if calls.settle(correlation_id, result) {
            self.stats.resolved.fetch_add(1, Ordering::Relaxed);
            debug!(correlation_id = %correlation_id, collected, "Resolved outbound call");
        } else {
            debug!(correlation_id = %correlation_id, "Caller stopped waiting");
        }
        malformed.map_or(Ok(()), Err)
    }

    /// Drop calls past their local deadline.
    pub fn expire_due(&self, now: Instant) -> usize {
        let removed = self.calls.lock().remove_expired(now);
        self.stats
            .expired
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Fail every open call and refuse new ones. Called once the inbound
    /// stream from the coordinator has ended.
    pub fn abandon_all(&self) -> usize {
        let failed = self.calls.lock().close();
        self.stats
            .abandoned
            .fetch_add(failed as u64, Ordering::Relaxed);
        failed
    }

    /// Calls still waiting for an aggregate.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.calls.lock().len()
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }
}

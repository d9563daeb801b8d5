use cs_01_peer_registry::{PeerRegistry, RegistryError};
use cs_02_topology::{TopologyMode, TopologySelector};
use cs_03_pending_requests::{OpenOutcome, PendingRequestTable, PendingStats};
use shared_bus::{MessageSink, SharedSink};
use shared_types::{CorrelationId, MessageKind, Payload, PeerMessage, ProtocolError, WorkerId};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Request router for the whole peer pool.
pub struct Coordinator {
    registry: PeerRegistry,
    selector: TopologySelector,
    pending: PendingRequestTable<Payload>,
}

impl Coordinator {
    #[must_use]
    pub fn new(mode: TopologyMode, request_ttl: Duration) -> Self {
        Self {
            registry: PeerRegistry::new(),
            selector: TopologySelector::new(mode),
            pending: PendingRequestTable::new(request_ttl),
        }
    }

    /// Attach a worker under the next free id.
    pub fn register_peer(&mut self, sink: SharedSink) -> WorkerId {
        self.registry.register(sink)
    }

    /// Attach a worker under a pre-assigned id.
    pub fn register_peer_with_id(
        &mut self,
        worker_id: WorkerId,
        sink: SharedSink,
    ) -> Result<(), RegistryError> {
        self.registry.register_with_id(worker_id, sink)
    }

    /// Peer-exit signal. In-flight requests are left to their deadlines.
    pub fn peer_exited(&mut self, worker_id: WorkerId) -> bool {
        self.registry.unregister(worker_id)
    }

    /// Handle one inbound message from `from`.
    ///
    /// Every error is already logged; the caller only needs it for metrics
    /// or tests. No error leaves the coordinator in a different state than
    /// dropping the message would.
    pub fn handle_message(
        &mut self,
        from: WorkerId,
        message: PeerMessage,
    ) -> Result<(), ProtocolError> {
        match message.kind {
            MessageKind::Request => {
                self.handle_request(from, message.id, message.payload);
                Ok(())
            }
            MessageKind::Response => self.handle_response(from, message),
            other => {
                warn!(
                    worker_id = %from,
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

    fn handle_request(&mut self, origin: WorkerId, id: CorrelationId, payload: Payload) {
        if self.pending.is_pending(&id) {
            debug!(correlation_id = %id, worker_id = %origin, "Duplicate request, ignoring");
            return;
        }

        let Some(origin_sink) = self.registry.sink(origin) else {
            warn!(
                correlation_id = %id,
                worker_id = %origin,
                "Request from a peer that is not live, dropping"
            );
            return;
        };

        let selection = self.selector.select(&self.registry, origin);
        let on_complete = Box::new(move |collected: Vec<Payload>| {
            let count = collected.len();
            match origin_sink.deliver(PeerMessage::aggregate(id, collected)) {
                Ok(()) => debug!(
                    correlation_id = %id,
                    worker_id = %origin,
                    collected = count,
                    "Aggregate sent"
                ),
                Err(e) => warn!(
                    correlation_id = %id,
                    worker_id = %origin,
                    error = %e,
                    "Origin unavailable, aggregate dropped"
                ),
            }
        });

        if self.pending.open(id, origin, selection.expected(), on_complete) != OpenOutcome::Opened {
            return;
        }

        for &recipient in selection.recipients() {
            self.forward(recipient, id, &payload);
        }
    }

    fn forward(&self, recipient: WorkerId, id: CorrelationId, payload: &Payload) {
        let delivered = match self.registry.sink(recipient) {
            Some(sink) => sink.deliver(PeerMessage::request(id, payload.clone())),
            None => Err(shared_bus::TransportError::Closed),
        };
        match delivered {
            Ok(()) => debug!(correlation_id = %id, worker_id = %recipient, "Forwarded request"),
            Err(e) => {
                let reason = ProtocolError::PeerUnavailable { worker_id: recipient };
                warn!(
                    correlation_id = %id,
                    reason = %reason,
                    error = %e,
                    "Forward failed, request will close by deadline"
                );
            }
        }
    }

    fn handle_response(
        &mut self,
        from: WorkerId,
        message: PeerMessage,
    ) -> Result<(), ProtocolError> {
        let Some(correlation_id) = message.correlates_to else {
            warn!(
                worker_id = %from,
                correlation_id = %message.id,
                "Response without correlatesTo, dropping"
            );
            return Err(ProtocolError::missing_correlation("response"));
        };
        self.pending
            .accumulate(correlation_id, message.payload)
            .map(|_| ())
            .map_err(ProtocolError::from)
    }

    /// Expire requests whose deadline has passed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        self.pending.expire_due(now)
    }

    #[must_use]
    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    #[must_use]
    pub fn topology(&self) -> TopologyMode {
        self.selector.mode()
    }

    #[must_use]
    pub fn is_pending(&self, id: &CorrelationId) -> bool {
        self.pending.is_pending(id)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn pending_stats(&self) -> PendingStats {
        self.pending.stats()
    }
}

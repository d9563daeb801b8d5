//! # Topology Selector
//!
//! Decides which live peers receive a forwarded request, and therefore how
//! many responses close it.
//!
//! | mode        | recipients                                   |
//! |-------------|----------------------------------------------|
//! | `broadcast` | every live peer except the origin            |
//! | `ring`      | origin's left and right neighbour, deduplicated |
//!
//! The expected response count is never stored separately from the
//! recipient list: [`Selection::expected`] is its length, so a request can
//! always be closed by the peers it was actually sent to.

use cs_01_peer_registry::PeerRegistry;
use serde::{Deserialize, Serialize};
use shared_types::WorkerId;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fan-out rule, fixed by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyMode {
    #[default]
    Broadcast,
    Ring,
}

impl fmt::Display for TopologyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadcast => f.write_str("broadcast"),
            Self::Ring => f.write_str("ring"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown topology '{0}' (expected 'broadcast' or 'ring')")]
pub struct ParseTopologyError(String);

impl FromStr for TopologyMode {
    type Err = ParseTopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "broadcast" => Ok(Self::Broadcast),
            "ring" => Ok(Self::Ring),
            _ => Err(ParseTopologyError(s.to_string())),
        }
    }
}

/// Recipients chosen for one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    recipients: Vec<WorkerId>,
}

impl Selection {
    #[must_use]
    pub fn recipients(&self) -> &[WorkerId] {
        &self.recipients
    }

    /// Responses required to close the request.
    #[must_use]
    pub fn expected(&self) -> usize {
        self.recipients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

/// Stateless selector; reads the registry fresh on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologySelector {
    mode: TopologyMode,
}

impl TopologySelector {
    #[must_use]
    pub fn new(mode: TopologyMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub fn mode(&self) -> TopologyMode {
        self.mode
    }

    /// Recipients for a request issued by `origin`. Never contains `origin`.
    #[must_use]
    pub fn select(&self, registry: &PeerRegistry, origin: WorkerId) -> Selection {
        let recipients = match self.mode {
            TopologyMode::Broadcast => registry
                .live_ids()
                .into_iter()
                .filter(|&id| id != origin)
                .collect(),
            TopologyMode::Ring => ring_recipients(registry, origin),
        };
        Selection { recipients }
    }
}

fn ring_recipients(registry: &PeerRegistry, origin: WorkerId) -> Vec<WorkerId> {
    let Some((left, right)) = registry.neighbors(origin) else {
        return Vec::new();
    };
    let mut recipients = Vec::with_capacity(2);
    for id in [left, right] {
        if id != origin && !recipients.contains(&id) {
            recipients.push(id);
        }
    }
    recipients
}

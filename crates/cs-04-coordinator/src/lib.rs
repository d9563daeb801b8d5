//! # Coordinator
//!
//! Routes prediction traffic between peer workers.
//!
//! ```text
//! Worker A ──request(id)──▶ Coordinator ──request(id)──▶ B, C   (topology)
//!                               ▲                        │
//!                               └──response(re: id)──────┘
//! Worker A ◀──aggregate(re: id, [B, C])── Coordinator     (expected reached)
//! ```
//!
//! - [`Coordinator`] holds the peer registry, topology selector and
//!   pending-request table, and handles one message at a time.
//! - [`CoordinatorService`] is the single dispatch task that owns the
//!   coordinator: inbound messages, peer exits and the deadline sweep are
//!   serialized through it, so no state is shared between tasks.

mod coordinator;
pub mod service;

pub use coordinator::Coordinator;
pub use service::{
    CoordinatorEvent, CoordinatorHandle, CoordinatorService, InboxSink, DEFAULT_SWEEP_INTERVAL,
};

//! # Pending-Request Table
//!
//! Coordinator-side bookkeeping for open fan-out requests.
//!
//! Flow:
//! 1. Coordinator selects recipients and calls [`PendingRequestTable::open`]
//!    with the expected response count and a completion callback.
//! 2. Every matching `response` goes through [`PendingRequestTable::accumulate`].
//! 3. Reaching the expected count runs the callback and removes the entry.
//! 4. The periodic sweep ([`PendingRequestTable::expire_due`]) removes entries
//!    whose deadline has passed, without running their callback.
//!
//! Each request is closed exactly once, by completion or by expiry. The table
//! is owned by one dispatch task, so it needs no internal locking.

pub mod errors;
pub mod table;

pub use errors::PendingError;
pub use table::{OnComplete, OpenOutcome, PendingRequestTable, PendingStats};

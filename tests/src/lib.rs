//! # Collective-SARSA Test Suite
//!
//! Cross-crate scenarios that no single crate can test on its own.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs        # Coordinator + peers over in-memory sinks
//!     ├── protocol_flows.rs  # Fan-out / fan-in scenarios
//!     ├── peer_failure.rs    # Dying peers, expiry, stale traffic
//!     └── stdio_transport.rs # Same protocol over line-framed byte streams
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cs-tests
//! cargo test -p cs-tests integration::peer_failure
//! ```

pub mod integration;

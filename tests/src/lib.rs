//! # LaunchMasters Auth Test Suite
//!
//! Unified test crate for cross-crate scenarios.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── auth_flows.rs    # Controller lifecycle and reconciliation
//!     └── route_gating.rs  # Controller state driving route decisions
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lm-tests
//! cargo test -p lm-tests integration::
//! ```

pub mod integration;

//! Pure domain logic: state reconciliation, credential validation, and
//! revoked-token tracking. Nothing in this module performs I/O.

pub mod credentials;
pub mod reconcile;
pub mod revoked;

pub use credentials::{Credentials, NewAccount};
pub use reconcile::{reconcile_session, reconcile_signed_out, ProfileOutcome};
pub use revoked::RevokedTokens;

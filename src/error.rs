//! Error types surfaced by the core.
//!
//! Two of the three failure categories the core deals with are represented
//! here. *Validation* errors are locally detected rule violations: the
//! triggering event is rejected synchronously, no session transition takes
//! place and the message is surfaced on the view model returned from the same
//! dispatch. *Serialization* errors occur when the host submits an event the
//! core cannot decode.
//!
//! The remaining two categories are not `Error` values at all: protocol
//! failures reported by an issuer or verifier move the owning flow to its
//! `Failed` status with the message preserved verbatim, and protocol
//! discipline violations (stale or duplicate effect resolutions) are
//! discarded without mutating state.

use thiserror::Error;

/// Errors returned to the host from event processing.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A locally detected rule violation. The event is rejected and the
    /// in-progress session, if any, is left untouched.
    #[error("{0}")]
    Validation(String),

    /// An event could not be deserialized at the host boundary.
    #[error("invalid event: {0}")]
    Serialization(String),
}

impl Error {
    /// Convenience constructor for validation errors.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

//! Events submitted to the core by the host.
//!
//! Events arrive one at a time and are the only way state changes. User
//! intent (accepting an offer, authorizing a presentation) and host I/O
//! results (`Resolve*` variants) share the same alphabet so the core can stay
//! single-threaded.

use serde::{Deserialize, Serialize};

use crate::effect::CorrelationToken;
use crate::error::Error;
use crate::model::{CredentialOffer, IssuedCredential, IssuerMetadata, PresentationRequest};

/// Top-level events.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum Event {
    /// The shell has finished starting up and is ready to render.
    Ready,

    /// Abandon whichever flow is active, or acknowledge its failure.
    Cancel,

    /// The holder entered a transaction code for the pending issuance.
    SetPin(String),

    /// Remove a held credential from the wallet.
    DeleteCredential(String),

    /// Issuance flow events.
    Issuance(IssuanceEvent),

    /// Presentation flow events.
    Presentation(PresentationEvent),
}

/// Events scoped to the issuance flow.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum IssuanceEvent {
    /// An issuer's credential offer arrived, typically scanned from a QR
    /// code.
    ReceiveOffer(CredentialOffer),

    /// The holder accepted the offer on display.
    Accept,

    /// The host finished the metadata fetch requested by a `FetchMetadata`
    /// effect.
    ResolveMetadata {
        /// Token from the effect being resolved.
        correlation: CorrelationToken,
        /// Issuer metadata, or the protocol error message.
        result: Result<IssuerMetadata, String>,
    },

    /// The host finished the credential request issued by a
    /// `RequestCredential` effect.
    ResolveIssuance {
        /// Token from the effect being resolved.
        correlation: CorrelationToken,
        /// The issued credentials, or the protocol error message.
        result: Result<Vec<IssuedCredential>, String>,
    },
}

/// Events scoped to the presentation flow.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum PresentationEvent {
    /// A verifier's presentation request arrived.
    ReceiveRequest(PresentationRequest),

    /// The holder authorized the presentation on display.
    Authorize,

    /// The host finished the submission issued by a `SubmitPresentation`
    /// effect.
    ResolveSubmission {
        /// Token from the effect being resolved.
        correlation: CorrelationToken,
        /// Nothing on success, or the protocol error message.
        result: Result<(), String>,
    },
}

impl Event {
    /// Decode an event arriving over the host boundary.
    ///
    /// # Errors
    /// Returns a serialization error when the bytes are not a valid event.
    pub fn from_json(bytes: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))
    }
}

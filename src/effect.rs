//! Side-effect requests emitted to the host.
//!
//! The core performs no I/O of its own. Every network call, secure-store
//! write or PIN prompt leaves the core as an [`Effect`] alongside the view
//! model. Each effect carries a [`CorrelationToken`]; effects that expect an
//! answer are resolved by the host submitting the matching `Resolve*` event
//! with the same token. A token is accepted exactly once, and only while the
//! session that issued it is still the live one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::credential::Credential;
use crate::model::PinSchema;

/// Opaque identifier pairing an effect with its eventual resolution event.
///
/// Tokens are drawn from a dispatcher-owned counter rather than a random
/// source so that replaying the same events against the same state yields the
/// same effects.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct CorrelationToken(u64);

impl From<u64> for CorrelationToken {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A request for the host to perform work on the core's behalf.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Effect {
    /// Token the host echoes back on the matching `Resolve*` event.
    pub correlation: CorrelationToken,

    /// What the host is being asked to do.
    pub kind: EffectKind,
}

/// The kinds of work the core delegates to the host.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum EffectKind {
    /// Fetch issuer and credential metadata for the offer being processed.
    /// Resolved by `IssuanceEvent::ResolveMetadata`.
    FetchMetadata {
        /// The credential issuer to query.
        issuer: String,
    },

    /// Request issuance of the accepted credentials, quoting the user's
    /// transaction code if one was collected. Resolved by
    /// `IssuanceEvent::ResolveIssuance`.
    RequestCredential {
        /// The credential issuer to call.
        issuer: String,
        /// Transaction code entered by the user, if the offer required one.
        pin: Option<String>,
    },

    /// Submit the authorized presentation to the verifier. Resolved by
    /// `PresentationEvent::ResolveSubmission`.
    SubmitPresentation {
        /// The verifier expecting the presentation.
        verifier: String,
        /// Identifiers of the held credentials being presented.
        credential_ids: Vec<String>,
    },

    /// Ask the shell to collect a transaction code from the user. Answered
    /// with `Event::SetPin` rather than a token-bearing resolution.
    PromptForPin {
        /// Input constraints to apply to the PIN entry surface.
        schema: PinSchema,
    },

    /// Persist a newly held credential to the host's secure store.
    /// Fire-and-forget from the core's perspective.
    StoreCredential {
        /// The credential to persist.
        credential: Credential,
    },
}

/// Which flow an outstanding effect belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Issuance,
    Presentation,
}

#[derive(Clone, Debug)]
struct Pending {
    flow: Flow,
    generation: u64,
}

/// Book-keeping for effects awaiting a host resolution.
///
/// Resolutions are matched on token, owning flow and the generation of the
/// session that issued them. A resolution for a token that is not
/// outstanding, or that was issued by a session since superseded, is refused
/// so the caller can discard it.
#[derive(Clone, Debug, Default)]
pub(crate) struct EffectTracker {
    next: u64,
    outstanding: HashMap<CorrelationToken, Pending>,
}

impl EffectTracker {
    /// Issue a tracked effect that must be resolved by the host.
    pub fn issue(&mut self, flow: Flow, generation: u64, kind: EffectKind) -> Effect {
        let correlation = self.next_token();
        self.outstanding.insert(correlation, Pending { flow, generation });
        Effect { correlation, kind }
    }

    /// Issue an effect the core does not wait on (pin prompt, store write).
    pub fn issue_untracked(&mut self, kind: EffectKind) -> Effect {
        Effect { correlation: self.next_token(), kind }
    }

    /// Attempt to resolve an outstanding effect. Returns `true` when the
    /// token is live for the given flow and generation; the token is then
    /// consumed and cannot be resolved again.
    pub fn resolve(&mut self, token: CorrelationToken, flow: Flow, live_generation: u64) -> bool {
        match self.outstanding.get(&token) {
            Some(pending) if pending.flow == flow && pending.generation == live_generation => {
                self.outstanding.remove(&token);
                true
            }
            _ => false,
        }
    }

    /// Drop any outstanding effects for a flow. Used on cancellation so
    /// tokens do not accumulate; the generation check alone already makes
    /// them inert.
    pub fn purge(&mut self, flow: Flow) {
        self.outstanding.retain(|_, pending| pending.flow != flow);
    }

    fn next_token(&mut self) -> CorrelationToken {
        self.next += 1;
        CorrelationToken(self.next)
    }
}

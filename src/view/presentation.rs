//! Presentation flow projection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use super::credential::CredentialDisplay;
use crate::model::presentation::{PresentationSession, Status};

/// Presentation status as shown to the shell. Failure messages travel on the
/// view model's error field instead of the status.
#[typeshare]
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum PresentationStatus {
    /// No presentation in progress.
    #[default]
    Inactive,

    /// A request is awaiting authorization.
    Requested,

    /// The holder has authorized the presentation.
    Authorized,

    /// The flow failed.
    Failed,
}

impl From<&Status> for PresentationStatus {
    fn from(status: &Status) -> Self {
        match status {
            Status::Inactive => Self::Inactive,
            Status::Requested => Self::Requested,
            Status::Authorized => Self::Authorized,
            Status::Failed(_) => Self::Failed,
        }
    }
}

/// Presentation flow state for the shell.
#[typeshare]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PresentationView {
    /// Where the flow currently is.
    pub status: PresentationStatus,

    /// The verifier making the request.
    pub verifier: String,

    /// Matched credentials, keyed by the verifier's requested key.
    pub credentials: BTreeMap<String, CredentialDisplay>,

    /// Requested keys the wallet holds nothing for.
    pub unmatched: Vec<String>,
}

impl From<&PresentationSession> for PresentationView {
    fn from(session: &PresentationSession) -> Self {
        let mut credentials = BTreeMap::new();
        let mut unmatched = Vec::new();
        for (key, held) in &session.requested {
            match held {
                Some(credential) => {
                    credentials.insert(key.clone(), CredentialDisplay::from(credential));
                }
                None => unmatched.push(key.clone()),
            }
        }

        Self {
            status: PresentationStatus::from(&session.status),
            verifier: session.verifier.clone(),
            credentials,
            unmatched,
        }
    }
}

//! Presentation flow state machine.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::credential::{Credential, CredentialStore};
use crate::model::PresentationRequest;

/// Presentation flow status.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Status {
    /// No presentation in progress.
    #[default]
    Inactive,

    /// A verifier's request has been received and awaits authorization.
    Requested,

    /// The holder has authorized the presentation.
    Authorized,

    /// The flow failed. Terminal until acknowledged with a cancel.
    Failed(String),
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inactive => write!(f, "Inactive"),
            Self::Requested => write!(f, "Requested"),
            Self::Authorized => write!(f, "Authorized"),
            Self::Failed(e) => write!(f, "Failed: {e}"),
        }
    }
}

/// State for a single presentation flow, from request to submission.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PresentationSession {
    /// Where the flow currently is.
    pub status: Status,

    /// The verifier that made the request.
    pub verifier: String,

    /// Requested credential keys with their held matches. A `None` marks a
    /// request item the wallet holds nothing for.
    pub requested: BTreeMap<String, Option<Credential>>,

    /// Bumped every time a new session starts or the current one is
    /// cancelled, making resolutions addressed to an earlier session inert.
    pub generation: u64,
}

impl PresentationSession {
    /// Whether a flow is in progress that a new request would clobber.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        !matches!(self.status, Status::Inactive | Status::Failed(_))
    }

    /// Start a new flow from a verifier's request, matching the requested
    /// keys against held credentials.
    ///
    /// # Errors
    /// Rejects an empty request, and a request received while another
    /// presentation is live.
    pub fn receive_request(
        &mut self,
        request: PresentationRequest,
        store: &CredentialStore,
    ) -> Result<(), Error> {
        if request.credential_ids.is_empty() {
            return Err(Error::validation("request names no credentials"));
        }
        if self.is_live() {
            return Err(Error::validation("another presentation is already in progress"));
        }

        *self = Self {
            status: Status::Requested,
            verifier: request.verifier,
            requested: store.find_matching(&request.credential_ids),
            generation: self.generation + 1,
        };
        Ok(())
    }

    /// Authorize the presentation. Returns the ids of the held credentials to
    /// submit.
    ///
    /// # Errors
    /// Rejected when no request is awaiting authorization, or when any
    /// requested item is unmatched. The status stays `Requested` so the
    /// holder can cancel instead.
    pub fn authorize(&mut self) -> Result<Vec<String>, Error> {
        if self.status != Status::Requested {
            return Err(Error::validation("no presentation is awaiting authorization"));
        }
        if let Some(missing) = self.requested.iter().find(|(_, held)| held.is_none()) {
            return Err(Error::validation(format!(
                "no credential matches the requested {}",
                missing.0
            )));
        }

        self.status = Status::Authorized;
        Ok(self
            .requested
            .values()
            .filter_map(|held| held.as_ref().map(|credential| credential.id.clone()))
            .collect())
    }

    /// Move the flow to `Failed`, preserving the message verbatim.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = Status::Failed(message.into());
    }

    /// Return to `Inactive`, discarding all flow state. The generation bump
    /// makes any still-outstanding resolutions for this session inert.
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::credential::CredentialMetadata;
    use crate::model::IssuedCredential;

    fn store_with(configuration_id: &str) -> CredentialStore {
        let mut store = CredentialStore::default();
        store.set_offered(BTreeMap::from([(
            configuration_id.to_string(),
            CredentialMetadata::default(),
        )]));
        store.promote_to_held(
            "https://issuer.example.com",
            vec![IssuedCredential {
                id: "cred-1".into(),
                configuration_id: configuration_id.into(),
                claims: BTreeMap::new(),
                issuance_date: "2024-11-20T10:00:00Z".parse().unwrap(),
                expiration_date: None,
            }],
        );
        store
    }

    fn request(ids: &[&str]) -> PresentationRequest {
        PresentationRequest {
            verifier: "https://verifier.example.com".into(),
            credential_ids: ids.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn request_through_authorization() {
        let store = store_with("EmployeeID_JWT");
        let mut session = PresentationSession::default();

        session.receive_request(request(&["EmployeeID_JWT"]), &store).unwrap();
        assert_eq!(session.status, Status::Requested);
        assert_eq!(session.generation, 1);

        let ids = session.authorize().unwrap();
        assert_eq!(ids, vec!["cred-1".to_string()]);
        assert_eq!(session.status, Status::Authorized);
    }

    #[test]
    fn unmatched_request_item_blocks_authorization() {
        let store = store_with("EmployeeID_JWT");
        let mut session = PresentationSession::default();
        session
            .receive_request(request(&["EmployeeID_JWT", "Developer_JWT"]), &store)
            .unwrap();

        // the gap is flagged, not dropped
        assert!(session.requested["Developer_JWT"].is_none());

        let err = session.authorize().unwrap_err();
        assert_eq!(
            err,
            Error::validation("no credential matches the requested Developer_JWT")
        );
        assert_eq!(session.status, Status::Requested);
    }

    #[test]
    fn second_request_is_rejected_while_live() {
        let store = store_with("EmployeeID_JWT");
        let mut session = PresentationSession::default();
        session.receive_request(request(&["EmployeeID_JWT"]), &store).unwrap();

        assert!(session.receive_request(request(&["EmployeeID_JWT"]), &store).is_err());
        assert_eq!(session.status, Status::Requested);
    }

    #[test]
    fn reset_bumps_the_generation() {
        let store = store_with("EmployeeID_JWT");
        let mut session = PresentationSession::default();
        session.receive_request(request(&["EmployeeID_JWT"]), &store).unwrap();
        session.reset();

        assert_eq!(session.status, Status::Inactive);
        assert_eq!(session.generation, 2);
        assert!(session.requested.is_empty());
    }
}

//! Issuance flow state machine.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::credential::CredentialMetadata;
use crate::model::{CredentialOffer, IssuerMetadata, PinSchema};

/// Issuance flow status.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Status {
    /// No issuance in progress.
    #[default]
    Inactive,

    /// An offer has been received and issuer metadata is being fetched.
    Offered,

    /// Metadata has arrived and the offer is awaiting the holder's decision.
    Ready,

    /// The offer requires a transaction code the holder has not entered yet.
    PendingPin,

    /// The holder has accepted the offer.
    Accepted,

    /// The credential request has been sent to the issuer.
    Requested,

    /// The flow failed. Terminal until acknowledged with a cancel.
    Failed(String),
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inactive => write!(f, "Inactive"),
            Self::Offered => write!(f, "Offered"),
            Self::Ready => write!(f, "Ready"),
            Self::PendingPin => write!(f, "PendingPin"),
            Self::Accepted => write!(f, "Accepted"),
            Self::Requested => write!(f, "Requested"),
            Self::Failed(e) => write!(f, "Failed: {e}"),
        }
    }
}

/// What accepting an offer obliges the caller to do next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AcceptAction {
    /// A transaction code is required before the request can be sent.
    PromptPin(PinSchema),

    /// The credential request can be sent immediately.
    Request,

    /// The acceptance was already under way. Nothing to do.
    NoOp,
}

/// State for a single issuance flow, from offer to held credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuanceSession {
    /// Where the flow currently is.
    pub status: Status,

    /// The issuer that made the offer.
    pub issuer: String,

    /// Issuer display name, once metadata has arrived.
    pub issuer_name: Option<String>,

    /// Configuration ids named by the offer.
    pub configuration_ids: Vec<String>,

    /// Display metadata per offered configuration, populated from issuer
    /// metadata.
    pub offered: BTreeMap<String, CredentialMetadata>,

    /// Transaction code requirements, when the offer carries them.
    pub pin_schema: Option<PinSchema>,

    /// Transaction code entered by the holder.
    pub pin: Option<String>,

    /// Bumped every time a new session starts or the current one is
    /// cancelled, making resolutions addressed to an earlier session inert.
    pub generation: u64,
}

impl IssuanceSession {
    /// Whether a flow is in progress that a new offer would clobber. A failed
    /// flow is not live; it only waits to be acknowledged.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        !matches!(self.status, Status::Inactive | Status::Failed(_))
    }

    /// Start a new flow from an offer.
    ///
    /// # Errors
    /// Rejects an empty offer, and an offer received while another issuance
    /// is live.
    pub fn receive_offer(&mut self, offer: CredentialOffer) -> Result<(), Error> {
        if offer.credential_configuration_ids.is_empty() {
            return Err(Error::validation("offer contains no credentials"));
        }
        if self.is_live() {
            return Err(Error::validation("another issuance is already in progress"));
        }

        let generation = self.generation + 1;
        *self = Self {
            status: Status::Offered,
            issuer: offer.credential_issuer,
            configuration_ids: offer.credential_configuration_ids,
            pin_schema: offer.tx_code,
            generation,
            ..Self::default()
        };
        Ok(())
    }

    /// Fill in display metadata for the offered configurations and move to
    /// `Ready`. A configuration the issuer does not describe fails the flow.
    pub fn apply_metadata(&mut self, metadata: IssuerMetadata) {
        let mut configurations = metadata.credential_configurations;
        let mut offered = BTreeMap::new();
        for id in &self.configuration_ids {
            let Some(entry) = configurations.remove(id) else {
                self.fail(format!("unsupported credential configuration: {id}"));
                return;
            };
            offered.insert(id.clone(), entry);
        }

        self.issuer_name = metadata.display_name;
        self.offered = offered;
        self.status = Status::Ready;
    }

    /// Accept the offer.
    ///
    /// # Errors
    /// Rejected when there is no offer ready to accept.
    pub fn accept(&mut self) -> Result<AcceptAction, Error> {
        match &self.status {
            Status::Ready => {
                if let Some(schema) = &self.pin_schema {
                    self.status = Status::PendingPin;
                    Ok(AcceptAction::PromptPin(schema.clone()))
                } else {
                    self.status = Status::Accepted;
                    Ok(AcceptAction::Request)
                }
            }
            Status::PendingPin | Status::Accepted | Status::Requested => Ok(AcceptAction::NoOp),
            Status::Inactive | Status::Offered | Status::Failed(_) => {
                Err(Error::validation("no offer is ready to accept"))
            }
        }
    }

    /// Record the transaction code the holder entered and move to `Accepted`.
    ///
    /// # Errors
    /// Rejected when no pin is awaited, or when the pin does not satisfy the
    /// offer's schema. The status is left unchanged so the holder can retry.
    pub fn set_pin(&mut self, pin: String) -> Result<(), Error> {
        if self.status != Status::PendingPin {
            return Err(Error::validation("no pin is awaited"));
        }
        let Some(schema) = &self.pin_schema else {
            return Err(Error::validation("no pin is awaited"));
        };
        schema.validate(&pin)?;

        self.pin = Some(pin);
        self.status = Status::Accepted;
        Ok(())
    }

    /// Note that the credential request has left for the issuer.
    pub fn mark_requested(&mut self) {
        self.status = Status::Requested;
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
    use super::*;
    use crate::model::PinInputMode;

    fn offer(tx_code: Option<PinSchema>) -> CredentialOffer {
        CredentialOffer {
            credential_issuer: "https://issuer.example.com".into(),
            credential_configuration_ids: vec!["EmployeeID_JWT".into()],
            tx_code,
        }
    }

    fn numeric_schema() -> PinSchema {
        PinSchema {
            input_mode: PinInputMode::Numeric,
            length: 6,
            description: None,
        }
    }

    fn metadata() -> IssuerMetadata {
        IssuerMetadata {
            display_name: Some("Example Corp".into()),
            credential_configurations: BTreeMap::from([(
                "EmployeeID_JWT".to_string(),
                CredentialMetadata {
                    name: Some("Employee ID".into()),
                    ..CredentialMetadata::default()
                },
            )]),
        }
    }

    #[test]
    fn offer_through_acceptance_without_pin() {
        let mut session = IssuanceSession::default();
        session.receive_offer(offer(None)).unwrap();
        assert_eq!(session.status, Status::Offered);
        assert_eq!(session.generation, 1);

        session.apply_metadata(metadata());
        assert_eq!(session.status, Status::Ready);
        assert_eq!(session.issuer_name.as_deref(), Some("Example Corp"));

        assert_eq!(session.accept().unwrap(), AcceptAction::Request);
        assert_eq!(session.status, Status::Accepted);
    }

    #[test]
    fn offer_with_tx_code_waits_for_pin() {
        let mut session = IssuanceSession::default();
        session.receive_offer(offer(Some(numeric_schema()))).unwrap();
        session.apply_metadata(metadata());

        let action = session.accept().unwrap();
        assert_eq!(action, AcceptAction::PromptPin(numeric_schema()));
        assert_eq!(session.status, Status::PendingPin);

        // a malformed pin leaves the session awaiting another attempt
        assert!(session.set_pin("12a45".into()).is_err());
        assert_eq!(session.status, Status::PendingPin);

        session.set_pin("123456".into()).unwrap();
        assert_eq!(session.status, Status::Accepted);
        assert_eq!(session.pin.as_deref(), Some("123456"));
    }

    #[test]
    fn second_offer_is_rejected_while_live() {
        let mut session = IssuanceSession::default();
        session.receive_offer(offer(None)).unwrap();

        let err = session.receive_offer(offer(None)).unwrap_err();
        assert_eq!(err, Error::validation("another issuance is already in progress"));
        assert_eq!(session.status, Status::Offered);
    }

    #[test]
    fn offer_replaces_a_failed_flow() {
        let mut session = IssuanceSession::default();
        session.receive_offer(offer(None)).unwrap();
        session.fail("issuer unreachable");

        session.receive_offer(offer(None)).unwrap();
        assert_eq!(session.status, Status::Offered);
        assert_eq!(session.generation, 2);
    }

    #[test]
    fn unknown_configuration_fails_the_flow() {
        let mut session = IssuanceSession::default();
        session.receive_offer(offer(None)).unwrap();
        session.apply_metadata(IssuerMetadata::default());

        assert_eq!(
            session.status,
            Status::Failed("unsupported credential configuration: EmployeeID_JWT".into())
        );
    }

    #[test]
    fn accept_is_idempotent_once_under_way() {
        let mut session = IssuanceSession::default();
        session.receive_offer(offer(None)).unwrap();
        session.apply_metadata(metadata());
        session.accept().unwrap();

        assert_eq!(session.accept().unwrap(), AcceptAction::NoOp);
        assert_eq!(session.status, Status::Accepted);
    }

    #[test]
    fn reset_bumps_the_generation() {
        let mut session = IssuanceSession::default();
        session.receive_offer(offer(None)).unwrap();
        session.reset();

        assert_eq!(session.status, Status::Inactive);
        assert_eq!(session.generation, 2);
        assert!(session.offered.is_empty());
        assert!(session.pin.is_none());
    }
}

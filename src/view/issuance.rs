//! Issuance flow projection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use super::credential::{display_from_metadata, CredentialDisplay};
use crate::model::issuance::{IssuanceSession, Status};
use crate::model::PinSchema;

/// Issuance status as shown to the shell. Failure messages travel on the
/// view model's error field instead of the status.
#[typeshare]
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum IssuanceStatus {
    /// No issuance in progress.
    #[default]
    Inactive,

    /// An offer has been received and issuer metadata is being fetched.
    Offered,

    /// The offer is awaiting the holder's decision.
    Ready,

    /// A transaction code is awaited from the holder.
    PendingPin,

    /// The holder has accepted the offer.
    Accepted,

    /// The credential request has been sent to the issuer.
    Requested,

    /// The flow failed.
    Failed,
}

impl From<&Status> for IssuanceStatus {
    fn from(status: &Status) -> Self {
        match status {
            Status::Inactive => Self::Inactive,
            Status::Offered => Self::Offered,
            Status::Ready => Self::Ready,
            Status::PendingPin => Self::PendingPin,
            Status::Accepted => Self::Accepted,
            Status::Requested => Self::Requested,
            Status::Failed(_) => Self::Failed,
        }
    }
}

/// Issuance flow state for the shell.
#[typeshare]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuanceView {
    /// Where the flow currently is.
    pub status: IssuanceStatus,

    /// Issuer display name, falling back to its identifier.
    pub issuer: String,

    /// Credentials on offer, keyed by configuration id.
    pub credentials: BTreeMap<String, CredentialDisplay>,

    /// The transaction code the holder has entered, for the shell to echo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,

    /// Constraints for the PIN entry surface, when a code is required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_schema: Option<PinSchema>,
}

impl From<&IssuanceSession> for IssuanceView {
    fn from(session: &IssuanceSession) -> Self {
        Self {
            status: IssuanceStatus::from(&session.status),
            issuer: session.issuer_name.clone().unwrap_or_else(|| session.issuer.clone()),
            credentials: session
                .offered
                .iter()
                .map(|(id, metadata)| (id.clone(), display_from_metadata(id, metadata)))
                .collect(),
            pin: session.pin.clone(),
            pin_schema: session.pin_schema.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::credential::CredentialMetadata;
    use crate::model::{CredentialOffer, IssuerMetadata, PinInputMode};

    #[test]
    fn failure_message_is_not_in_the_status() {
        let mut session = IssuanceSession::default();
        session.fail("issuer unreachable");

        let view = IssuanceView::from(&session);
        assert_eq!(view.status, IssuanceStatus::Failed);
    }

    #[test]
    fn offered_credentials_are_projected() {
        let mut session = IssuanceSession::default();
        session
            .receive_offer(CredentialOffer {
                credential_issuer: "https://issuer.example.com".into(),
                credential_configuration_ids: vec!["EmployeeID_JWT".into()],
                tx_code: Some(PinSchema {
                    input_mode: PinInputMode::Numeric,
                    length: 6,
                    description: None,
                }),
            })
            .unwrap();
        session.apply_metadata(IssuerMetadata {
            display_name: Some("Example Corp".into()),
            credential_configurations: BTreeMap::from([(
                "EmployeeID_JWT".to_string(),
                CredentialMetadata {
                    name: Some("Employee ID".into()),
                    ..CredentialMetadata::default()
                },
            )]),
        });

        let view = IssuanceView::from(&session);
        assert_eq!(view.status, IssuanceStatus::Ready);
        assert_eq!(view.issuer, "Example Corp");
        assert_eq!(
            view.credentials["EmployeeID_JWT"].name.as_deref(),
            Some("Employee ID")
        );
        assert_eq!(view.pin_schema.as_ref().map(|s| s.length), Some(6));
        assert!(view.pin.is_none());

        // once entered, the code is echoed back to the shell
        session.accept().unwrap();
        session.set_pin("123456".into()).unwrap();
        let view = IssuanceView::from(&session);
        assert_eq!(view.pin.as_deref(), Some("123456"));
    }
}

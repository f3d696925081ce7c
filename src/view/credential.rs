//! Credential list and detail projections.

use std::collections::BTreeMap;

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::model::credential::{Credential, CredentialMetadata, CredentialStore, Logo};

/// Summary of a credential for list rendering.
#[typeshare]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialDisplay {
    /// Identifier for selecting the credential.
    pub id: String,

    /// Credential name for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The issuer of the credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// Background color for rendering, as a CSS color value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    /// Text color for rendering, as a CSS color value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Inline logo asset. Omitted when the payload is not valid base64.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,

    /// URL of a logo asset, when the issuer hosts it instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// Full detail of one held credential.
#[typeshare]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialDetail {
    /// Summary fields shared with the list rendering.
    pub display: CredentialDisplay,

    /// When the credential was issued, RFC 3339.
    pub issuance_date: String,

    /// When the credential expires, RFC 3339, if it does.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    /// Description of the credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Claim name to claim value.
    pub claims: BTreeMap<String, String>,
}

/// The held credentials, for list rendering.
#[typeshare]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialView {
    /// Summaries of all held credentials, ordered by id.
    pub credentials: Vec<CredentialDisplay>,
}

fn checked_logo(logo: &Option<Logo>) -> Option<Logo> {
    let logo = logo.as_ref()?;
    Base64::decode_vec(&logo.image).ok()?;
    Some(logo.clone())
}

/// Summary built from offered metadata, before a credential id exists. The
/// configuration id stands in as the identifier.
pub fn display_from_metadata(configuration_id: &str, metadata: &CredentialMetadata) -> CredentialDisplay {
    CredentialDisplay {
        id: configuration_id.to_string(),
        name: metadata.name.clone(),
        issuer: None,
        background_color: metadata.background_color.clone(),
        color: metadata.color.clone(),
        logo: checked_logo(&metadata.logo),
        logo_url: metadata.logo_url.clone(),
    }
}

impl From<&Credential> for CredentialDisplay {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id.clone(),
            name: credential.metadata.name.clone(),
            issuer: Some(credential.issuer.clone()),
            background_color: credential.metadata.background_color.clone(),
            color: credential.metadata.color.clone(),
            logo: checked_logo(&credential.metadata.logo),
            logo_url: credential.metadata.logo_url.clone(),
        }
    }
}

impl From<&Credential> for CredentialDetail {
    fn from(credential: &Credential) -> Self {
        Self {
            display: CredentialDisplay::from(credential),
            issuance_date: credential.issuance_date.to_rfc3339(),
            expiration_date: credential.expiration_date.map(|d| d.to_rfc3339()),
            description: credential.metadata.description.clone(),
            claims: credential.claims.clone(),
        }
    }
}

impl From<&CredentialStore> for CredentialView {
    fn from(store: &CredentialStore) -> Self {
        Self {
            credentials: store.list_held().map(CredentialDisplay::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(logo: Option<Logo>) -> Credential {
        Credential {
            id: "cred-1".into(),
            issuer: "https://issuer.example.com".into(),
            configuration_id: "EmployeeID_JWT".into(),
            metadata: CredentialMetadata {
                name: Some("Employee ID".into()),
                description: Some("Proof of employment".into()),
                background_color: Some("#12107c".into()),
                logo,
                ..CredentialMetadata::default()
            },
            claims: BTreeMap::from([("givenName".to_string(), "Normal".to_string())]),
            issuance_date: "2024-11-20T10:00:00Z".parse().unwrap(),
            expiration_date: None,
        }
    }

    #[test]
    fn detail_carries_claims_and_dates() {
        let detail = CredentialDetail::from(&credential(None));

        assert_eq!(detail.display.name.as_deref(), Some("Employee ID"));
        assert_eq!(detail.issuance_date, "2024-11-20T10:00:00+00:00");
        assert!(detail.expiration_date.is_none());
        assert_eq!(detail.claims["givenName"], "Normal");
    }

    #[test]
    fn valid_logo_is_kept() {
        let logo = Logo {
            image: Base64::encode_string(b"png bytes"),
            media_type: "image/png;base64".into(),
        };
        let display = CredentialDisplay::from(&credential(Some(logo.clone())));
        assert_eq!(display.logo, Some(logo));
    }

    #[test]
    fn malformed_logo_is_omitted() {
        let logo = Logo {
            image: "not base64!!".into(),
            media_type: "image/png;base64".into(),
        };
        let display = CredentialDisplay::from(&credential(Some(logo)));
        assert!(display.logo.is_none());
    }

    #[test]
    fn missing_fields_stay_absent() {
        let display = display_from_metadata("EmployeeID_JWT", &CredentialMetadata::default());
        assert_eq!(display.id, "EmployeeID_JWT");
        assert!(display.name.is_none());
        assert!(display.background_color.is_none());
        assert!(display.logo.is_none());
    }
}

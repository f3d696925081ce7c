//! Domain model for the wallet core.
//!
//! The types in this module are the wire shapes exchanged with the host when
//! starting flows and resolving effects, plus the session state machines and
//! the credential store that those flows drive.

pub mod credential;
pub mod issuance;
pub mod presentation;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::error::Error;
pub use credential::{Credential, CredentialMetadata, CredentialStore, Logo};
pub use issuance::IssuanceSession;
pub use presentation::PresentationSession;

/// An issuer-originated proposal naming one or more credentials available for
/// issuance.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialOffer {
    /// The credential issuer making the offer.
    pub credential_issuer: String,

    /// Keys of the credential configurations on offer.
    pub credential_configuration_ids: Vec<String>,

    /// Transaction code requirements, when the issuer expects the user to
    /// quote a code delivered out of band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_code: Option<PinSchema>,
}

/// Types of PIN characters.
#[typeshare]
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum PinInputMode {
    /// Only digits.
    #[default]
    Numeric,

    /// Any characters.
    Text,
}

/// Criteria a transaction code must meet, used both to validate a submitted
/// PIN and to let the shell render a suitable input surface.
#[typeshare]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PinSchema {
    /// Input mode for the PIN.
    pub input_mode: PinInputMode,

    /// The number of characters expected.
    pub length: u32,

    /// Guidance for the holder on how to obtain the transaction code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PinSchema {
    /// Check a submitted PIN against this schema without consuming a network
    /// round trip.
    ///
    /// # Errors
    /// Returns a validation error when the PIN length or character class does
    /// not match.
    pub fn validate(&self, pin: &str) -> Result<(), Error> {
        let count = u32::try_from(pin.chars().count()).unwrap_or(u32::MAX);
        if count != self.length {
            return Err(Error::validation(format!(
                "pin must be exactly {} characters",
                self.length
            )));
        }
        if self.input_mode == PinInputMode::Numeric && !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::validation("pin must contain only digits"));
        }
        Ok(())
    }
}

/// Issuer metadata returned by the host when resolving a `FetchMetadata`
/// effect.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuerMetadata {
    /// Human-readable issuer name, when published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Display metadata for each credential configuration the issuer
    /// supports, keyed by configuration id.
    pub credential_configurations: BTreeMap<String, CredentialMetadata>,
}

/// A credential issued in answer to a `RequestCredential` effect.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuedCredential {
    /// Unique identifier of the issued credential.
    pub id: String,

    /// The credential configuration this credential was issued against.
    pub configuration_id: String,

    /// Claim name to claim value.
    pub claims: BTreeMap<String, String>,

    /// When the credential was issued.
    pub issuance_date: chrono::DateTime<chrono::Utc>,

    /// When the credential expires, if it does.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<chrono::DateTime<chrono::Utc>>,
}

/// A verifier-originated request to present one or more held credentials.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PresentationRequest {
    /// The verifier making the request.
    pub verifier: String,

    /// Keys of the credential configurations the verifier wants presented.
    pub credential_ids: Vec<String>,
}

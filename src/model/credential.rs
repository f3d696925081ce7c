//! Credential types and the in-memory credential store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::IssuedCredential;

/// A logo asset for a credential, inlined as base64.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Logo {
    /// The logo image as a base64-encoded string.
    pub image: String,

    /// Content type of the logo image. e.g. "image/png;base64".
    pub media_type: String,
}

/// Display metadata published by an issuer for one credential configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialMetadata {
    /// Credential name for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description of the credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Background color for rendering, as a CSS color value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    /// Text color for rendering, as a CSS color value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Inline logo asset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,

    /// URL of a logo asset, when the issuer hosts it instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// A credential held by the wallet.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Credential {
    /// Unique identifier, unique across the store.
    pub id: String,

    /// The issuer of the credential.
    pub issuer: String,

    /// The credential configuration this credential was issued against.
    pub configuration_id: String,

    /// Display metadata captured from the issuer at offer time.
    pub metadata: CredentialMetadata,

    /// Claim name to claim value.
    pub claims: BTreeMap<String, String>,

    /// When the credential was issued.
    pub issuance_date: DateTime<Utc>,

    /// When the credential expires, if it does.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
}

/// In-memory collection of credentials, split into held credentials and the
/// metadata of configurations currently on offer.
///
/// A configuration id never appears in both maps at once: `promote_to_held`
/// moves an entry from offered to held, and cancelling or failing an issuance
/// clears the offered side.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialStore {
    held: BTreeMap<String, Credential>,
    offered: BTreeMap<String, CredentialMetadata>,
}

impl CredentialStore {
    /// Record the metadata of configurations on offer, replacing any previous
    /// offer set.
    pub fn set_offered(&mut self, offered: BTreeMap<String, CredentialMetadata>) {
        self.offered = offered;
    }

    /// Discard the offered set without promoting anything.
    pub fn clear_offered(&mut self) {
        self.offered.clear();
    }

    /// Convert issued credentials into held ones, consuming the offered
    /// metadata they were issued against.
    ///
    /// Issued credentials whose configuration was not on offer are skipped.
    /// Returns the credentials that became held, in store order.
    pub fn promote_to_held(
        &mut self,
        issuer: &str,
        issued: Vec<IssuedCredential>,
    ) -> Vec<Credential> {
        let mut promoted = Vec::new();
        for item in issued {
            let Some(metadata) = self.offered.remove(&item.configuration_id) else {
                continue;
            };
            let credential = Credential {
                id: item.id,
                issuer: issuer.to_string(),
                configuration_id: item.configuration_id,
                metadata,
                claims: item.claims,
                issuance_date: item.issuance_date,
                expiration_date: item.expiration_date,
            };
            self.held.insert(credential.id.clone(), credential.clone());
            promoted.push(credential);
        }
        self.offered.clear();
        promoted
    }

    /// Remove a held credential. Returns the removed credential, if any.
    pub fn remove(&mut self, id: &str) -> Option<Credential> {
        self.held.remove(id)
    }

    /// Look up a held credential by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Credential> {
        self.held.get(id)
    }

    /// All held credentials, ordered by id.
    pub fn list_held(&self) -> impl Iterator<Item = &Credential> {
        self.held.values()
    }

    /// Match requested credential keys against held credentials by
    /// configuration id. Unmatched keys map to `None` so callers can surface
    /// the gap rather than drop it.
    #[must_use]
    pub fn find_matching(&self, requested: &[String]) -> BTreeMap<String, Option<Credential>> {
        requested
            .iter()
            .map(|key| {
                let found = self
                    .held
                    .values()
                    .find(|credential| &credential.configuration_id == key)
                    .cloned();
                (key.clone(), found)
            })
            .collect()
    }
}

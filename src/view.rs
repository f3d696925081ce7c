//! View model projected for the shell.
//!
//! Everything in this module is a pure function of core state. The shapes
//! carry `typeshare` annotations so shell-side bindings can be generated from
//! them.

pub mod credential;
pub mod issuance;
pub mod presentation;

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

pub use credential::{CredentialDetail, CredentialDisplay, CredentialView};
pub use issuance::{IssuanceStatus, IssuanceView};
pub use presentation::{PresentationStatus, PresentationView};

use crate::model::{issuance as issuance_model, presentation as presentation_model};
use crate::model::{CredentialStore, IssuanceSession, PresentationSession};

/// Which sub-app the shell should be displaying.
#[typeshare]
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum SubApp {
    /// Showing the splash screen on app launch.
    #[default]
    Splash,

    /// Showing the credentials held.
    Credential,

    /// In an issuance flow.
    Issuance,

    /// In a presentation flow.
    Presentation,
}

/// The complete snapshot rendered by the shell after each event.
#[typeshare]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ViewModel {
    /// Which sub-app to display.
    pub sub_app: SubApp,

    /// Held credentials.
    pub credential: CredentialView,

    /// Issuance flow state, when one is under way.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuance: Option<IssuanceView>,

    /// Presentation flow state, when one is under way.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentation: Option<PresentationView>,

    /// Error message to surface to the user, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ViewModel {
    /// Project the view model from core state.
    #[must_use]
    pub fn project(
        started: bool,
        store: &CredentialStore,
        issuance: &IssuanceSession,
        presentation: &PresentationSession,
    ) -> Self {
        let sub_app = if !started {
            SubApp::Splash
        } else if issuance.status != issuance_model::Status::Inactive {
            SubApp::Issuance
        } else if presentation.status != presentation_model::Status::Inactive {
            SubApp::Presentation
        } else {
            SubApp::Credential
        };

        let error = match (&issuance.status, &presentation.status) {
            (issuance_model::Status::Failed(e), _) | (_, presentation_model::Status::Failed(e)) => {
                Some(e.clone())
            }
            _ => None,
        };

        Self {
            sub_app,
            credential: CredentialView::from(store),
            issuance: (issuance.status != issuance_model::Status::Inactive)
                .then(|| IssuanceView::from(issuance)),
            presentation: (presentation.status != presentation_model::Status::Inactive)
                .then(|| PresentationView::from(presentation)),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CredentialOffer;

    #[test]
    fn splash_until_started() {
        let store = CredentialStore::default();
        let issuance = IssuanceSession::default();
        let presentation = PresentationSession::default();

        let vm = ViewModel::project(false, &store, &issuance, &presentation);
        assert_eq!(vm.sub_app, SubApp::Splash);

        let vm = ViewModel::project(true, &store, &issuance, &presentation);
        assert_eq!(vm.sub_app, SubApp::Credential);
    }

    #[test]
    fn active_issuance_takes_the_screen() {
        let store = CredentialStore::default();
        let mut issuance = IssuanceSession::default();
        issuance
            .receive_offer(CredentialOffer {
                credential_issuer: "https://issuer.example.com".into(),
                credential_configuration_ids: vec!["EmployeeID_JWT".into()],
                tx_code: None,
            })
            .unwrap();
        let presentation = PresentationSession::default();

        let vm = ViewModel::project(true, &store, &issuance, &presentation);
        assert_eq!(vm.sub_app, SubApp::Issuance);
        assert!(vm.issuance.is_some());
        assert!(vm.presentation.is_none());
    }

    #[test]
    fn failed_flow_surfaces_its_message() {
        let store = CredentialStore::default();
        let mut issuance = IssuanceSession::default();
        issuance.fail("issuer unreachable");
        let presentation = PresentationSession::default();

        let vm = ViewModel::project(true, &store, &issuance, &presentation);
        assert_eq!(vm.error.as_deref(), Some("issuer unreachable"));
    }

    #[test]
    fn projection_is_reproducible() {
        let store = CredentialStore::default();
        let issuance = IssuanceSession::default();
        let presentation = PresentationSession::default();

        let a = ViewModel::project(true, &store, &issuance, &presentation);
        let b = ViewModel::project(true, &store, &issuance, &presentation);
        assert_eq!(a, b);
    }
}

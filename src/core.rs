//! The core dispatcher.
//!
//! [`Core`] owns all wallet state and advances it one event at a time. Each
//! dispatch is atomic: the event either applies fully or is rejected with a
//! validation error, and either way the caller gets back a complete view
//! model snapshot plus whatever effects the host must perform.

use tracing::{debug, error, warn};

use crate::effect::{Effect, EffectKind, EffectTracker, Flow};
use crate::error::Error;
use crate::event::{Event, IssuanceEvent, PresentationEvent};
use crate::model::issuance::AcceptAction;
use crate::model::{issuance, presentation as presentation_model};
use crate::model::{CredentialStore, IssuanceSession, PresentationSession};
use crate::view::{CredentialDetail, ViewModel};

/// What the host receives back from a dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    /// Snapshot to render.
    pub view_model: ViewModel,

    /// Work for the host to perform.
    pub effects: Vec<Effect>,
}

/// The wallet's decision core.
///
/// Performs no I/O and holds no locks. The host is expected to serialize
/// event submission; in return every piece of work the core wants done comes
/// back as an [`Effect`].
#[derive(Clone, Debug, Default)]
pub struct Core {
    started: bool,
    store: CredentialStore,
    issuance: IssuanceSession,
    presentation: PresentationSession,
    effects: EffectTracker,
}

impl Core {
    /// Create a core showing the splash screen with an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event and return the resulting snapshot and effects.
    ///
    /// Never panics. Ill-timed but harmless events are no-ops; events that
    /// would violate an invariant leave state untouched and surface a
    /// validation error on the returned view model.
    pub fn dispatch(&mut self, event: Event) -> Update {
        match self.process(event) {
            Ok(effects) => Update { view_model: self.view(), effects },
            Err(e) => {
                debug!("event rejected: {e}");
                let mut view_model = self.view();
                view_model.error = Some(e.to_string());
                Update { view_model, effects: Vec::new() }
            }
        }
    }

    /// Decode an event from JSON and dispatch it. Undecodable bytes surface
    /// a serialization error on the view model.
    pub fn dispatch_json(&mut self, bytes: &[u8]) -> Update {
        match Event::from_json(bytes) {
            Ok(event) => self.dispatch(event),
            Err(e) => {
                let mut view_model = self.view();
                view_model.error = Some(e.to_string());
                Update { view_model, effects: Vec::new() }
            }
        }
    }

    /// Project the current view model without applying an event.
    #[must_use]
    pub fn view(&self) -> ViewModel {
        ViewModel::project(self.started, &self.store, &self.issuance, &self.presentation)
    }

    /// Full detail of one held credential, for the detail screen.
    #[must_use]
    pub fn credential_detail(&self, id: &str) -> Option<CredentialDetail> {
        self.store.get(id).map(CredentialDetail::from)
    }

    fn process(&mut self, event: Event) -> Result<Vec<Effect>, Error> {
        match event {
            Event::Ready => {
                self.started = true;
                Ok(Vec::new())
            }
            Event::Cancel => {
                self.cancel();
                Ok(Vec::new())
            }
            Event::SetPin(pin) => self.set_pin(pin),
            Event::DeleteCredential(id) => {
                if self.store.remove(&id).is_none() {
                    warn!("delete for unheld credential {id} ignored");
                }
                Ok(Vec::new())
            }
            Event::Issuance(event) => self.issuance_event(event),
            Event::Presentation(event) => self.presentation_event(event),
        }
    }

    fn cancel(&mut self) {
        if self.issuance.status != issuance::Status::Inactive {
            debug!("issuance cancelled from {}", self.issuance.status);
            self.issuance.reset();
            self.store.clear_offered();
            self.effects.purge(Flow::Issuance);
        }
        if self.presentation.status != presentation_model::Status::Inactive {
            debug!("presentation cancelled from {}", self.presentation.status);
            self.presentation.reset();
            self.effects.purge(Flow::Presentation);
        }
    }

    fn set_pin(&mut self, pin: String) -> Result<Vec<Effect>, Error> {
        self.issuance.set_pin(pin)?;
        self.issuance.mark_requested();
        debug!("pin accepted, requesting credentials");

        Ok(vec![self.effects.issue(
            Flow::Issuance,
            self.issuance.generation,
            EffectKind::RequestCredential {
                issuer: self.issuance.issuer.clone(),
                pin: self.issuance.pin.clone(),
            },
        )])
    }

    fn issuance_event(&mut self, event: IssuanceEvent) -> Result<Vec<Effect>, Error> {
        match event {
            IssuanceEvent::ReceiveOffer(offer) => {
                self.issuance.receive_offer(offer)?;
                debug!("offer received from {}", self.issuance.issuer);

                Ok(vec![self.effects.issue(
                    Flow::Issuance,
                    self.issuance.generation,
                    EffectKind::FetchMetadata { issuer: self.issuance.issuer.clone() },
                )])
            }
            IssuanceEvent::Accept => match self.issuance.accept()? {
                AcceptAction::PromptPin(schema) => {
                    debug!("offer accepted, awaiting pin");
                    Ok(vec![self.effects.issue_untracked(EffectKind::PromptForPin { schema })])
                }
                AcceptAction::Request => {
                    self.issuance.mark_requested();
                    debug!("offer accepted, requesting credentials");
                    Ok(vec![self.effects.issue(
                        Flow::Issuance,
                        self.issuance.generation,
                        EffectKind::RequestCredential {
                            issuer: self.issuance.issuer.clone(),
                            pin: None,
                        },
                    )])
                }
                AcceptAction::NoOp => Ok(Vec::new()),
            },
            IssuanceEvent::ResolveMetadata { correlation, result } => {
                if !self.effects.resolve(correlation, Flow::Issuance, self.issuance.generation) {
                    warn!("stale metadata resolution {correlation} discarded");
                    return Ok(Vec::new());
                }
                match result {
                    Ok(metadata) => {
                        self.issuance.apply_metadata(metadata);
                        if self.issuance.status == issuance::Status::Ready {
                            self.store.set_offered(self.issuance.offered.clone());
                        } else {
                            error!("issuance failed: {}", self.issuance.status);
                        }
                    }
                    Err(message) => {
                        error!("metadata fetch failed: {message}");
                        self.issuance.fail(message);
                    }
                }
                Ok(Vec::new())
            }
            IssuanceEvent::ResolveIssuance { correlation, result } => {
                if !self.effects.resolve(correlation, Flow::Issuance, self.issuance.generation) {
                    warn!("stale issuance resolution {correlation} discarded");
                    return Ok(Vec::new());
                }
                match result {
                    Ok(issued) => {
                        let promoted = self.store.promote_to_held(&self.issuance.issuer, issued);
                        debug!("issuance complete, {} credential(s) held", promoted.len());
                        self.issuance.reset();
                        self.effects.purge(Flow::Issuance);

                        Ok(promoted
                            .into_iter()
                            .map(|credential| {
                                self.effects
                                    .issue_untracked(EffectKind::StoreCredential { credential })
                            })
                            .collect())
                    }
                    Err(message) => {
                        error!("credential request failed: {message}");
                        self.issuance.fail(message);
                        self.store.clear_offered();
                        Ok(Vec::new())
                    }
                }
            }
        }
    }

    fn presentation_event(&mut self, event: PresentationEvent) -> Result<Vec<Effect>, Error> {
        match event {
            PresentationEvent::ReceiveRequest(request) => {
                self.presentation.receive_request(request, &self.store)?;
                debug!("presentation requested by {}", self.presentation.verifier);
                Ok(Vec::new())
            }
            PresentationEvent::Authorize => {
                let credential_ids = self.presentation.authorize()?;
                debug!("presentation authorized, submitting");

                Ok(vec![self.effects.issue(
                    Flow::Presentation,
                    self.presentation.generation,
                    EffectKind::SubmitPresentation {
                        verifier: self.presentation.verifier.clone(),
                        credential_ids,
                    },
                )])
            }
            PresentationEvent::ResolveSubmission { correlation, result } => {
                if !self
                    .effects
                    .resolve(correlation, Flow::Presentation, self.presentation.generation)
                {
                    warn!("stale submission resolution {correlation} discarded");
                    return Ok(Vec::new());
                }
                match result {
                    Ok(()) => {
                        debug!("presentation complete");
                        self.presentation.reset();
                    }
                    Err(message) => {
                        error!("presentation submission failed: {message}");
                        self.presentation.fail(message);
                    }
                }
                Ok(Vec::new())
            }
        }
    }
}

//! # Wallet Core
//!
//! The decision core of a digital-credential wallet. It owns the issuance
//! and presentation state machines and the credential store, and exposes a
//! single synchronization contract to its host: the shell submits
//! serializable [`Event`]s one at a time, and each dispatch returns an
//! immutable [`ViewModel`] snapshot plus a list of [`Effect`] requests.
//!
//! The core performs no I/O. Network calls, secure-store writes and PIN
//! prompts are all carried out by the host, which then re-enters the core
//! through `Resolve*` events quoting the correlation token from the effect
//! it performed. Cryptographic signing, HTTP transport, key storage and UI
//! are host concerns by design.
//!
//! # Example
//!
//! ```
//! use wallet_core::{Core, Event};
//!
//! let mut core = Core::new();
//! let update = core.dispatch(Event::Ready);
//! assert!(update.effects.is_empty());
//! // render update.view_model, perform update.effects, repeat
//! ```

pub mod core;
pub mod effect;
pub mod error;
pub mod event;
pub mod model;
pub mod view;

pub use crate::core::{Core, Update};
pub use crate::effect::{CorrelationToken, Effect, EffectKind};
pub use crate::error::Error;
pub use crate::event::{Event, IssuanceEvent, PresentationEvent};
pub use crate::view::ViewModel;

//! Controller subsystem for gamepad input handling
//!
//! 1. [`event_collector`] - gilrs enumeration and raw event conversion
//! 2. [`poller`] - periodic polling and dispatch to the translator
//! 3. [`controller`] - shared controller trait, events and settings
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► GilrsRegistry ──► Controller queues ──► Poller tick ──► EventTranslator
//!             (per-pad queues)                       (one lock)
//! ```
//!
//! The poller runs on its own tokio task; the controller set is replaced
//! wholesale whenever the registry reports a different set of gamepads.

#[allow(clippy::module_inception)]
pub mod controller;
pub mod event_collector;
pub mod poller;

pub use controller::{ControlEvent, Controller, ControllerError, ControllerId, PollerSettings};
pub use event_collector::{CollectorSettings, GilrsRegistry};
pub use poller::{ControllerPoller, PollerCore, PollerHandle, TickReport};

//! Declarative routing of tree mutations to controller methods.
//!
//! Elements declare routes in the mutation attribute (`data-mutation` by default) using the
//! descriptor grammar of [`tripwire_descriptor`]:
//!
//! ```html
//! <div data-controller="aria" data-mutation="aria-expanded->aria#log">
//! ```
//!
//! The [`Router`] keeps one [`BubblingObserver`] per declared route, keyed by observed
//! target and cache key in an [`ObserverRegistry`], and turns the records those observers
//! receive into controller [`Invocation`]s. Two more watchers cover the whole managed
//! subtree: one tracks declarations appearing, changing and disappearing, the other drives
//! the `attributeChanged` and `<name>TargetAttributeChanged` callbacks.
//!
//! The router itself is a reducer over delivered batches. [`install`] wires it to an
//! [`ObserverHost`](tripwire_host::ObserverHost) and a [`HostApplication`], and
//! [`Installation::pump`] applies the resulting [`Command`]s.

mod bubbling;
mod callback_watcher;
mod classify;
mod command;
mod controller;
mod descriptor_watcher;
mod error;
mod install;
mod registry;
mod router;
mod schema;

pub use bubbling::{Bubbled, BubblingObserver, ObserverState};
pub use callback_watcher::{CallbackEvent, CallbackWatcher};
pub use classify::{RecordClass, classify};
pub use command::{Command, ControllerRef, Invocation, WatchRole};
pub use controller::{
	AttributeChangeable, Controller, ControllerResolver, Controllers, DispatchOutcome, NamedMutationHandler, TargetAttributeChangeable, dispatch,
};
pub use descriptor_watcher::{DescriptorEvent, DescriptorWatcher};
pub use error::{ConfigError, RouterError};
pub use install::{Application, HostApplication, Installation, MAX_PUMP_BATCHES, PumpReport, install};
pub use registry::{ObserverKey, ObserverRegistry, RouteSnapshot};
pub use router::Router;
pub use schema::{DetachBehavior, Schema, SchemaOverride};

//! Host boundary for the tripwire routing engine.
//!
//! The engine never owns a tree or a change-notification primitive. It consumes them through
//! the types and traits in this crate: opaque [`NodeId`] handles, native-shaped
//! [`MutationRecord`]s, [`MutationObserverInit`] with the native validation rules, and the
//! [`DomTree`] / [`ObserverHost`] traits a host implements.

/// Observer options and their validation.
pub mod init;
/// Node handles.
pub mod node;
/// Watch handles, batched deliveries and the observation trait.
pub mod observer;
/// Native-shaped change records.
pub mod record;
/// Read-only tree queries.
pub mod tree;

pub use init::{MutationObserverInit, ObserveError, ValidatedInit};
pub use node::NodeId;
pub use observer::{Delivery, ObserverHost, WatchId};
pub use record::{MutationKind, MutationRecord};
pub use tree::{Descendants, DomTree};

/// Splits a whitespace-delimited attribute value into its tokens, dropping empty results.
pub fn tokenize(value: &str) -> impl Iterator<Item = &str> {
	value.split_whitespace()
}

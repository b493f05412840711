//! In-memory reference host for tripwire.
//!
//! [`Document`] is an arena of element and text nodes that implements
//! [`DomTree`](tripwire_host::DomTree) and [`ObserverHost`](tripwire_host::ObserverHost)
//! with the queuing and ordering rules of the native mutation observer:
//!
//! * interested observers are collected walking from the mutated node up to the root, so
//!   observers registered closer to the change are notified first;
//! * attribute filters, `subtree` and old-value flags select what each observer sees;
//! * `disconnect` discards undelivered records.
//!
//! Detached nodes stay addressable and can be re-inserted.

mod builder;
mod document;
mod error;

pub use builder::{ElementBuilder, element};
pub use document::Document;
pub use error::DomError;

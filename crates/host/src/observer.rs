use std::fmt;

use crate::{DomTree, MutationRecord, NodeId, ObserveError, ValidatedInit};

/// Handle naming one logical observer across the host boundary.
///
/// The engine allocates these; the host maps each one to a native observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

impl WatchId {
	pub const fn new(raw: u64) -> Self {
		Self(raw)
	}

	pub const fn raw(self) -> u64 {
		self.0
	}
}

impl fmt::Display for WatchId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "watch#{}", self.0)
	}
}

/// One batch of records queued for a single watch, in the order they were queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
	pub watch: WatchId,
	pub records: Vec<MutationRecord>,
}

/// A host's change-notification primitive.
pub trait ObserverHost: DomTree {
	/// Starts observing `target` for `watch`. Observing a node the watch already observes
	/// replaces the options for that node.
	///
	/// # Errors
	///
	/// Returns [`ObserveError`] when the host cannot observe `target` with `init`.
	fn observe(&mut self, watch: WatchId, target: NodeId, init: &ValidatedInit) -> Result<(), ObserveError>;

	/// Stops every registration of `watch` and discards its undelivered records.
	/// Disconnecting an unknown or already disconnected watch is a no-op.
	fn disconnect(&mut self, watch: WatchId);

	/// Takes the next pending batch in notification order, or `None` when idle.
	fn take_delivery(&mut self) -> Option<Delivery>;
}

//! One observer per active route.

use tripwire_descriptor::{CacheKey, MutationDescriptor};
use tripwire_host::{DomTree, MutationRecord, NodeId, ObserveError, WatchId};

use crate::classify::{RecordClass, classify};
use crate::{Command, WatchRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverState {
	/// Created, or stopped with the router.
	Idle,
	Observing,
	/// The descriptor's options are invalid; the route exists but observes nothing.
	Rejected(String),
}

/// A record observed at the route's target, reported on behalf of the declaring element.
#[derive(Debug, Clone, Copy)]
pub struct Bubbled<'a> {
	pub class: RecordClass,
	pub element: NodeId,
	pub record: &'a MutationRecord,
	pub descriptor: &'a MutationDescriptor,
}

/// Observes a descriptor's target with the descriptor's options.
#[derive(Debug, Clone)]
pub struct BubblingObserver {
	watch: WatchId,
	element: NodeId,
	target: NodeId,
	key: CacheKey,
	descriptor: MutationDescriptor,
	state: ObserverState,
}

impl BubblingObserver {
	pub fn new(watch: WatchId, element: NodeId, target: NodeId, descriptor: MutationDescriptor) -> Self {
		Self {
			watch,
			element,
			target,
			key: descriptor.cache_key(),
			descriptor,
			state: ObserverState::Idle,
		}
	}

	pub fn watch(&self) -> WatchId {
		self.watch
	}

	/// Element declaring the descriptor. Controllers are resolved from here.
	pub fn element(&self) -> NodeId {
		self.element
	}

	/// Node observed.
	pub fn target(&self) -> NodeId {
		self.target
	}

	pub fn key(&self) -> &CacheKey {
		&self.key
	}

	pub fn descriptor(&self) -> &MutationDescriptor {
		&self.descriptor
	}

	pub fn state(&self) -> &ObserverState {
		&self.state
	}

	pub fn is_observing(&self) -> bool {
		self.state == ObserverState::Observing
	}

	/// Starts observing, unless already observing.
	///
	/// Invalid options reject the route and yield no command.
	///
	/// # Errors
	///
	/// Any other failure deriving the options.
	pub fn start(&mut self) -> Result<Option<Command>, ObserveError> {
		if self.is_observing() {
			return Ok(None);
		}
		match self.descriptor.observer_init().and_then(|init| init.validate()) {
			Ok(init) => {
				self.state = ObserverState::Observing;
				Ok(Some(Command::Observe {
					watch: self.watch,
					target: self.target,
					init,
					role: WatchRole::Route,
				}))
			}
			Err(ObserveError::InvalidOptions(reason)) => {
				tracing::debug!(
					declaration = %self.descriptor.declaration,
					element = %self.element,
					%reason,
					"router.route.rejected",
				);
				self.state = ObserverState::Rejected(reason);
				Ok(None)
			}
			Err(error) => Err(error),
		}
	}

	/// Marks a route the host refused to observe.
	pub fn reject(&mut self, reason: impl Into<String>) {
		self.state = ObserverState::Rejected(reason.into());
	}

	pub fn stop(&mut self) -> Option<Command> {
		let observing = self.is_observing();
		self.state = ObserverState::Idle;
		observing.then_some(Command::Disconnect { watch: self.watch })
	}

	/// Attribute and child-list records of a delivered batch, in order.
	pub fn bubble<'a, T: DomTree>(&'a self, tree: &T, records: &'a [MutationRecord]) -> Vec<Bubbled<'a>> {
		records
			.iter()
			.filter_map(|record| {
				let class = classify(tree, record)?;
				Some(Bubbled {
					class,
					element: self.element,
					record,
					descriptor: &self.descriptor,
				})
			})
			.collect()
	}
}

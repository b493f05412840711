//! Watches the managed subtree for descriptor declarations coming and going.

use tripwire_descriptor::{MutationDescriptor, parse_descriptors};
use tripwire_host::{DomTree, MutationObserverInit, MutationRecord, NodeId, ObserveError, ValidatedInit, WatchId};

use crate::classify::{RecordClass, classify};
use crate::{Command, DetachBehavior, WatchRole};

/// A change to the descriptors declared on one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorEvent {
	/// The mutation attribute changed. Both lists are parsed; either may be empty.
	Changed {
		element: NodeId,
		new: Vec<MutationDescriptor>,
		old: Vec<MutationDescriptor>,
	},
	/// The element entered the tree, or left it under [`DetachBehavior::Redeclare`].
	Added {
		element: NodeId,
		descriptors: Vec<MutationDescriptor>,
	},
	/// The element left the tree under [`DetachBehavior::Undeclare`].
	Removed {
		element: NodeId,
		descriptors: Vec<MutationDescriptor>,
	},
}

pub struct DescriptorWatcher {
	watch: WatchId,
	root: NodeId,
	mutation_attribute: String,
	on_detach: DetachBehavior,
	observing: bool,
}

impl DescriptorWatcher {
	pub fn new(watch: WatchId, root: NodeId, mutation_attribute: impl Into<String>, on_detach: DetachBehavior) -> Self {
		Self {
			watch,
			root,
			mutation_attribute: mutation_attribute.into(),
			on_detach,
			observing: false,
		}
	}

	pub fn watch(&self) -> WatchId {
		self.watch
	}

	pub fn is_observing(&self) -> bool {
		self.observing
	}

	fn init(&self) -> Result<ValidatedInit, ObserveError> {
		MutationObserverInit {
			subtree: Some(true),
			child_list: Some(true),
			attribute_filter: Some(vec![self.mutation_attribute.clone()]),
			attribute_old_value: Some(true),
			..MutationObserverInit::default()
		}
		.validate()
	}

	pub fn start(&mut self) -> Result<Option<Command>, ObserveError> {
		if self.observing {
			return Ok(None);
		}
		let init = self.init()?;
		self.observing = true;
		Ok(Some(Command::Observe {
			watch: self.watch,
			target: self.root,
			init,
			role: WatchRole::Descriptors,
		}))
	}

	pub fn stop(&mut self) -> Option<Command> {
		std::mem::take(&mut self.observing).then_some(Command::Disconnect { watch: self.watch })
	}

	/// Turns a delivered batch into descriptor events, in record order.
	pub fn events<T: DomTree>(&self, tree: &T, records: &[MutationRecord]) -> Vec<DescriptorEvent> {
		let mut events = Vec::new();
		for record in records {
			match classify(tree, record) {
				Some(RecordClass::Attribute) => {
					if record.attribute_name.as_deref() != Some(self.mutation_attribute.as_str()) {
						continue;
					}
					let element = record.target;
					let new = parse_descriptors(tree.attribute(element, &self.mutation_attribute));
					let old = parse_descriptors(record.old_value.as_deref());
					if !new.is_empty() || !old.is_empty() {
						events.push(DescriptorEvent::Changed { element, new, old });
					}
				}
				Some(RecordClass::ChildList) => {
					for added in &record.added_nodes {
						for (element, descriptors) in self.declarations(tree, *added) {
							events.push(DescriptorEvent::Added { element, descriptors });
						}
					}
					for removed in &record.removed_nodes {
						for (element, descriptors) in self.declarations(tree, *removed) {
							events.push(match self.on_detach {
								DetachBehavior::Redeclare => DescriptorEvent::Added { element, descriptors },
								DetachBehavior::Undeclare => DescriptorEvent::Removed { element, descriptors },
							});
						}
					}
				}
				None => {}
			}
		}
		events
	}

	/// `node` itself, declaring or not, then every descendant carrying the mutation
	/// attribute, with their current descriptors. Non-elements yield nothing.
	pub fn declarations<T: DomTree>(&self, tree: &T, node: NodeId) -> Vec<(NodeId, Vec<MutationDescriptor>)> {
		if !tree.is_element(node) {
			return Vec::new();
		}
		std::iter::once(node)
			.chain(
				tree.descendants(node)
					.filter(|descendant| tree.has_attribute(*descendant, &self.mutation_attribute)),
			)
			.map(|element| (element, parse_descriptors(tree.attribute(element, &self.mutation_attribute))))
			.collect()
	}
}

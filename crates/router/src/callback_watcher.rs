//! Watches attribute changes on controller elements and their targets.

use tripwire_host::{DomTree, MutationObserverInit, MutationRecord, NodeId, ObserveError, ValidatedInit, WatchId};

use crate::classify::{RecordClass, classify};
use crate::{Command, ControllerRef, Schema, WatchRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackEvent {
	/// An attribute changed on an element listing `controller.identifier`.
	OnController {
		controller: ControllerRef,
		attribute_name: String,
		old_value: Option<String>,
	},
	/// An attribute changed on an element declared as a target of `controller`.
	OnTarget {
		controller: ControllerRef,
		target: NodeId,
		target_name: String,
		attribute_name: String,
		old_value: Option<String>,
	},
}

pub struct CallbackWatcher {
	watch: WatchId,
	root: NodeId,
	schema: Schema,
	observing: bool,
}

impl CallbackWatcher {
	pub fn new(watch: WatchId, root: NodeId, schema: &Schema) -> Self {
		Self {
			watch,
			root,
			schema: schema.clone(),
			observing: false,
		}
	}

	pub fn watch(&self) -> WatchId {
		self.watch
	}

	pub fn is_observing(&self) -> bool {
		self.observing
	}

	fn init() -> Result<ValidatedInit, ObserveError> {
		MutationObserverInit {
			subtree: Some(true),
			child_list: Some(true),
			attribute_old_value: Some(true),
			..MutationObserverInit::default()
		}
		.validate()
	}

	pub fn start(&mut self) -> Result<Option<Command>, ObserveError> {
		if self.observing {
			return Ok(None);
		}
		let init = Self::init()?;
		self.observing = true;
		Ok(Some(Command::Observe {
			watch: self.watch,
			target: self.root,
			init,
			role: WatchRole::Callbacks,
		}))
	}

	pub fn stop(&mut self) -> Option<Command> {
		std::mem::take(&mut self.observing).then_some(Command::Disconnect { watch: self.watch })
	}

	/// Events for every attribute record not touching the controller attribute.
	///
	/// An element listing controllers reports to each of them. Any other element reports to
	/// the controllers of its nearest controller ancestor, once per target name it carries
	/// for that controller.
	pub fn events<T: DomTree>(&self, tree: &T, records: &[MutationRecord]) -> Vec<CallbackEvent> {
		let mut events = Vec::new();
		for record in records {
			if classify(tree, record) != Some(RecordClass::Attribute) {
				continue;
			}
			let Some(attribute_name) = record.attribute_name.as_deref() else {
				continue;
			};
			let controller_attribute = self.schema.controller_attribute.as_str();
			if attribute_name == controller_attribute {
				continue;
			}

			let element = record.target;
			if tree.has_attribute(element, controller_attribute) {
				for identifier in tree.token_list(element, controller_attribute) {
					events.push(CallbackEvent::OnController {
						controller: ControllerRef {
							element,
							identifier: identifier.to_string(),
						},
						attribute_name: attribute_name.to_string(),
						old_value: record.old_value.clone(),
					});
				}
				continue;
			}

			let Some(controller_element) = tree.closest_with_attribute(element, controller_attribute) else {
				continue;
			};
			for identifier in tree.token_list(controller_element, controller_attribute) {
				let target_attribute = self.schema.target_attribute_for(identifier);
				for target_name in tree.token_list(element, &target_attribute) {
					events.push(CallbackEvent::OnTarget {
						controller: ControllerRef {
							element: controller_element,
							identifier: identifier.to_string(),
						},
						target: element,
						target_name: target_name.to_string(),
						attribute_name: attribute_name.to_string(),
						old_value: record.old_value.clone(),
					});
				}
			}
		}
		events
	}
}

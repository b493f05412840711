//! Controller capabilities and dispatch.
//!
//! Every callback the router can run is an optional capability. A controller opts in by
//! returning itself from the matching `as_*` view; [`dispatch`] checks for the capability
//! before invoking it and reports a miss as a [`DispatchOutcome`] instead of an error.

use rustc_hash::FxHashMap;
use tripwire_host::{MutationRecord, NodeId};

use crate::{ControllerRef, Invocation};

/// A live controller instance.
pub trait Controller {
	fn as_attribute_changeable(&mut self) -> Option<&mut dyn AttributeChangeable> {
		None
	}

	fn as_target_attribute_changeable(&mut self) -> Option<&mut dyn TargetAttributeChangeable> {
		None
	}

	fn as_mutation_handler(&mut self) -> Option<&mut dyn NamedMutationHandler> {
		None
	}
}

/// `attributeChanged`: an attribute changed on the controller's element.
pub trait AttributeChangeable {
	fn attribute_changed(&mut self, attribute_name: &str, new_value: Option<&str>, old_value: Option<&str>);
}

/// `<name>TargetAttributeChanged`: an attribute changed on a target of the controller.
pub trait TargetAttributeChangeable {
	/// Returns true when the controller has a callback for targets named `target_name`.
	fn responds_to_target(&self, target_name: &str) -> bool;

	fn target_attribute_changed(
		&mut self,
		target_name: &str,
		target: NodeId,
		attribute_name: &str,
		new_value: Option<&str>,
		old_value: Option<&str>,
	);
}

/// Methods named by mutation descriptors.
pub trait NamedMutationHandler {
	fn responds_to(&self, method_name: &str) -> bool;

	fn call(&mut self, method_name: &str, record: &MutationRecord);
}

/// Finds live controllers by element and identifier.
pub trait ControllerResolver {
	fn controller_for(&mut self, element: NodeId, identifier: &str) -> Option<&mut dyn Controller>;
}

/// Result of running one [`Invocation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
	Invoked,
	/// No live controller for the element and identifier.
	NoController,
	/// The controller lacks the capability, or does not respond to the name.
	Unsupported,
}

/// Runs `invocation` against the controller `resolver` finds for it.
pub fn dispatch<R: ControllerResolver + ?Sized>(resolver: &mut R, invocation: &Invocation) -> DispatchOutcome {
	let ControllerRef { element, identifier } = invocation.controller();
	let outcome = match resolver.controller_for(*element, identifier) {
		None => DispatchOutcome::NoController,
		Some(controller) => invoke(controller, invocation),
	};
	tracing::trace!(
		invocation = %invocation.describe(),
		element = %element,
		?outcome,
		"router.dispatch",
	);
	outcome
}

fn invoke(controller: &mut dyn Controller, invocation: &Invocation) -> DispatchOutcome {
	match invocation {
		Invocation::AttributeChanged {
			attribute_name,
			new_value,
			old_value,
			..
		} => {
			let Some(callback) = controller.as_attribute_changeable() else {
				return DispatchOutcome::Unsupported;
			};
			callback.attribute_changed(attribute_name, new_value.as_deref(), old_value.as_deref());
		}
		Invocation::TargetAttributeChanged {
			target,
			target_name,
			attribute_name,
			new_value,
			old_value,
			..
		} => {
			let Some(callback) = controller
				.as_target_attribute_changeable()
				.filter(|callback| callback.responds_to_target(target_name))
			else {
				return DispatchOutcome::Unsupported;
			};
			callback.target_attribute_changed(target_name, *target, attribute_name, new_value.as_deref(), old_value.as_deref());
		}
		Invocation::Method { method_name, record, .. } => {
			let Some(handler) = controller.as_mutation_handler().filter(|handler| handler.responds_to(method_name)) else {
				return DispatchOutcome::Unsupported;
			};
			handler.call(method_name, record);
		}
	}
	DispatchOutcome::Invoked
}

/// Controllers keyed by element and identifier.
#[derive(Default)]
pub struct Controllers {
	by_element: FxHashMap<NodeId, FxHashMap<String, Box<dyn Controller>>>,
}

impl Controllers {
	pub fn new() -> Self {
		Self::default()
	}

	/// Connects `controller`, returning the one it replaces.
	pub fn connect(&mut self, element: NodeId, identifier: impl Into<String>, controller: impl Controller + 'static) -> Option<Box<dyn Controller>> {
		self.by_element
			.entry(element)
			.or_default()
			.insert(identifier.into(), Box::new(controller))
	}

	/// Disconnects and returns the controller, dropping the element's entry once it has none.
	pub fn disconnect(&mut self, element: NodeId, identifier: &str) -> Option<Box<dyn Controller>> {
		let identifiers = self.by_element.get_mut(&element)?;
		let controller = identifiers.remove(identifier);
		if identifiers.is_empty() {
			self.by_element.remove(&element);
		}
		controller
	}

	pub fn is_connected(&self, element: NodeId, identifier: &str) -> bool {
		self.by_element.get(&element).is_some_and(|identifiers| identifiers.contains_key(identifier))
	}

	/// Number of connected controllers.
	pub fn len(&self) -> usize {
		self.by_element.values().map(FxHashMap::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.by_element.is_empty()
	}
}

impl ControllerResolver for Controllers {
	fn controller_for(&mut self, element: NodeId, identifier: &str) -> Option<&mut dyn Controller> {
		let boxed = self.by_element.get_mut(&element)?.get_mut(identifier)?;
		let controller: &mut dyn Controller = boxed.as_mut();
		Some(controller)
	}
}

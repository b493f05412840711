//! Side effects requested by the router.
//!
//! The router is a reducer: it reads the tree, updates its own state and returns
//! [`Command`]s. Whoever drives it applies them to the host and the controllers, in order,
//! after each delivered batch (see [`Installation::pump`](crate::Installation::pump)).

use tripwire_host::{MutationRecord, NodeId, ValidatedInit, WatchId};

/// Which part of the router owns a watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchRole {
	Descriptors,
	Callbacks,
	/// A bubbling observer for one route. Hosts rejecting its options is not fatal.
	Route,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	Observe {
		watch: WatchId,
		target: NodeId,
		init: ValidatedInit,
		role: WatchRole,
	},
	Disconnect {
		watch: WatchId,
	},
	Invoke(Invocation),
}

/// A controller instance, named the way hosts resolve them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControllerRef {
	/// Element whose controller attribute lists `identifier`.
	pub element: NodeId,
	pub identifier: String,
}

/// A controller callback to run.
///
/// Current attribute values are read when the router reduces the batch, not when the
/// invocation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
	/// An attribute changed on the controller's own element.
	AttributeChanged {
		controller: ControllerRef,
		attribute_name: String,
		new_value: Option<String>,
		old_value: Option<String>,
	},
	/// An attribute changed on one of the controller's targets.
	TargetAttributeChanged {
		controller: ControllerRef,
		target: NodeId,
		target_name: String,
		attribute_name: String,
		new_value: Option<String>,
		old_value: Option<String>,
	},
	/// A bubbled record for a method named by a descriptor.
	Method {
		controller: ControllerRef,
		method_name: String,
		record: MutationRecord,
	},
}

impl Invocation {
	pub fn controller(&self) -> &ControllerRef {
		match self {
			Self::AttributeChanged { controller, .. } | Self::TargetAttributeChanged { controller, .. } | Self::Method { controller, .. } => {
				controller
			}
		}
	}

	/// Short description for tracing/logging.
	pub fn describe(&self) -> String {
		match self {
			Self::AttributeChanged {
				controller, attribute_name, ..
			} => format!("{}#attributeChanged({attribute_name})", controller.identifier),
			Self::TargetAttributeChanged {
				controller,
				target_name,
				attribute_name,
				..
			} => format!("{}#{target_name}TargetAttributeChanged({attribute_name})", controller.identifier),
			Self::Method {
				controller, method_name, ..
			} => format!("{}#{method_name}", controller.identifier),
		}
	}
}

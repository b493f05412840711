use thiserror::Error;
use tripwire_host::NodeId;

/// Tree manipulation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
	#[error("unknown node: {0}")]
	UnknownNode(NodeId),

	#[error("{0} is not an element")]
	NotAnElement(NodeId),

	#[error("{0} is not a text node")]
	NotAText(NodeId),

	/// Inserting would make a node its own ancestor, or the parent cannot hold children.
	#[error("cannot insert {child} under {parent}")]
	HierarchyRequest { parent: NodeId, child: NodeId },

	#[error("{reference} is not a child of {parent}")]
	NotAChild { parent: NodeId, reference: NodeId },
}

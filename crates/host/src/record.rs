use crate::NodeId;

/// Kind of a native change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
	Attributes,
	ChildList,
	CharacterData,
}

/// One change reported by the host's notification primitive.
///
/// Shaped like the native record: which fields are meaningful depends on [`MutationKind`].
/// Records are transient and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
	pub kind: MutationKind,
	/// Node the change happened on. For child-list records this is the parent.
	pub target: NodeId,
	/// Changed attribute, for attribute records.
	pub attribute_name: Option<String>,
	/// Previous value, when the observer asked for old values.
	pub old_value: Option<String>,
	pub added_nodes: Vec<NodeId>,
	pub removed_nodes: Vec<NodeId>,
}

impl MutationRecord {
	/// Creates an attribute record.
	pub fn attribute(target: NodeId, attribute_name: impl Into<String>, old_value: Option<String>) -> Self {
		Self {
			kind: MutationKind::Attributes,
			target,
			attribute_name: Some(attribute_name.into()),
			old_value,
			added_nodes: Vec::new(),
			removed_nodes: Vec::new(),
		}
	}

	/// Creates a child-list record.
	pub fn child_list(target: NodeId, added_nodes: Vec<NodeId>, removed_nodes: Vec<NodeId>) -> Self {
		Self {
			kind: MutationKind::ChildList,
			target,
			attribute_name: None,
			old_value: None,
			added_nodes,
			removed_nodes,
		}
	}

	/// Creates a character-data record.
	pub fn character_data(target: NodeId, old_value: Option<String>) -> Self {
		Self {
			kind: MutationKind::CharacterData,
			target,
			attribute_name: None,
			old_value,
			added_nodes: Vec::new(),
			removed_nodes: Vec::new(),
		}
	}
}

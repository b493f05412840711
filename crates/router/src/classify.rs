use tripwire_host::{DomTree, MutationKind, MutationRecord};

/// The two record shapes the router acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordClass {
	/// An attribute changed on an element; `attribute_name` is set.
	Attribute,
	/// Children of an element were added or removed.
	ChildList,
}

/// Classifies `record`, or `None` for character data and records whose target is not an
/// element.
pub fn classify<T: DomTree>(tree: &T, record: &MutationRecord) -> Option<RecordClass> {
	if !tree.is_element(record.target) {
		return None;
	}
	match record.kind {
		MutationKind::Attributes if record.attribute_name.is_some() => Some(RecordClass::Attribute),
		MutationKind::ChildList => Some(RecordClass::ChildList),
		_ => None,
	}
}

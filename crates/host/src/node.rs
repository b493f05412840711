use std::fmt;

/// Opaque handle to a node owned by the host.
///
/// Handles are stable for the lifetime of the node, including while it is detached from
/// the tree, so they can key registries where object identity would otherwise be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
	/// Wraps a raw host index.
	pub const fn from_raw(raw: u32) -> Self {
		Self(raw)
	}

	/// Returns the raw host index.
	pub const fn raw(self) -> u32 {
		self.0
	}

	/// Handle for a slot index, or `None` past `u32::MAX`.
	pub fn try_from_index(index: usize) -> Option<Self> {
		u32::try_from(index).ok().map(Self)
	}

	/// Returns the handle as a slot index.
	pub const fn index(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "node#{}", self.0)
	}
}

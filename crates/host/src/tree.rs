use crate::{NodeId, tokenize};

/// Read-only view of the host tree.
pub trait DomTree {
	/// Root element of the document; `@document` scopes resolve here.
	fn document_element(&self) -> NodeId;

	fn parent(&self, node: NodeId) -> Option<NodeId>;

	/// Child nodes in document order.
	fn children(&self, node: NodeId) -> &[NodeId];

	fn is_element(&self, node: NodeId) -> bool;

	/// Current value of `name` on `node`, or `None` when absent or `node` is not an element.
	fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

	fn has_attribute(&self, node: NodeId, name: &str) -> bool {
		self.attribute(node, name).is_some()
	}

	/// Whitespace tokens of the `name` attribute, empty when absent.
	fn token_list(&self, node: NodeId, name: &str) -> Vec<&str> {
		self.attribute(node, name).map(|value| tokenize(value).collect()).unwrap_or_default()
	}

	/// Nearest inclusive ancestor element of `node` satisfying `predicate`.
	fn closest<P>(&self, node: NodeId, mut predicate: P) -> Option<NodeId>
	where
		Self: Sized,
		P: FnMut(&Self, NodeId) -> bool,
	{
		let mut current = Some(node);
		while let Some(candidate) = current {
			if self.is_element(candidate) && predicate(self, candidate) {
				return Some(candidate);
			}
			current = self.parent(candidate);
		}
		None
	}

	/// Nearest inclusive ancestor element carrying `name`.
	fn closest_with_attribute(&self, node: NodeId, name: &str) -> Option<NodeId>
	where
		Self: Sized,
	{
		self.closest(node, |tree, candidate| tree.has_attribute(candidate, name))
	}

	/// Nearest inclusive ancestor element whose `name` token list contains `token`.
	fn closest_with_token(&self, node: NodeId, name: &str, token: &str) -> Option<NodeId>
	where
		Self: Sized,
	{
		self.closest(node, |tree, candidate| tree.token_list(candidate, name).contains(&token))
	}

	/// Descendants of `node` in document order, excluding `node` itself.
	fn descendants(&self, node: NodeId) -> Descendants<'_, Self>
	where
		Self: Sized,
	{
		Descendants {
			tree: self,
			stack: self.children(node).iter().rev().copied().collect(),
		}
	}
}

/// Pre-order iterator returned by [`DomTree::descendants`].
pub struct Descendants<'a, T> {
	tree: &'a T,
	stack: Vec<NodeId>,
}

impl<T: DomTree> Iterator for Descendants<'_, T> {
	type Item = NodeId;

	fn next(&mut self) -> Option<NodeId> {
		let node = self.stack.pop()?;
		self.stack.extend(self.tree.children(node).iter().rev().copied());
		Some(node)
	}
}

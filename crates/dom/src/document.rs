use std::collections::VecDeque;
use std::fmt::Write as _;

use rustc_hash::FxHashMap;
use tripwire_host::{Delivery, DomTree, MutationKind, MutationRecord, NodeId, ObserveError, ObserverHost, ValidatedInit, WatchId};

use crate::DomError;


enum NodeData {
	Element { tag: String, attributes: Vec<(String, String)> },
	Text(String),
}

struct Node {
	data: NodeData,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	/// Observers registered on this node, in registration order.
	registered: Vec<(WatchId, ValidatedInit)>,
}

/// Arena-backed element tree with mutation observation.
pub struct Document {
	nodes: Vec<Node>,
	document_element: NodeId,
	/// Nodes each watch is registered on, for `disconnect`.
	observed: FxHashMap<WatchId, Vec<NodeId>>,
	queues: FxHashMap<WatchId, Vec<MutationRecord>>,
	/// Watches with queued records, in first-queued order.
	pending: VecDeque<WatchId>,
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl Document {
	/// Creates a document holding only its `<html>` document element.
	pub fn new() -> Self {
		let mut doc = Self {
			nodes: Vec::new(),
			document_element: NodeId::from_raw(0),
			observed: FxHashMap::default(),
			queues: FxHashMap::default(),
			pending: VecDeque::new(),
		};
		doc.document_element = doc.create_element("html");
		doc
	}

	/// Creates a detached element.
	///
	/// # Panics
	///
	/// When every `u32` node handle is taken.
	pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
		self.push(NodeData::Element {
			tag: tag.into(),
			attributes: Vec::new(),
		})
	}

	/// Creates a detached text node.
	///
	/// # Panics
	///
	/// When every `u32` node handle is taken.
	pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
		self.push(NodeData::Text(text.into()))
	}

	fn push(&mut self, data: NodeData) -> NodeId {
		let Some(id) = NodeId::try_from_index(self.nodes.len()) else {
			panic!("document exceeds {} nodes", u32::MAX);
		};
		self.nodes.push(Node {
			data,
			parent: None,
			children: Vec::new(),
			registered: Vec::new(),
		});
		id
	}

	fn node(&self, id: NodeId) -> Result<&Node, DomError> {
		self.nodes.get(id.index()).ok_or(DomError::UnknownNode(id))
	}

	fn attributes_mut(&mut self, id: NodeId) -> Result<&mut Vec<(String, String)>, DomError> {
		let node = self.nodes.get_mut(id.index()).ok_or(DomError::UnknownNode(id))?;
		match &mut node.data {
			NodeData::Element { attributes, .. } => Ok(attributes),
			NodeData::Text(_) => Err(DomError::NotAnElement(id)),
		}
	}

	pub fn tag_name(&self, node: NodeId) -> Option<&str> {
		match &self.nodes.get(node.index())?.data {
			NodeData::Element { tag, .. } => Some(tag),
			NodeData::Text(_) => None,
		}
	}

	pub fn text(&self, node: NodeId) -> Option<&str> {
		match &self.nodes.get(node.index())?.data {
			NodeData::Text(text) => Some(text),
			NodeData::Element { .. } => None,
		}
	}

	/// Returns true when `node` is reachable from the document element.
	pub fn is_connected(&self, node: NodeId) -> bool {
		self.is_inclusive_ancestor(self.document_element, node)
	}

	fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
		let mut current = Some(node);
		while let Some(candidate) = current {
			if candidate == ancestor {
				return true;
			}
			current = self.parent(candidate);
		}
		false
	}

	/// Appends `child` to `parent`, moving it out of its current parent first.
	pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
		self.insert_before(parent, child, None)
	}

	/// Inserts `child` into `parent` before `reference`, or last when `reference` is `None`.
	///
	/// Moving a node reports its removal from the old parent and its addition to the new one
	/// as two child-list records.
	pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> Result<(), DomError> {
		self.node(child)?;
		if !matches!(self.node(parent)?.data, NodeData::Element { .. })
			|| child == self.document_element
			|| self.is_inclusive_ancestor(child, parent)
		{
			return Err(DomError::HierarchyRequest { parent, child });
		}
		if let Some(reference) = reference
			&& (reference == child || self.node(reference)?.parent != Some(parent))
		{
			return Err(DomError::NotAChild { parent, reference });
		}

		self.detach(child);

		let siblings = &mut self.nodes[parent.index()].children;
		let index = reference
			.and_then(|reference| siblings.iter().position(|sibling| *sibling == reference))
			.unwrap_or(siblings.len());
		siblings.insert(index, child);
		self.nodes[child.index()].parent = Some(parent);

		self.queue_record(MutationRecord::child_list(parent, vec![child], Vec::new()));
		Ok(())
	}

	/// Removes `node` from its parent. Removing a detached node is a no-op.
	pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
		self.node(node)?;
		self.detach(node);
		Ok(())
	}

	fn detach(&mut self, node: NodeId) {
		let Some(parent) = self.nodes[node.index()].parent.take() else {
			return;
		};
		self.nodes[parent.index()].children.retain(|sibling| *sibling != node);
		self.queue_record(MutationRecord::child_list(parent, Vec::new(), vec![node]));
	}

	/// Sets an attribute. Setting the current value again still reports a record.
	pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) -> Result<(), DomError> {
		let attributes = self.attributes_mut(node)?;
		let value = value.into();
		let old_value = match attributes.iter_mut().find(|(existing, _)| existing == name) {
			Some(slot) => Some(std::mem::replace(&mut slot.1, value)),
			None => {
				attributes.push((name.to_string(), value));
				None
			}
		};
		self.queue_record(MutationRecord::attribute(node, name, old_value));
		Ok(())
	}

	/// Removes an attribute, returning whether it was present.
	pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<bool, DomError> {
		let attributes = self.attributes_mut(node)?;
		let Some(index) = attributes.iter().position(|(existing, _)| existing == name) else {
			return Ok(false);
		};
		let (_, old_value) = attributes.remove(index);
		self.queue_record(MutationRecord::attribute(node, name, Some(old_value)));
		Ok(true)
	}

	/// Replaces the contents of a text node.
	pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) -> Result<(), DomError> {
		let slot = self.nodes.get_mut(node.index()).ok_or(DomError::UnknownNode(node))?;
		let NodeData::Text(current) = &mut slot.data else {
			return Err(DomError::NotAText(node));
		};
		let old_value = std::mem::replace(current, text.into());
		self.queue_record(MutationRecord::character_data(node, Some(old_value)));
		Ok(())
	}

	/// First connected element whose `id` attribute equals `id`, in document order.
	pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
		let root = self.document_element;
		std::iter::once(root)
			.chain(self.descendants(root))
			.find(|node| self.attribute(*node, "id") == Some(id))
	}

	/// Watches registered directly on `node`, in registration order.
	pub fn registered_watches(&self, node: NodeId) -> Vec<WatchId> {
		self.nodes
			.get(node.index())
			.map(|n| n.registered.iter().map(|(watch, _)| *watch).collect())
			.unwrap_or_default()
	}

	/// Number of watches with undelivered records.
	pub fn pending_deliveries(&self) -> usize {
		self.pending.len()
	}

	/// Serializes `node` and its subtree as HTML.
	pub fn outer_html(&self, node: NodeId) -> String {
		let mut out = String::new();
		self.write_html(node, &mut out);
		out
	}

	fn write_html(&self, node: NodeId, out: &mut String) {
		let Some(n) = self.nodes.get(node.index()) else {
			return;
		};
		match &n.data {
			NodeData::Text(text) => out.push_str(&escape(text, false)),
			NodeData::Element { tag, attributes } => {
				let _ = write!(out, "<{tag}");
				for (name, value) in attributes {
					let _ = write!(out, " {name}=\"{}\"", escape(value, true));
				}
				out.push('>');
				for child in &n.children {
					self.write_html(*child, out);
				}
				let _ = write!(out, "</{tag}>");
			}
		}
	}

	/// Queues `record` for every interested observer.
	///
	/// Observers are collected from the target up to the root; an observer registered on
	/// several of those nodes gets one record, with the old value if any registration asks.
	fn queue_record(&mut self, record: MutationRecord) {
		let mut interested: Vec<(WatchId, bool)> = Vec::new();
		let mut current = Some(record.target);
		while let Some(node) = current {
			let n = &self.nodes[node.index()];
			for (watch, init) in &n.registered {
				if node != record.target && !init.subtree() {
					continue;
				}
				let wants_old_value = match record.kind {
					MutationKind::Attributes => {
						let name = record.attribute_name.as_deref().unwrap_or_default();
						if !init.selects_attribute(name) {
							continue;
						}
						init.attribute_old_value()
					}
					MutationKind::CharacterData => {
						if !init.character_data() {
							continue;
						}
						init.character_data_old_value()
					}
					MutationKind::ChildList => {
						if !init.child_list() {
							continue;
						}
						false
					}
				};
				match interested.iter_mut().find(|(seen, _)| seen == watch) {
					Some(entry) => entry.1 |= wants_old_value,
					None => interested.push((*watch, wants_old_value)),
				}
			}
			current = n.parent;
		}

		for (watch, wants_old_value) in interested {
			let mut queued = record.clone();
			if !wants_old_value {
				queued.old_value = None;
			}
			self.queues.entry(watch).or_default().push(queued);
			if !self.pending.contains(&watch) {
				self.pending.push_back(watch);
			}
		}
	}
}

fn escape(value: &str, attribute: bool) -> String {
	let mut out = String::with_capacity(value.len());
	for ch in value.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' if !attribute => out.push_str("&lt;"),
			'>' if !attribute => out.push_str("&gt;"),
			'"' if attribute => out.push_str("&quot;"),
			_ => out.push(ch),
		}
	}
	out
}

impl DomTree for Document {
	fn document_element(&self) -> NodeId {
		self.document_element
	}

	fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.nodes.get(node.index())?.parent
	}

	fn children(&self, node: NodeId) -> &[NodeId] {
		self.nodes.get(node.index()).map_or(&[], |n| n.children.as_slice())
	}

	fn is_element(&self, node: NodeId) -> bool {
		self.nodes
			.get(node.index())
			.is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
	}

	fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
		match &self.nodes.get(node.index())?.data {
			NodeData::Element { attributes, .. } => attributes
				.iter()
				.find(|(existing, _)| existing == name)
				.map(|(_, value)| value.as_str()),
			NodeData::Text(_) => None,
		}
	}
}

impl ObserverHost for Document {
	fn observe(&mut self, watch: WatchId, target: NodeId, init: &ValidatedInit) -> Result<(), ObserveError> {
		let node = self.nodes.get_mut(target.index()).ok_or(ObserveError::UnknownNode(target))?;
		match node.registered.iter_mut().find(|(existing, _)| *existing == watch) {
			Some(entry) => entry.1 = init.clone(),
			None => {
				node.registered.push((watch, init.clone()));
				self.observed.entry(watch).or_default().push(target);
			}
		}
		Ok(())
	}

	fn disconnect(&mut self, watch: WatchId) {
		if let Some(targets) = self.observed.remove(&watch) {
			for target in targets {
				self.nodes[target.index()].registered.retain(|(existing, _)| *existing != watch);
			}
		}
		self.queues.remove(&watch);
		self.pending.retain(|pending| *pending != watch);
	}

	fn take_delivery(&mut self) -> Option<Delivery> {
		while let Some(watch) = self.pending.pop_front() {
			match self.queues.remove(&watch) {
				Some(records) if !records.is_empty() => return Some(Delivery { watch, records }),
				_ => continue,
			}
		}
		None
	}
}

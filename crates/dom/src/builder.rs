use crate::{Document, DomError};
use tripwire_host::NodeId;

/// Starts a detached element description.
pub fn element(tag: impl Into<String>) -> ElementBuilder {
	ElementBuilder {
		tag: tag.into(),
		attributes: Vec::new(),
		children: Vec::new(),
	}
}

enum Child {
	Element(ElementBuilder),
	Text(String),
}

/// Declarative element description, materialized with [`Document::build`].
pub struct ElementBuilder {
	tag: String,
	attributes: Vec<(String, String)>,
	children: Vec<Child>,
}

impl ElementBuilder {
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.push((name.into(), value.into()));
		self
	}

	/// Shorthand for `attr("id", id)`.
	pub fn id(self, id: impl Into<String>) -> Self {
		self.attr("id", id)
	}

	pub fn child(mut self, child: ElementBuilder) -> Self {
		self.children.push(Child::Element(child));
		self
	}

	pub fn children(mut self, children: impl IntoIterator<Item = ElementBuilder>) -> Self {
		self.children.extend(children.into_iter().map(Child::Element));
		self
	}

	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.children.push(Child::Text(text.into()));
		self
	}
}

impl Document {
	/// Creates the described subtree detached from the document and returns its root.
	///
	/// Nothing observes a detached subtree, so building queues no records.
	pub fn build(&mut self, builder: ElementBuilder) -> Result<NodeId, DomError> {
		let node = self.create_element(builder.tag);
		for (name, value) in builder.attributes {
			self.set_attribute(node, &name, value)?;
		}
		for child in builder.children {
			let child = match child {
				Child::Element(child) => self.build(child)?,
				Child::Text(text) => self.create_text(text),
			};
			self.append_child(node, child)?;
		}
		Ok(node)
	}
}

use std::fmt;

use tripwire_host::{DomTree, MutationObserverInit, NodeId, ObserveError};

use crate::ObserverOptions;

/// Where a descriptor observes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scope {
	/// The element declaring the descriptor.
	#[default]
	Element,
	/// `@document`: the document element.
	Document,
	/// `@window`: deprecated spelling of `@document`.
	Window,
}

impl Scope {
	pub fn as_token(self) -> Option<&'static str> {
		match self {
			Self::Element => None,
			Self::Document => Some("document"),
			Self::Window => Some("window"),
		}
	}
}

/// Registry identity of a descriptor: attribute, identifier, method and sorted options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(Box<str>);

impl CacheKey {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CacheKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// One parsed routing declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationDescriptor {
	pub scope: Scope,
	/// Only changes to this attribute are routed, when present.
	pub attribute_name: Option<String>,
	pub identifier: Option<String>,
	pub method_name: Option<String>,
	pub options: ObserverOptions,
	/// The token as written.
	pub declaration: String,
}

impl MutationDescriptor {
	/// Returns true when the descriptor names both a controller and a method.
	pub fn is_routable(&self) -> bool {
		self.identifier.is_some() && self.method_name.is_some()
	}

	/// Joins attribute, identifier and method with the options in name order, each option
	/// prefixed with `!` when false. Absent parts render empty.
	pub fn cache_key(&self) -> CacheKey {
		let mut parts = vec![
			self.attribute_name.as_deref().unwrap_or_default().to_string(),
			self.identifier.as_deref().unwrap_or_default().to_string(),
			self.method_name.as_deref().unwrap_or_default().to_string(),
		];
		parts.extend(
			self.options
				.iter()
				.map(|(name, value)| if value { name.to_string() } else { format!("!{name}") }),
		);
		CacheKey(parts.join(":").into_boxed_str())
	}

	/// Node this descriptor observes when declared on `element`.
	pub fn resolve_target<T: DomTree>(&self, tree: &T, element: NodeId) -> NodeId {
		match self.scope {
			Scope::Element => element,
			Scope::Document => tree.document_element(),
			Scope::Window => {
				tracing::warn!(declaration = %self.declaration, "routing to @window is equivalent to routing to @document");
				tree.document_element()
			}
		}
	}

	/// Observer options for this descriptor, before native validation.
	///
	/// Layers, later winning:
	///
	/// 1. `subtree: true`;
	/// 2. `attributes: false` when the options say so; otherwise a filter on the declared
	///    attribute with old values; otherwise old values when `attributes` is set, or when
	///    no option selects a change kind at all;
	/// 3. the option overrides, verbatim.
	///
	/// # Errors
	///
	/// Returns [`ObserveError::InvalidOptions`] when an override cannot be applied.
	pub fn observer_init(&self) -> Result<MutationObserverInit, ObserveError> {
		let mut init = MutationObserverInit {
			subtree: Some(true),
			..MutationObserverInit::default()
		};
		match (self.options.get("attributes"), &self.attribute_name) {
			(Some(false), _) => init.attributes = Some(false),
			(_, Some(name)) => {
				init.attribute_filter = Some(vec![name.clone()]);
				init.attribute_old_value = Some(true);
			}
			(Some(true), None) => init.attribute_old_value = Some(true),
			(None, None) if !self.options.names_change_kind() => init.attribute_old_value = Some(true),
			(None, None) => {}
		}
		Ok(init.merge(self.options.to_init()?))
	}
}

/// Renders the canonical token, with options in name order.
impl fmt::Display for MutationDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let (Some(identifier), Some(method_name)) = (&self.identifier, &self.method_name) else {
			return f.write_str(&self.declaration);
		};
		if let Some(name) = &self.attribute_name {
			f.write_str(name)?;
		}
		if let Some(scope) = self.scope.as_token() {
			write!(f, "@{scope}")?;
		}
		if self.attribute_name.is_some() || self.scope != Scope::Element {
			f.write_str("->")?;
		}
		write!(f, "{identifier}#{method_name}")?;
		for (name, value) in self.options.iter() {
			let bang = if value { "" } else { "!" };
			write!(f, ":{bang}{name}")?;
		}
		Ok(())
	}
}

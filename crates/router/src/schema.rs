//! Attribute naming schema.

use serde::Deserialize;

use crate::ConfigError;

const IDENTIFIER_PLACEHOLDER: &str = "{identifier}";

/// What the descriptor watcher reports for subtrees removed from the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetachBehavior {
	/// Removed subtrees are redeclared, so their routes keep observing the detached nodes.
	#[default]
	Redeclare,
	/// Removed subtrees are undeclared and their routes torn down.
	Undeclare,
}

/// Attribute names the router reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Schema {
	/// Lists the controller identifiers attached to an element.
	pub controller_attribute: String,
	/// Holds mutation descriptors.
	pub mutation_attribute: String,
	/// Target membership attribute, with `{identifier}` standing for the controller.
	pub target_attribute: String,
	pub on_detach: DetachBehavior,
}

impl Default for Schema {
	fn default() -> Self {
		Self {
			controller_attribute: "data-controller".to_string(),
			mutation_attribute: "data-mutation".to_string(),
			target_attribute: "data-{identifier}-target".to_string(),
			on_detach: DetachBehavior::Redeclare,
		}
	}
}

impl Schema {
	/// Loads a schema from TOML. Missing fields take their defaults.
	pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
		let schema: Self = toml::from_str(source)?;
		schema.check()?;
		Ok(schema)
	}

	/// Target membership attribute for controller `identifier`.
	pub fn target_attribute_for(&self, identifier: &str) -> String {
		self.target_attribute.replace(IDENTIFIER_PLACEHOLDER, identifier)
	}

	/// Rejects empty attribute names and a target template without a placeholder.
	pub fn check(&self) -> Result<(), ConfigError> {
		for (field, value) in [
			("controller-attribute", &self.controller_attribute),
			("mutation-attribute", &self.mutation_attribute),
			("target-attribute", &self.target_attribute),
		] {
			if value.trim().is_empty() {
				return Err(ConfigError::EmptyAttribute(field));
			}
		}
		if !self.target_attribute.contains(IDENTIFIER_PLACEHOLDER) {
			return Err(ConfigError::MissingIdentifierPlaceholder(self.target_attribute.clone()));
		}
		Ok(())
	}

	/// Applies every field present in `overrides`.
	pub fn merged(mut self, overrides: SchemaOverride) -> Self {
		if let Some(value) = overrides.controller_attribute {
			self.controller_attribute = value;
		}
		if let Some(value) = overrides.mutation_attribute {
			self.mutation_attribute = value;
		}
		if let Some(value) = overrides.target_attribute {
			self.target_attribute = value;
		}
		if let Some(value) = overrides.on_detach {
			self.on_detach = value;
		}
		self
	}
}

/// Partial schema layered over an application's schema at install time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SchemaOverride {
	pub controller_attribute: Option<String>,
	pub mutation_attribute: Option<String>,
	pub target_attribute: Option<String>,
	pub on_detach: Option<DetachBehavior>,
}

impl SchemaOverride {
	pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	/// Overrides only the mutation attribute.
	pub fn mutation_attribute(name: impl Into<String>) -> Self {
		Self {
			mutation_attribute: Some(name.into()),
			..Self::default()
		}
	}
}

//! Observer options.
//!
//! [`MutationObserverInit`] is the loose dictionary a caller builds, where an absent member
//! differs from an explicit `false`. [`MutationObserverInit::validate`] applies the native
//! rules and produces the [`ValidatedInit`] a host actually observes with.

use thiserror::Error;

use crate::NodeId;

/// Failures reported by a host when asked to observe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObserveError {
	/// The options are contradictory or mistyped. Callers may treat this as expected.
	#[error("invalid observer options: {0}")]
	InvalidOptions(String),

	/// The target is not a node this host knows about.
	#[error("unknown node: {0}")]
	UnknownNode(NodeId),
}

impl ObserveError {
	/// Returns true for the option-validation class of failures.
	pub fn is_invalid_options(&self) -> bool {
		matches!(self, Self::InvalidOptions(_))
	}
}

/// Observer options as declared, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationObserverInit {
	pub child_list: Option<bool>,
	pub attributes: Option<bool>,
	pub character_data: Option<bool>,
	pub subtree: Option<bool>,
	pub attribute_old_value: Option<bool>,
	pub character_data_old_value: Option<bool>,
	pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
	/// Sets a boolean member by its native name.
	///
	/// Returns `Ok(false)` for names that are not members, which native dictionaries ignore.
	///
	/// # Errors
	///
	/// Returns [`ObserveError::InvalidOptions`] for `attributeFilter`, which is a sequence
	/// and cannot take a boolean.
	pub fn set_flag(&mut self, name: &str, value: bool) -> Result<bool, ObserveError> {
		let slot = match name {
			"childList" => &mut self.child_list,
			"attributes" => &mut self.attributes,
			"characterData" => &mut self.character_data,
			"subtree" => &mut self.subtree,
			"attributeOldValue" => &mut self.attribute_old_value,
			"characterDataOldValue" => &mut self.character_data_old_value,
			"attributeFilter" => {
				return Err(ObserveError::InvalidOptions(format!("attributeFilter must be a sequence of attribute names, got {value}")));
			}
			_ => return Ok(false),
		};
		*slot = Some(value);
		Ok(true)
	}

	/// Layers `other` over `self`: every member present in `other` wins.
	pub fn merge(mut self, other: Self) -> Self {
		self.child_list = other.child_list.or(self.child_list);
		self.attributes = other.attributes.or(self.attributes);
		self.character_data = other.character_data.or(self.character_data);
		self.subtree = other.subtree.or(self.subtree);
		self.attribute_old_value = other.attribute_old_value.or(self.attribute_old_value);
		self.character_data_old_value = other.character_data_old_value.or(self.character_data_old_value);
		self.attribute_filter = other.attribute_filter.or(self.attribute_filter);
		self
	}

	/// Applies the native validation rules.
	///
	/// # Errors
	///
	/// Returns [`ObserveError::InvalidOptions`] when no change kind is selected, or when an
	/// old-value flag or attribute filter contradicts an explicit `false` for its kind.
	pub fn validate(&self) -> Result<ValidatedInit, ObserveError> {
		let attributes = self
			.attributes
			.unwrap_or(self.attribute_old_value.is_some() || self.attribute_filter.is_some());
		let character_data = self.character_data.unwrap_or(self.character_data_old_value.is_some());
		let child_list = self.child_list.unwrap_or(false);

		if !child_list && !attributes && !character_data {
			return Err(ObserveError::InvalidOptions(
				"one of 'attributes', 'characterData' or 'childList' must be true".to_string(),
			));
		}
		if self.attribute_old_value == Some(true) && !attributes {
			return Err(ObserveError::InvalidOptions(
				"'attributeOldValue' requires 'attributes' to be true or absent".to_string(),
			));
		}
		if self.attribute_filter.is_some() && !attributes {
			return Err(ObserveError::InvalidOptions(
				"'attributeFilter' requires 'attributes' to be true or absent".to_string(),
			));
		}
		if self.character_data_old_value == Some(true) && !character_data {
			return Err(ObserveError::InvalidOptions(
				"'characterDataOldValue' requires 'characterData' to be true or absent".to_string(),
			));
		}

		Ok(ValidatedInit {
			child_list,
			attributes,
			character_data,
			subtree: self.subtree.unwrap_or(false),
			attribute_old_value: self.attribute_old_value.unwrap_or(false),
			character_data_old_value: self.character_data_old_value.unwrap_or(false),
			attribute_filter: self.attribute_filter.clone(),
		})
	}
}

/// Observer options that passed validation. Only [`MutationObserverInit::validate`] builds these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInit {
	child_list: bool,
	attributes: bool,
	character_data: bool,
	subtree: bool,
	attribute_old_value: bool,
	character_data_old_value: bool,
	attribute_filter: Option<Vec<String>>,
}

impl ValidatedInit {
	pub fn child_list(&self) -> bool {
		self.child_list
	}

	pub fn attributes(&self) -> bool {
		self.attributes
	}

	pub fn character_data(&self) -> bool {
		self.character_data
	}

	pub fn subtree(&self) -> bool {
		self.subtree
	}

	pub fn attribute_old_value(&self) -> bool {
		self.attribute_old_value
	}

	pub fn character_data_old_value(&self) -> bool {
		self.character_data_old_value
	}

	pub fn attribute_filter(&self) -> Option<&[String]> {
		self.attribute_filter.as_deref()
	}

	/// Returns true when a change to `name` passes the attribute options.
	pub fn selects_attribute(&self, name: &str) -> bool {
		self.attributes && self.attribute_filter.as_ref().is_none_or(|filter| filter.iter().any(|f| f == name))
	}
}

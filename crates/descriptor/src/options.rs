use std::collections::BTreeMap;

use tripwire_host::{MutationObserverInit, ObserveError};

/// Option names that select a change kind, directly or by implication.
const KIND_OPTIONS: &[&str] = &[
	"attributes",
	"childList",
	"characterData",
	"attributeOldValue",
	"characterDataOldValue",
	"attributeFilter",
];

/// Boolean option overrides of a descriptor, ordered by name.
///
/// Later occurrences of a name win. Names are kept verbatim, including ones the native
/// observer does not know about, so they still distinguish cache keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ObserverOptions(BTreeMap<String, bool>);

impl ObserverOptions {
	/// Parses a `:`-delimited option list. A leading `!` sets the option to false.
	pub fn parse(list: &str) -> Self {
		list.split(':')
			.map(|token| match token.strip_prefix('!') {
				Some(name) => (name, false),
				None => (token, true),
			})
			.filter(|(name, _)| !name.is_empty())
			.collect()
	}

	pub fn get(&self, name: &str) -> Option<bool> {
		self.0.get(name).copied()
	}

	/// Options in name order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
		self.0.iter().map(|(name, value)| (name.as_str(), *value))
	}

	/// Returns true when any override names a change kind.
	pub fn names_change_kind(&self) -> bool {
		KIND_OPTIONS.iter().any(|name| self.0.contains_key(*name))
	}

	/// The overrides as observer options. Unknown names are ignored.
	///
	/// # Errors
	///
	/// Returns [`ObserveError::InvalidOptions`] when a boolean overrides `attributeFilter`.
	pub fn to_init(&self) -> Result<MutationObserverInit, ObserveError> {
		let mut init = MutationObserverInit::default();
		for (name, value) in self.iter() {
			init.set_flag(name, value)?;
		}
		Ok(init)
	}
}

impl<S: Into<String>> FromIterator<(S, bool)> for ObserverOptions {
	fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(name, value)| (name.into(), value)).collect())
	}
}

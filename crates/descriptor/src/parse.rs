use std::sync::LazyLock;

use regex::Regex;
use tripwire_host::tokenize;

use crate::{MutationDescriptor, ObserverOptions, Scope};

static DESCRIPTOR: LazyLock<Option<Regex>> = LazyLock::new(|| {
	let pattern = r"^(?:(.*?)(?:@(window|document))?->)?(.+?)#([^:]+?)(?::(.+))?$";
	Regex::new(pattern)
		.map_err(|e| tracing::error!(pattern, error = %e, "invalid descriptor pattern"))
		.ok()
});

/// Parses one descriptor token. Never fails; see the crate docs.
pub fn parse_descriptor(token: &str) -> MutationDescriptor {
	let declaration = token.to_string();
	let Some(captures) = DESCRIPTOR.as_ref().and_then(|re| re.captures(token.trim())) else {
		tracing::trace!(token, "token is not a mutation descriptor");
		return MutationDescriptor {
			scope: Scope::Element,
			attribute_name: None,
			identifier: None,
			method_name: None,
			options: ObserverOptions::default(),
			declaration,
		};
	};

	let text = |group: usize| captures.get(group).map(|m| m.as_str()).filter(|s| !s.is_empty());
	let scope = match text(2) {
		Some("document") => Scope::Document,
		Some("window") => Scope::Window,
		_ => Scope::Element,
	};

	MutationDescriptor {
		scope,
		attribute_name: text(1).map(str::to_string),
		identifier: text(3).map(str::to_string),
		method_name: text(4).map(str::to_string),
		options: text(5).map(ObserverOptions::parse).unwrap_or_default(),
		declaration,
	}
}

/// Parses every token of a mutation attribute value. An absent value has no descriptors.
pub fn parse_descriptors(value: Option<&str>) -> Vec<MutationDescriptor> {
	value.map(|value| tokenize(value).map(parse_descriptor).collect()).unwrap_or_default()
}

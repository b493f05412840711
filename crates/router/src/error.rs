//! Error types for the router.

use thiserror::Error;
use tripwire_host::ObserveError;

/// Errors loading a [`Schema`](crate::Schema) or [`SchemaOverride`](crate::SchemaOverride).
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The TOML source did not parse or did not match the schema shape.
	#[error("failed to parse schema: {0}")]
	Toml(#[from] toml::de::Error),

	/// An attribute name is empty.
	#[error("schema field '{0}' must not be empty")]
	EmptyAttribute(&'static str),

	/// The target attribute template lacks the `{identifier}` placeholder.
	#[error("target attribute '{0}' must contain '{{identifier}}'")]
	MissingIdentifierPlaceholder(String),
}

/// Fatal routing failures.
///
/// Invalid observer options on a route are not errors; the route is rejected and
/// routing carries on. Dispatch misses are reported as
/// [`DispatchOutcome`](crate::DispatchOutcome)s.
#[derive(Debug, Error)]
pub enum RouterError {
	#[error("observer failed: {0}")]
	Observe(#[from] ObserveError),

	/// The schema given at install time is unusable.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Result type for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;

//! Mutation descriptors.
//!
//! A descriptor is one whitespace-delimited token of the mutation attribute. It names the
//! controller method a change should be routed to, and optionally which attribute to watch,
//! where to watch it and how:
//!
//! ```text
//! [[attribute]['@' scope] '->'] identifier '#' method [':' option]*
//!
//! scope  := "document" | "window"
//! option := ['!'] name
//! ```
//!
//! Examples:
//!
//! * `aria#log` routes attribute changes anywhere in the declaring subtree to `aria#log`;
//! * `hidden->aria#log` only routes changes to `hidden`;
//! * `@document->aria#log:childList` observes the whole document for child-list changes;
//! * `aria-hidden->aria#log:!subtree` ignores changes on descendants.
//!
//! Parsing never fails. A token outside the grammar yields a descriptor without an identifier
//! or method name, which [`MutationDescriptor::is_routable`] reports as unusable.
//!
//! Option names are the native observer option names (`childList`, `attributes`,
//! `subtree`, ...). They override the options derived from the rest of the token; see
//! [`MutationDescriptor::observer_init`].

mod descriptor;
mod options;
mod parse;

pub use descriptor::{CacheKey, MutationDescriptor, Scope};
pub use options::ObserverOptions;
pub use parse::{parse_descriptor, parse_descriptors};

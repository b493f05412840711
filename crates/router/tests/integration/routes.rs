use std::collections::BTreeSet;

use proptest::prelude::*;
use tripwire_descriptor::parse_descriptors;
use tripwire_dom::element;
use tripwire_host::DomTree;
use tripwire_router::ObserverState;

use crate::common::Harness;

const TOKENS: &[&str] = &[
	"aria#log",
	"aria#log:childList",
	"aria#log:attributes:childList",
	"hidden->aria#log",
	"hidden->aria#log:!subtree",
	"aria#log:!attributes",
	"aria#log:attributeFilter",
	"garbage",
	"aria#",
];

#[derive(Debug, Clone)]
enum Edit {
	Set(Vec<usize>),
	Remove,
}

fn arb_edit() -> impl Strategy<Value = Edit> {
	prop_oneof![
		5 => prop::collection::vec(0..TOKENS.len(), 0..5).prop_map(Edit::Set),
		1 => Just(Edit::Remove),
	]
}

proptest! {
	/// Whatever the attribute goes through, the element's routes are exactly its distinct
	/// routable keys, and the host observes exactly the routes that are observing.
	#[test]
	fn prop_routes_track_the_mutation_attribute(edits in prop::collection::vec(arb_edit(), 1..12)) {
		let mut h = Harness::new([element("div").id("controller").attr("data-controller", "aria")]);
		let controller = h.id("controller");

		for edit in edits {
			match edit {
				Edit::Set(tokens) => {
					let value = tokens.iter().map(|i| TOKENS[*i]).collect::<Vec<_>>().join(" ");
					h.doc.set_attribute(controller, "data-mutation", value).unwrap();
				}
				Edit::Remove => {
					h.doc.remove_attribute(controller, "data-mutation").unwrap();
				}
			}
			h.pump();

			let expected: BTreeSet<String> = parse_descriptors(h.doc.attribute(controller, "data-mutation"))
				.into_iter()
				.filter(|descriptor| descriptor.is_routable())
				.map(|descriptor| descriptor.cache_key().to_string())
				.collect();
			let registry = h.installation.router().registry();
			let actual: BTreeSet<String> = registry.keys_for(controller).into_iter().map(ToString::to_string).collect();
			prop_assert_eq!(&actual, &expected);
			prop_assert_eq!(registry.len(), expected.len());

			let mut observing: Vec<_> = registry
				.snapshots()
				.into_iter()
				.filter(|route| route.state == ObserverState::Observing)
				.map(|route| route.watch)
				.collect();
			observing.sort();
			let mut registered = h.doc.registered_watches(controller);
			registered.sort();
			prop_assert_eq!(registered, observing);
		}
	}
}

use pretty_assertions::assert_eq;
use tripwire_dom::element;
use tripwire_host::{DomTree, MutationRecord};

use crate::common::{Call, Harness};

fn fixture() -> Harness {
	Harness::new([element("div")
		.id("controller")
		.attr("data-controller", "aria")
		.attr("data-mutation", "hidden->aria#log")
		.child(
			element("button")
				.id("observed")
				.attr("data-aria-target", "observed")
				.attr("aria-expanded", "false"),
		)
		.child(element("button").id("ignored"))])
}

#[test]
fn triggers_attribute_changed_after_the_controller_reconnects() {
	let mut h = fixture();
	let controller = h.id("controller");

	h.remove_attribute(controller, "data-controller");
	h.disconnect(controller);
	h.set_attribute(controller, "data-controller", "aria");
	h.connect(controller);
	assert!(h.take_calls().is_empty());

	h.set_attribute(controller, "aria-expanded", "true");

	assert_eq!(
		h.take_calls(),
		vec![Call::AttributeChanged {
			element: controller,
			attribute_name: "aria-expanded".to_string(),
			new_value: Some("true".to_string()),
			old_value: None,
		}]
	);
}

#[test]
fn removing_the_identifier_stops_attribute_changed() {
	let mut h = fixture();
	let controller = h.id("controller");

	h.remove_attribute(controller, "data-controller");
	h.disconnect(controller);
	let report = h.set_attribute(controller, "aria-expanded", "true");

	assert!(h.take_calls().is_empty());
	assert!(h.app.controllers().is_empty());
	assert_eq!(report.missed, 0);
}

#[test]
fn triggers_attribute_changed_on_the_controller_element() {
	let mut h = fixture();
	let controller = h.id("controller");

	h.set_attribute(controller, "aria-expanded", "true");
	h.remove_attribute(controller, "aria-expanded");

	let changed = |new_value: Option<&str>, old_value: Option<&str>| Call::AttributeChanged {
		element: controller,
		attribute_name: "aria-expanded".to_string(),
		new_value: new_value.map(str::to_string),
		old_value: old_value.map(str::to_string),
	};
	assert_eq!(h.take_calls(), vec![changed(Some("true"), None), changed(None, Some("true"))]);
}

#[test]
fn triggers_named_target_attribute_changed() {
	let mut h = fixture();
	let controller = h.id("controller");
	let observed = h.id("observed");

	h.set_attribute(observed, "aria-expanded", "true");

	assert_eq!(
		h.take_calls(),
		vec![Call::TargetAttributeChanged {
			element: controller,
			target_name: "observed".to_string(),
			target: observed,
			attribute_name: "aria-expanded".to_string(),
			new_value: Some("true".to_string()),
			old_value: Some("false".to_string()),
		}]
	);
}

#[test]
fn targets_the_controller_does_not_declare_are_missed() {
	let mut h = fixture();
	let observed = h.id("observed");
	h.set_attribute(observed, "data-aria-target", "observed other");
	h.take_calls();

	let report = h.set_attribute(observed, "aria-expanded", "true");

	assert_eq!(h.take_calls().len(), 1);
	assert_eq!(report.invoked, 1);
	assert_eq!(report.missed, 1);
}

#[test]
fn routes_mutations_matching_an_ancestor_descriptor() {
	let mut h = fixture();
	let controller = h.id("controller");
	let ignored = h.id("ignored");

	h.set_attribute(ignored, "hidden", "");

	assert_eq!(
		h.take_calls(),
		vec![Call::Log {
			element: controller,
			record: MutationRecord::attribute(ignored, "hidden", None),
		}]
	);
	assert_eq!(h.doc.attribute(ignored, "hidden"), Some(""));
}

#[test]
fn ignores_elements_that_are_neither_controller_nor_target() {
	let mut h = fixture();
	let ignored = h.id("ignored");

	let report = h.set_attribute(ignored, "aria-expanded", "true");

	assert!(h.take_calls().is_empty());
	assert_eq!(report.invoked + report.missed, 0);
}

#[test]
fn controller_attribute_changes_are_not_callbacks() {
	let mut h = fixture();
	let controller = h.id("controller");

	let report = h.set_attribute(controller, "data-controller", "aria menu");

	assert!(h.take_calls().is_empty());
	assert_eq!(report.invoked + report.missed, 0);
}

#[test]
fn every_listed_identifier_is_called_back() {
	let mut h = fixture();
	let controller = h.id("controller");
	h.set_attribute(controller, "data-controller", "aria menu");

	let report = h.set_attribute(controller, "aria-expanded", "true");

	assert_eq!(h.take_calls().len(), 1);
	assert_eq!(report.invoked, 1);
	assert_eq!(report.missed, 1);
}

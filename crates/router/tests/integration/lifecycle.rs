use pretty_assertions::assert_eq;
use tripwire_descriptor::parse_descriptor;
use tripwire_dom::{ElementBuilder, element};
use tripwire_host::{DomTree, MutationRecord, NodeId, ObserveError};
use tripwire_router::{ConfigError, DetachBehavior, MAX_PUMP_BATCHES, RouterError, Schema, SchemaOverride};

use crate::common::{Call, Harness, RefusingHost};

fn fixture() -> [ElementBuilder; 1] {
	[element("section").id("container").child(
		element("div")
			.id("controller")
			.attr("data-controller", "aria")
			.attr("data-mutation", "hidden->aria#log")
			.child(element("button").id("button")),
	)]
}

fn hidden(button: NodeId, controller: NodeId) -> (NodeId, MutationRecord) {
	(controller, MutationRecord::attribute(button, "hidden", None))
}

#[test]
fn detached_subtrees_keep_routing_when_redeclared() {
	let mut h = Harness::new(fixture());
	let (container, controller, button) = (h.id("container"), h.id("controller"), h.id("button"));

	h.doc.remove(controller).unwrap();
	h.pump();
	assert_eq!(h.installation.router().registry().len(), 1);

	h.set_attribute(button, "hidden", "");
	assert_eq!(h.take_logged(), vec![hidden(button, controller)]);

	h.doc.remove_attribute(button, "hidden").unwrap();
	h.doc.append_child(container, controller).unwrap();
	h.pump();
	h.take_calls();
	assert_eq!(h.installation.router().registry().len(), 1);
	assert_eq!(h.doc.registered_watches(controller).len(), 1);

	h.set_attribute(button, "hidden", "");
	assert_eq!(h.take_logged(), vec![hidden(button, controller)]);
}

#[test]
fn detached_subtrees_are_undeclared_when_configured() {
	let overrides = SchemaOverride {
		on_detach: Some(DetachBehavior::Undeclare),
		..SchemaOverride::default()
	};
	let mut h = Harness::with_override(fixture(), overrides);
	let (container, controller, button) = (h.id("container"), h.id("controller"), h.id("button"));

	h.doc.remove(controller).unwrap();
	h.pump();
	assert!(h.installation.router().registry().is_empty());
	assert!(h.doc.registered_watches(controller).is_empty());

	h.set_attribute(button, "hidden", "");
	assert!(h.take_logged().is_empty());

	h.doc.remove_attribute(button, "hidden").unwrap();
	h.doc.append_child(container, controller).unwrap();
	h.pump();
	h.take_calls();

	h.set_attribute(button, "hidden", "");
	assert_eq!(h.take_logged(), vec![hidden(button, controller)]);
}

#[test]
fn document_scoped_routes_changed_while_detached_are_replaced() {
	let mut h = Harness::new([
		element("section").id("container").child(
			element("div")
				.id("controller")
				.attr("data-controller", "aria")
				.attr("data-mutation", "aria-busy@document->aria#log"),
		),
		element("aside").id("outside"),
	]);
	let (container, controller, outside) = (h.id("container"), h.id("controller"), h.id("outside"));
	let root = h.doc.document_element();

	h.doc.remove(controller).unwrap();
	h.pump();
	h.doc.set_attribute(controller, "data-mutation", "aria-hidden@document->aria#log").unwrap();
	h.doc.append_child(container, controller).unwrap();
	h.pump();
	h.take_calls();

	let expected = parse_descriptor("aria-hidden@document->aria#log").cache_key();
	assert_eq!(h.installation.router().registry().keys_for(root), vec![&expected]);
	assert_eq!(h.doc.registered_watches(root).len(), 3);

	h.set_attribute(outside, "aria-busy", "true");
	assert!(h.take_logged().is_empty());

	h.set_attribute(outside, "aria-hidden", "true");
	assert_eq!(
		h.take_logged(),
		vec![(controller, MutationRecord::attribute(outside, "aria-hidden", None))]
	);
}

#[test]
fn nested_declarations_follow_their_subtree() {
	let mut h = Harness::new([element("section").id("container").child(
		element("div")
			.id("wrapper")
			.child(element("div").id("controller").attr("data-controller", "aria").attr("data-mutation", "aria#log")),
	)]);
	let (container, wrapper, controller) = (h.id("container"), h.id("wrapper"), h.id("controller"));
	let before = h.installation.router().registry().snapshots()[0].watch;

	h.doc.remove(wrapper).unwrap();
	h.doc.append_child(container, wrapper).unwrap();
	h.pump();

	let routes = h.installation.router().registry().snapshots();
	assert_eq!(routes.len(), 1);
	assert_eq!(routes[0].element, controller);
	assert_ne!(routes[0].watch, before);
	assert_eq!(h.doc.registered_watches(controller), vec![routes[0].watch]);
}

#[test]
fn stop_and_start_are_idempotent() {
	let mut h = Harness::new(fixture());
	let (controller, button) = (h.id("controller"), h.id("button"));
	let root = h.doc.document_element();

	h.installation.stop(&mut h.doc, &mut h.app).unwrap();
	h.installation.stop(&mut h.doc, &mut h.app).unwrap();
	assert!(!h.installation.router().is_started());
	assert!(h.doc.registered_watches(root).is_empty());
	assert!(h.doc.registered_watches(controller).is_empty());

	h.set_attribute(button, "hidden", "");
	assert_eq!(h.doc.pending_deliveries(), 0);
	assert!(h.take_calls().is_empty());

	h.installation.start(&mut h.doc, &mut h.app).unwrap();
	h.installation.start(&mut h.doc, &mut h.app).unwrap();
	assert_eq!(h.doc.registered_watches(root).len(), 2);
	assert_eq!(h.doc.registered_watches(controller).len(), 1);

	h.set_attribute(button, "hidden", "until-found");
	assert_eq!(
		h.take_logged(),
		vec![(controller, MutationRecord::attribute(button, "hidden", Some(String::new())))]
	);
}

#[test]
fn failed_start_leaves_the_router_stopped_and_retryable() {
	let mut h = Harness::new(fixture());
	let (controller, button) = (h.id("controller"), h.id("button"));
	let root = h.doc.document_element();
	h.installation.stop(&mut h.doc, &mut h.app).unwrap();

	let refused = h.installation.router().descriptor_watch();
	let mut host = RefusingHost { doc: &mut h.doc, refused };
	let error = h.installation.start(&mut host, &mut h.app).err();
	assert!(matches!(error, Some(RouterError::Observe(ObserveError::UnknownNode(node))) if node == root));
	assert!(!h.installation.router().is_started());
	assert!(h.doc.registered_watches(root).is_empty());
	assert!(h.doc.registered_watches(controller).is_empty());

	h.installation.start(&mut h.doc, &mut h.app).unwrap();
	assert!(h.installation.router().is_started());
	assert_eq!(h.doc.registered_watches(root).len(), 2);
	assert_eq!(h.doc.registered_watches(controller).len(), 1);

	h.set_attribute(button, "hidden", "");
	assert_eq!(h.take_logged(), vec![hidden(button, controller)]);
}

#[test]
fn start_declares_routes_added_while_stopped() {
	let mut h = Harness::new(fixture());
	let controller = h.id("controller");

	h.installation.stop(&mut h.doc, &mut h.app).unwrap();
	h.doc.set_attribute(controller, "data-mutation", "hidden->aria#log aria#log:childList").unwrap();
	h.installation.start(&mut h.doc, &mut h.app).unwrap();

	let declarations: Vec<_> = h
		.installation
		.router()
		.registry()
		.snapshots()
		.into_iter()
		.map(|route| route.declaration)
		.collect();
	assert_eq!(declarations, vec!["aria#log:childList".to_string(), "hidden->aria#log".to_string()]);
	assert_eq!(h.doc.registered_watches(controller).len(), 2);
}

#[test]
fn uninstall_releases_every_watch() {
	let h = Harness::new(fixture());
	let (controller, button) = (h.id("controller"), h.id("button"));
	let root = h.doc.document_element();

	let Harness {
		mut doc,
		mut app,
		installation,
		..
	} = h;
	installation.uninstall(&mut doc, &mut app).unwrap();

	assert!(doc.registered_watches(root).is_empty());
	assert!(doc.registered_watches(controller).is_empty());
	doc.set_attribute(button, "hidden", "").unwrap();
	assert_eq!(doc.pending_deliveries(), 0);
}

#[test]
fn custom_schema_renames_the_attributes() {
	let schema = Schema::from_toml(
		r#"
		controller-attribute = "data-ctl"
		mutation-attribute = "data-watch"
		target-attribute = "data-{identifier}-part"
		"#,
	)
	.unwrap();
	let mut h = Harness::try_new(
		[element("div")
			.id("controller")
			.attr("data-ctl", "aria")
			.attr("data-watch", "hidden->aria#log")
			.child(element("button").id("observed").attr("data-aria-part", "observed"))],
		schema,
		None,
	)
	.unwrap();
	let (controller, observed) = (h.id("controller"), h.id("observed"));

	let report = h.set_attribute(observed, "hidden", "");

	assert_eq!(report.invoked, 2);
	let calls = h.take_calls();
	assert_eq!(calls.len(), 2);
	assert!(calls.contains(&Call::Log {
		element: controller,
		record: MutationRecord::attribute(observed, "hidden", None),
	}));
}

#[test]
fn schema_override_replaces_the_mutation_attribute() {
	let mut h = Harness::with_override(
		[element("div")
			.id("controller")
			.attr("data-controller", "aria")
			.attr("data-mutation", "hidden->aria#log")
			.attr("data-observe", "aria-busy->aria#log")
			.child(element("button").id("button"))],
		SchemaOverride::mutation_attribute("data-observe"),
	);
	let (controller, button) = (h.id("controller"), h.id("button"));

	h.set_attribute(button, "hidden", "");
	assert!(h.take_logged().is_empty());

	h.set_attribute(button, "aria-busy", "true");
	assert_eq!(
		h.take_logged(),
		vec![(controller, MutationRecord::attribute(button, "aria-busy", None))]
	);
}

#[test]
fn unusable_schemas_fail_to_install() {
	let overrides = SchemaOverride::from_toml(r#"target-attribute = "data-target""#).unwrap();
	let error = Harness::try_new(fixture(), Schema::default(), Some(overrides)).err();
	assert!(matches!(
		error,
		Some(RouterError::Config(ConfigError::MissingIdentifierPlaceholder(ref template))) if template == "data-target"
	));

	let overrides = SchemaOverride::from_toml(r#"mutation-attribute = "  ""#).unwrap();
	let error = Harness::try_new(fixture(), Schema::default(), Some(overrides)).err();
	assert!(matches!(
		error,
		Some(RouterError::Config(ConfigError::EmptyAttribute("mutation-attribute")))
	));

	assert!(matches!(SchemaOverride::from_toml("on-detach = \"forget\""), Err(ConfigError::Toml(_))));
	assert!(matches!(Schema::from_toml("unknown = 1"), Err(ConfigError::Toml(_))));
}

#[test]
fn document_and_window_scopes_observe_the_document_element() {
	let mut h = Harness::new([
		element("div")
			.id("controller")
			.attr("data-controller", "aria")
			.attr("data-mutation", "aria-busy@document->aria#log @window->aria#log:childList"),
		element("aside").id("outside"),
	]);
	let (controller, outside) = (h.id("controller"), h.id("outside"));
	let root = h.doc.document_element();

	let targets: Vec<_> = h.installation.router().registry().snapshots().into_iter().map(|route| route.target).collect();
	assert_eq!(targets, vec![root, root]);

	h.set_attribute(outside, "aria-busy", "true");
	assert_eq!(
		h.take_logged(),
		vec![(controller, MutationRecord::attribute(outside, "aria-busy", None))]
	);

	let paragraph = h.doc.create_element("p");
	h.doc.append_child(outside, paragraph).unwrap();
	h.pump();
	let logged = h.take_logged();
	assert_eq!(logged.len(), 1);
	assert_eq!(logged[0].0, controller);
	assert_eq!(logged[0].1.added_nodes, vec![paragraph]);
}

#[test]
fn pump_stops_at_the_batch_cap_and_resumes() {
	let siblings = (0..MAX_PUMP_BATCHES).map(|i| element("span").id(format!("span-{i}")).attr("data-mutation", "aria#log"));
	let mut h = Harness::new([element("div")
		.id("controller")
		.attr("data-controller", "aria")
		.children(siblings)]);
	let spans: Vec<_> = (0..MAX_PUMP_BATCHES).map(|i| h.id(&format!("span-{i}"))).collect();

	for span in &spans {
		h.doc.set_attribute(*span, "hidden", "").unwrap();
	}
	let report = h.pump();
	assert!(report.reached_batch_cap);
	assert_eq!(report.batches, MAX_PUMP_BATCHES);

	let rest = h.pump();
	assert!(!rest.reached_batch_cap);
	assert_eq!(rest.batches, 1);
	assert_eq!(report.invoked + rest.invoked, MAX_PUMP_BATCHES);
	assert_eq!(h.doc.pending_deliveries(), 0);
}

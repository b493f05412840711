use tripwire_descriptor::{MutationDescriptor, parse_descriptors};
use tripwire_host::{Delivery, DomTree, MutationRecord, NodeId, WatchId};

use crate::bubbling::Bubbled;
use crate::callback_watcher::{CallbackEvent, CallbackWatcher};
use crate::classify::RecordClass;
use crate::descriptor_watcher::{DescriptorEvent, DescriptorWatcher};
use crate::error::Result;
use crate::registry::ObserverKey;
use crate::{BubblingObserver, Command, ControllerRef, Invocation, ObserverRegistry, Schema};

const CALLBACK_WATCH: WatchId = WatchId::new(1);
const DESCRIPTOR_WATCH: WatchId = WatchId::new(2);
const FIRST_ROUTE_WATCH: u64 = 3;

/// Routes mutations to controller methods.
///
/// The router owns the descriptor watcher, the callback watcher and every route's bubbling
/// observer, but never talks to the host or to controllers itself. [`Router::start`],
/// [`Router::stop`] and [`Router::handle`] return the [`Command`]s to apply. Commands
/// produced while handling a batch are applied after it, so a route declared by a record
/// only observes mutations made after that batch.
pub struct Router {
	schema: Schema,
	root: NodeId,
	callbacks: CallbackWatcher,
	descriptors: DescriptorWatcher,
	registry: ObserverRegistry,
	next_watch: u64,
	started: bool,
}

impl Router {
	/// Creates a stopped router managing the subtree at `root`.
	pub fn new(schema: Schema, root: NodeId) -> Self {
		Self {
			callbacks: CallbackWatcher::new(CALLBACK_WATCH, root, &schema),
			descriptors: DescriptorWatcher::new(DESCRIPTOR_WATCH, root, schema.mutation_attribute.clone(), schema.on_detach),
			schema,
			root,
			registry: ObserverRegistry::new(),
			next_watch: FIRST_ROUTE_WATCH,
			started: false,
		}
	}

	pub fn schema(&self) -> &Schema {
		&self.schema
	}

	pub fn root(&self) -> NodeId {
		self.root
	}

	pub fn is_started(&self) -> bool {
		self.started
	}

	pub fn registry(&self) -> &ObserverRegistry {
		&self.registry
	}

	pub fn descriptor_watch(&self) -> WatchId {
		self.descriptors.watch()
	}

	pub fn callback_watch(&self) -> WatchId {
		self.callbacks.watch()
	}

	fn allocate_watch(&mut self) -> WatchId {
		let watch = WatchId::new(self.next_watch);
		self.next_watch += 1;
		watch
	}

	/// Starts the callback watcher, the descriptor watcher and every registered route, then
	/// declares routes for descriptors already in the tree. Starting twice does nothing.
	///
	/// On failure nothing is left marked as observing, so a later start emits every command
	/// again.
	pub fn start<T: DomTree>(&mut self, tree: &T) -> Result<Vec<Command>> {
		if self.started {
			return Ok(Vec::new());
		}
		match self.start_all(tree) {
			Ok(commands) => {
				self.started = true;
				tracing::debug!(root = %self.root, routes = self.registry.len(), "router.start");
				Ok(commands)
			}
			Err(error) => {
				self.halt();
				Err(error)
			}
		}
	}

	fn start_all<T: DomTree>(&mut self, tree: &T) -> Result<Vec<Command>> {
		let mut commands = Vec::new();
		commands.extend(self.callbacks.start()?);
		commands.extend(self.descriptors.start()?);
		for observer in self.registry.iter_mut() {
			commands.extend(observer.start()?);
		}
		self.declare_existing(tree, &mut commands)?;
		Ok(commands)
	}

	/// Stops every route, then the descriptor watcher, then the callback watcher. Routes stay
	/// registered and resume on the next start. Stopping twice does nothing.
	pub fn stop(&mut self) -> Vec<Command> {
		if !self.started {
			return Vec::new();
		}
		let commands = self.halt();
		self.started = false;
		tracing::debug!(root = %self.root, routes = self.registry.len(), "router.stop");
		commands
	}

	fn halt(&mut self) -> Vec<Command> {
		let mut commands: Vec<_> = self.registry.iter_mut().filter_map(BubblingObserver::stop).collect();
		commands.extend(self.descriptors.stop());
		commands.extend(self.callbacks.stop());
		commands
	}

	/// Reduces one delivered batch.
	///
	/// Deliveries for watches the router no longer owns, or that arrive while stopped, are
	/// ignored.
	///
	/// # Errors
	///
	/// Fails only when a route cannot be started for a reason other than invalid options.
	pub fn handle<T: DomTree>(&mut self, tree: &T, delivery: &Delivery) -> Result<Vec<Command>> {
		let mut commands = Vec::new();
		if !self.started {
			tracing::trace!(watch = %delivery.watch, "router.delivery.stopped");
			return Ok(commands);
		}

		let watch = delivery.watch;
		if watch == self.descriptors.watch() {
			for event in self.descriptors.events(tree, &delivery.records) {
				self.apply_descriptor_event(tree, event, &mut commands)?;
			}
		} else if watch == self.callbacks.watch() {
			for event in self.callbacks.events(tree, &delivery.records) {
				commands.push(Command::Invoke(callback_invocation(tree, event)));
			}
		} else if let Some(key) = self.registry.by_watch(watch) {
			commands.extend(self.route_invocations(tree, key, &delivery.records).into_iter().map(Command::Invoke));
		} else {
			tracing::trace!(watch = %watch, "router.delivery.stale");
		}
		Ok(commands)
	}

	/// Marks the route owning `watch` as rejected after the host refused its options.
	pub fn reject(&mut self, watch: WatchId, reason: impl Into<String>) {
		if let Some(key) = self.registry.by_watch(watch)
			&& let Some(observer) = self.registry.get_mut(key)
		{
			observer.reject(reason);
		}
	}

	fn apply_descriptor_event<T: DomTree>(&mut self, tree: &T, event: DescriptorEvent, commands: &mut Vec<Command>) -> Result<()> {
		match event {
			DescriptorEvent::Changed { element, new, old } => {
				self.undefine(tree, element, old, commands);
				self.define(tree, element, new, commands)
			}
			DescriptorEvent::Added { element, descriptors } => {
				self.forget(element, commands);
				self.define(tree, element, descriptors, commands)
			}
			DescriptorEvent::Removed { element, descriptors } => {
				self.forget(element, commands);
				self.undefine(tree, element, descriptors, commands);
				Ok(())
			}
		}
	}

	fn declare_existing<T: DomTree>(&mut self, tree: &T, commands: &mut Vec<Command>) -> Result<()> {
		let attribute = self.schema.mutation_attribute.as_str();
		let declaring: Vec<NodeId> = std::iter::once(self.root)
			.chain(tree.descendants(self.root))
			.filter(|node| tree.has_attribute(*node, attribute))
			.collect();
		for element in declaring {
			for descriptor in parse_descriptors(tree.attribute(element, &self.schema.mutation_attribute)) {
				if !descriptor.is_routable() {
					continue;
				}
				let target = descriptor.resolve_target(tree, element);
				if !self.registry.contains(target, &descriptor.cache_key()) {
					self.declare(element, target, descriptor, commands)?;
				}
			}
		}
		Ok(())
	}

	fn define<T: DomTree>(&mut self, tree: &T, element: NodeId, descriptors: Vec<MutationDescriptor>, commands: &mut Vec<Command>) -> Result<()> {
		for descriptor in descriptors {
			if !descriptor.is_routable() {
				tracing::trace!(declaration = %descriptor.declaration, element = %element, "router.route.unroutable");
				continue;
			}
			let target = descriptor.resolve_target(tree, element);
			self.declare(element, target, descriptor, commands)?;
		}
		Ok(())
	}

	/// Registers a route, stopping any route it replaces before starting the new one.
	fn declare(&mut self, element: NodeId, target: NodeId, descriptor: MutationDescriptor, commands: &mut Vec<Command>) -> Result<()> {
		let watch = self.allocate_watch();
		let (key, replaced) = self.registry.insert(BubblingObserver::new(watch, element, target, descriptor));
		if let Some(mut replaced) = replaced {
			commands.extend(replaced.stop());
		}
		if let Some(observer) = self.registry.get_mut(key) {
			commands.extend(observer.start()?);
			tracing::debug!(
				element = %element,
				target = %target,
				key = %observer.key(),
				watch = %watch,
				"router.route.define",
			);
		}
		Ok(())
	}

	fn undefine<T: DomTree>(&mut self, tree: &T, element: NodeId, descriptors: Vec<MutationDescriptor>, commands: &mut Vec<Command>) {
		for descriptor in descriptors {
			if !descriptor.is_routable() {
				continue;
			}
			let target = descriptor.resolve_target(tree, element);
			if let Some(mut observer) = self.registry.remove(target, &descriptor.cache_key()) {
				commands.extend(observer.stop());
				tracing::debug!(element = %element, target = %target, key = %observer.key(), "router.route.undefine");
			}
		}
	}

	/// Tears down every route `element` declared, including those scoped to the document.
	fn forget(&mut self, element: NodeId, commands: &mut Vec<Command>) {
		for mut observer in self.registry.remove_declared_by(element) {
			commands.extend(observer.stop());
		}
	}

	fn route_invocations<T: DomTree>(&self, tree: &T, key: ObserverKey, records: &[MutationRecord]) -> Vec<Invocation> {
		let Some(observer) = self.registry.get(key) else {
			return Vec::new();
		};
		observer
			.bubble(tree, records)
			.into_iter()
			.filter_map(|bubbled| self.route(tree, bubbled))
			.collect()
	}

	/// Resolves the controller for a bubbled record. Records changing the mutation attribute
	/// are never routed.
	fn route<T: DomTree>(&self, tree: &T, bubbled: Bubbled<'_>) -> Option<Invocation> {
		if bubbled.class == RecordClass::Attribute
			&& bubbled.record.attribute_name.as_deref() == Some(self.schema.mutation_attribute.as_str())
		{
			return None;
		}
		let identifier = bubbled.descriptor.identifier.as_deref()?;
		let method_name = bubbled.descriptor.method_name.as_deref()?;
		let Some(element) = tree.closest_with_token(bubbled.element, &self.schema.controller_attribute, identifier) else {
			tracing::trace!(element = %bubbled.element, identifier, "router.route.no_controller_element");
			return None;
		};
		Some(Invocation::Method {
			controller: ControllerRef {
				element,
				identifier: identifier.to_string(),
			},
			method_name: method_name.to_string(),
			record: bubbled.record.clone(),
		})
	}
}

/// Reads the current value of the changed attribute.
fn callback_invocation<T: DomTree>(tree: &T, event: CallbackEvent) -> Invocation {
	match event {
		CallbackEvent::OnController {
			controller,
			attribute_name,
			old_value,
		} => {
			let new_value = tree.attribute(controller.element, &attribute_name).map(str::to_string);
			Invocation::AttributeChanged {
				controller,
				attribute_name,
				new_value,
				old_value,
			}
		}
		CallbackEvent::OnTarget {
			controller,
			target,
			target_name,
			attribute_name,
			old_value,
		} => {
			let new_value = tree.attribute(target, &attribute_name).map(str::to_string);
			Invocation::TargetAttributeChanged {
				controller,
				target,
				target_name,
				attribute_name,
				new_value,
				old_value,
			}
		}
	}
}

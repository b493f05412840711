//! Active routes, keyed by observed target and cache key.

use rustc_hash::FxHashMap;
use slab::Slab;
use tripwire_descriptor::CacheKey;
use tripwire_host::{NodeId, WatchId};

use crate::{BubblingObserver, ObserverState};

/// Stable handle to a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverKey(usize);

/// Snapshot of one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSnapshot {
	pub target: NodeId,
	pub key: CacheKey,
	pub element: NodeId,
	pub watch: WatchId,
	pub declaration: String,
	pub state: ObserverState,
}

/// Arena of bubbling observers with a `(target, cache key)` index.
///
/// At most one observer exists per `(target, cache key)`, and no target or declaring
/// element is indexed without at least one observer.
#[derive(Debug, Default)]
pub struct ObserverRegistry {
	observers: Slab<BubblingObserver>,
	routes: FxHashMap<NodeId, FxHashMap<CacheKey, ObserverKey>>,
	declared: FxHashMap<NodeId, Vec<ObserverKey>>,
	watches: FxHashMap<WatchId, ObserverKey>,
}

impl ObserverRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `observer` under its target and key, returning the observer it replaces.
	pub fn insert(&mut self, observer: BubblingObserver) -> (ObserverKey, Option<BubblingObserver>) {
		let target = observer.target();
		let cache_key = observer.key().clone();
		let replaced = self.remove(target, &cache_key);

		let watch = observer.watch();
		let element = observer.element();
		let key = ObserverKey(self.observers.insert(observer));
		self.watches.insert(watch, key);
		self.declared.entry(element).or_default().push(key);
		self.routes.entry(target).or_default().insert(cache_key, key);
		(key, replaced)
	}

	/// Removes the observer for `(target, cache_key)`, dropping the target's entry once it
	/// has no routes left.
	pub fn remove(&mut self, target: NodeId, cache_key: &CacheKey) -> Option<BubblingObserver> {
		let routes = self.routes.get_mut(&target)?;
		let key = routes.remove(cache_key);
		if routes.is_empty() {
			self.routes.remove(&target);
		}
		self.release(key?)
	}

	/// Removes every observer targeting `target`.
	pub fn remove_target(&mut self, target: NodeId) -> Vec<BubblingObserver> {
		let Some(routes) = self.routes.remove(&target) else {
			return Vec::new();
		};
		let mut keys: Vec<_> = routes.into_iter().collect();
		keys.sort_by(|a, b| a.0.cmp(&b.0));
		keys.into_iter().filter_map(|(_, key)| self.release(key)).collect()
	}

	/// Removes every observer declared by `element`, whatever it targets.
	pub fn remove_declared_by(&mut self, element: NodeId) -> Vec<BubblingObserver> {
		let Some(mut keys) = self.declared.remove(&element) else {
			return Vec::new();
		};
		keys.sort_by_key(|key| key.0);
		let mut removed = Vec::with_capacity(keys.len());
		for key in keys {
			let Some(observer) = self.observers.get(key.0) else {
				continue;
			};
			let (target, cache_key) = (observer.target(), observer.key().clone());
			removed.extend(self.remove(target, &cache_key));
		}
		removed
	}

	fn release(&mut self, key: ObserverKey) -> Option<BubblingObserver> {
		let observer = self.observers.try_remove(key.0)?;
		self.watches.remove(&observer.watch());
		if let Some(keys) = self.declared.get_mut(&observer.element()) {
			keys.retain(|declared| *declared != key);
			if keys.is_empty() {
				self.declared.remove(&observer.element());
			}
		}
		Some(observer)
	}

	pub fn contains(&self, target: NodeId, cache_key: &CacheKey) -> bool {
		self.routes.get(&target).is_some_and(|routes| routes.contains_key(cache_key))
	}

	pub fn lookup(&self, target: NodeId, cache_key: &CacheKey) -> Option<ObserverKey> {
		self.routes.get(&target)?.get(cache_key).copied()
	}

	pub fn get(&self, key: ObserverKey) -> Option<&BubblingObserver> {
		self.observers.get(key.0)
	}

	pub fn get_mut(&mut self, key: ObserverKey) -> Option<&mut BubblingObserver> {
		self.observers.get_mut(key.0)
	}

	/// Observer owning `watch`, if it is still registered.
	pub fn by_watch(&self, watch: WatchId) -> Option<ObserverKey> {
		self.watches.get(&watch).copied()
	}

	/// Cache keys routed at `target`, sorted.
	pub fn keys_for(&self, target: NodeId) -> Vec<&CacheKey> {
		let mut keys: Vec<_> = self.routes.get(&target).map(|routes| routes.keys().collect()).unwrap_or_default();
		keys.sort();
		keys
	}

	/// Number of indexed targets. Never counts a target without routes.
	pub fn target_count(&self) -> usize {
		self.routes.len()
	}

	/// Number of elements with at least one declared route.
	pub fn declaring_count(&self) -> usize {
		self.declared.len()
	}

	pub fn len(&self) -> usize {
		self.observers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.observers.is_empty()
	}

	pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BubblingObserver> {
		self.observers.iter_mut().map(|(_, observer)| observer)
	}

	/// Returns snapshots sorted by target, then key.
	pub fn snapshots(&self) -> Vec<RouteSnapshot> {
		let mut snapshots: Vec<_> = self
			.observers
			.iter()
			.map(|(_, observer)| RouteSnapshot {
				target: observer.target(),
				key: observer.key().clone(),
				element: observer.element(),
				watch: observer.watch(),
				declaration: observer.descriptor().declaration.clone(),
				state: observer.state().clone(),
			})
			.collect();
		snapshots.sort_by(|a, b| (a.target, &a.key).cmp(&(b.target, &b.key)));
		snapshots
	}
}

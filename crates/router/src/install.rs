//! Wiring a router to a running host application.

use tripwire_host::{NodeId, ObserverHost};

use crate::error::Result;
use crate::{Command, Controller, ControllerResolver, Controllers, DispatchOutcome, Router, Schema, SchemaOverride, WatchRole, dispatch};

/// Upper bound on batches drained by one [`Installation::pump`].
pub const MAX_PUMP_BATCHES: usize = 4096;

/// The host framework's application: a managed root element, its schema and its live
/// controllers.
pub trait HostApplication: ControllerResolver {
	fn element(&self) -> NodeId;

	fn schema(&self) -> &Schema;
}

/// Minimal [`HostApplication`] backed by [`Controllers`].
pub struct Application {
	element: NodeId,
	schema: Schema,
	controllers: Controllers,
}

impl Application {
	pub fn new(element: NodeId) -> Self {
		Self::with_schema(element, Schema::default())
	}

	pub fn with_schema(element: NodeId, schema: Schema) -> Self {
		Self {
			element,
			schema,
			controllers: Controllers::new(),
		}
	}

	pub fn controllers(&self) -> &Controllers {
		&self.controllers
	}

	pub fn controllers_mut(&mut self) -> &mut Controllers {
		&mut self.controllers
	}
}

impl ControllerResolver for Application {
	fn controller_for(&mut self, element: NodeId, identifier: &str) -> Option<&mut dyn Controller> {
		self.controllers.controller_for(element, identifier)
	}
}

impl HostApplication for Application {
	fn element(&self) -> NodeId {
		self.element
	}

	fn schema(&self) -> &Schema {
		&self.schema
	}
}

/// What one [`Installation::pump`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
	/// Batches taken from the host.
	pub batches: usize,
	/// Controller callbacks that ran.
	pub invoked: usize,
	/// Invocations without a controller or capability.
	pub missed: usize,
	/// Routes whose options the host refused.
	pub rejected: usize,
	/// The pump stopped at [`MAX_PUMP_BATCHES`] with work possibly left.
	pub reached_batch_cap: bool,
}

/// A router installed on a host application.
pub struct Installation {
	router: Router,
}

/// Installs a router on `application`, layering `schema_override` over its schema, and
/// starts it.
///
/// # Errors
///
/// Returns [`RouterError::Config`](crate::RouterError::Config) for an unusable schema and
/// [`RouterError::Observe`](crate::RouterError::Observe) when the host cannot observe.
pub fn install<H, A>(host: &mut H, application: &mut A, schema_override: Option<SchemaOverride>) -> Result<Installation>
where
	H: ObserverHost,
	A: HostApplication,
{
	let mut schema = application.schema().clone();
	if let Some(overrides) = schema_override {
		schema = schema.merged(overrides);
	}
	schema.check()?;

	let mut installation = Installation {
		router: Router::new(schema, application.element()),
	};
	installation.start(host, application)?;
	Ok(installation)
}

impl Installation {
	pub fn router(&self) -> &Router {
		&self.router
	}

	/// Starts the router. When the host refuses a watcher, whatever was already observed is
	/// disconnected and the router is left stopped.
	pub fn start<H: ObserverHost, A: HostApplication>(&mut self, host: &mut H, application: &mut A) -> Result<()> {
		let commands = self.router.start(&*host)?;
		let applied = self.apply(host, application, commands, &mut PumpReport::default());
		if let Err(error) = applied {
			tracing::debug!(%error, "router.start.failed");
			for command in self.router.stop() {
				if let Command::Disconnect { watch } = command {
					host.disconnect(watch);
				}
			}
			return Err(error);
		}
		Ok(())
	}

	pub fn stop<H: ObserverHost, A: HostApplication>(&mut self, host: &mut H, application: &mut A) -> Result<()> {
		let commands = self.router.stop();
		self.apply(host, application, commands, &mut PumpReport::default())
	}

	/// Stops the router and releases it.
	pub fn uninstall<H: ObserverHost, A: HostApplication>(mut self, host: &mut H, application: &mut A) -> Result<()> {
		self.stop(host, application)
	}

	/// Drains pending host deliveries in notification order.
	///
	/// Each batch is reduced and its commands applied before the next batch is taken, so
	/// observers started while handling a batch see only later mutations.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Observe`](crate::RouterError::Observe) on a fatal host failure.
	pub fn pump<H: ObserverHost, A: HostApplication>(&mut self, host: &mut H, application: &mut A) -> Result<PumpReport> {
		let mut report = PumpReport::default();
		for batch_idx in 0..MAX_PUMP_BATCHES {
			let Some(delivery) = host.take_delivery() else {
				return Ok(report);
			};
			let _batch_span = tracing::trace_span!(
				"router.batch",
				router.batch_idx = batch_idx,
				watch = %delivery.watch,
				records = delivery.records.len(),
			)
			.entered();
			report.batches += 1;
			let commands = self.router.handle(&*host, &delivery)?;
			self.apply(host, application, commands, &mut report)?;
		}
		report.reached_batch_cap = true;
		tracing::warn!(batches = report.batches, "router.pump.batch_cap");
		Ok(report)
	}

	fn apply<H: ObserverHost, A: HostApplication>(&mut self, host: &mut H, application: &mut A, commands: Vec<Command>, report: &mut PumpReport) -> Result<()> {
		for command in commands {
			match command {
				Command::Observe { watch, target, init, role } => match host.observe(watch, target, &init) {
					Ok(()) => {}
					Err(error) if role == WatchRole::Route && error.is_invalid_options() => {
						tracing::debug!(watch = %watch, target = %target, %error, "router.route.refused");
						self.router.reject(watch, error.to_string());
						report.rejected += 1;
					}
					Err(error) => return Err(error.into()),
				},
				Command::Disconnect { watch } => host.disconnect(watch),
				Command::Invoke(invocation) => match dispatch(&mut *application, &invocation) {
					DispatchOutcome::Invoked => report.invoked += 1,
					DispatchOutcome::NoController | DispatchOutcome::Unsupported => report.missed += 1,
				},
			}
		}
		Ok(())
	}
}

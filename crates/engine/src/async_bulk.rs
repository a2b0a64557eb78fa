// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Cancellable bulk operations for async callers.
//!
//! Every step runs on the blocking pool while holding the connection
//! lock. Cancellation is observed between steps, between transfer batches
//! and, through SQLite's progress handler, inside a running statement.
//! The staging table is dropped after the last step whatever the outcome,
//! including when the caller drops the future mid-operation.

use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;
use sqlbulk_catalog::Catalog;
use sqlbulk_type::{Result, Step, Verb, error, error::BulkError};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::{
	BulkConfig,
	interrupt::Interrupt,
	mapping::MappingPlan,
	operation::{self, Prepared},
	request::BulkRequest,
	source::RowSource,
	staging::{self, StagingDef},
};

pub type SharedConnection = Arc<Mutex<Connection>>;

#[derive(Clone)]
pub struct AsyncBulk {
	conn: SharedConnection,
	catalog: Catalog,
}

impl AsyncBulk {
	pub fn new(conn: SharedConnection, catalog: Catalog) -> Self {
		Self {
			conn,
			catalog,
		}
	}

	pub fn connection(&self) -> &SharedConnection {
		&self.conn
	}

	/// Run `request`, giving up as soon as `cancel` fires.
	#[instrument(
		name = "bulk::async_operation",
		level = "debug",
		skip_all,
		fields(verb = %request.verb, destination = %request.destination)
	)]
	pub async fn execute(&self, request: BulkRequest<'static>, cancel: CancellationToken) -> Result<usize> {
		let Prepared {
			verb,
			destination,
			source,
			mapping,
			qualifiers,
			config,
		} = operation::validate(request)?;
		let name = destination.to_string();
		let interrupt = Interrupt::new(config.timeout);

		let (plan, source, config) = {
			let catalog = self.catalog.clone();
			self.step(Step::ResolveMapping, &name, &interrupt, &cancel, move |conn| {
				let prepared = Prepared {
					verb,
					destination,
					source,
					mapping,
					qualifiers,
					config,
				};
				let plan = operation::resolve(conn, &catalog, &prepared)?;
				Ok((plan, prepared.source, prepared.config))
			})
			.await?
		};
		let plan = Arc::new(plan);
		let config = Arc::new(config);

		if !verb.is_staged() {
			let task_interrupt = interrupt.clone();
			return self
				.step(Step::Transfer, &name, &interrupt, &cancel, move |conn| {
					operation::insert_direct(conn, &plan, source, &config, &task_interrupt)
				})
				.await;
		}

		let def = Arc::new(StagingDef::new(&plan, verb, &config));
		let teardown = Teardown {
			conn: self.conn.clone(),
			def: def.clone(),
			interrupt: interrupt.clone(),
			armed: true,
		};
		let result = self.staged(&name, verb, plan, def, source, config, &interrupt, &cancel).await;
		teardown.release().await;

		if let Ok(affected) = result {
			debug!(affected, "bulk operation complete");
		}
		result
	}

	#[allow(clippy::too_many_arguments)]
	async fn staged(
		&self,
		name: &str,
		verb: Verb,
		plan: Arc<MappingPlan>,
		def: Arc<StagingDef>,
		source: RowSource<'static>,
		config: Arc<BulkConfig>,
		interrupt: &Interrupt,
		cancel: &CancellationToken,
	) -> Result<usize> {
		{
			let (def, destination) = (def.clone(), name.to_string());
			self.step(Step::AcquireStaging, name, interrupt, cancel, move |conn| {
				staging::create(conn, &def, &destination)
			})
			.await?;
		}

		let staged = {
			let (plan, def, config, task_interrupt) = (plan.clone(), def.clone(), config.clone(), interrupt.clone());
			self.step(Step::Transfer, name, interrupt, cancel, move |conn| {
				operation::stage_rows(conn, &plan, &def, source, &config, &task_interrupt)
			})
			.await?
		};
		if staged == 0 {
			return Ok(0);
		}

		{
			let (def, destination) = (def.clone(), name.to_string());
			self.step(Step::IndexStaging, name, interrupt, cancel, move |conn| {
				staging::index(conn, &def, &destination)
			})
			.await?;
		}

		let task_interrupt = interrupt.clone();
		self.step(Step::Execute, name, interrupt, cancel, move |conn| {
			operation::apply(conn, verb, &plan, &def, &config, &task_interrupt)
		})
		.await
	}

	/// Run one step on the blocking pool, racing it against `cancel`.
	/// A cancelled step is waited for, so the connection is idle once this
	/// returns.
	async fn step<T, F>(
		&self,
		step: Step,
		destination: &str,
		interrupt: &Interrupt,
		cancel: &CancellationToken,
		f: F,
	) -> Result<T>
	where
		F: FnOnce(&Connection) -> Result<T> + Send + 'static,
		T: Send + 'static,
	{
		let cancelled = || {
			error!(BulkError::Cancelled {
				destination: destination.to_string(),
				step,
			})
		};

		if cancel.is_cancelled() || interrupt.is_cancelled() {
			interrupt.cancel();
			return Err(cancelled());
		}

		let conn = self.conn.clone();
		let task_interrupt = interrupt.clone();
		let task_destination = destination.to_string();
		let mut task = tokio::task::spawn_blocking(move || {
			let conn = conn.lock();
			// a dropped operation may already have released staging
			if task_interrupt.is_cancelled() {
				return Err(error!(BulkError::Cancelled {
					destination: task_destination,
					step,
				}));
			}
			f(&conn)
		});

		tokio::select! {
			joined = &mut task => joined.unwrap_or_else(|err| Err(join_failed(err, cancelled))),
			_ = cancel.cancelled() => {
				interrupt.cancel();
				debug!(%step, "cancellation requested");
				match task.await {
					// finished before the interrupt was observed
					Ok(Ok(value)) => Ok(value),
					Ok(Err(_)) => Err(cancelled()),
					Err(err) => Err(join_failed(err, cancelled)),
				}
			}
		}
	}
}

/// Drops the staging table of an operation whose future may be dropped
/// before it completes. Dropping an armed teardown cancels the running
/// step and releases staging once the connection is free again.
struct Teardown {
	conn: SharedConnection,
	def: Arc<StagingDef>,
	interrupt: Interrupt,
	armed: bool,
}

impl Teardown {
	async fn release(mut self) {
		self.armed = false;
		let (conn, def) = (self.conn.clone(), self.def.clone());
		if let Err(err) = tokio::task::spawn_blocking(move || staging::release(&*conn.lock(), &def)).await {
			warn!(error = %err, "staging release task failed");
		}
	}
}

impl Drop for Teardown {
	fn drop(&mut self) {
		if !self.armed {
			return;
		}
		self.interrupt.cancel();
		debug!(staging = %self.def.table_name(), "operation dropped, releasing staging");

		let (conn, def) = (self.conn.clone(), self.def.clone());
		let release = move || {
			staging::release(&*conn.lock(), &def);
		};
		match tokio::runtime::Handle::try_current() {
			Ok(handle) => {
				handle.spawn_blocking(release);
			}
			Err(_) => {
				std::thread::spawn(release);
			}
		}
	}
}

fn join_failed(err: JoinError, cancelled: impl FnOnce() -> sqlbulk_type::Error) -> sqlbulk_type::Error {
	if err.is_panic() {
		std::panic::resume_unwind(err.into_panic());
	}
	cancelled()
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The bulk pipeline.
//!
//! validate -> resolve mapping -> acquire staging -> transfer -> index
//! staging -> execute -> release staging. Insert skips staging and
//! transfers straight into the destination. Staging is released on every
//! exit path once it may exist.

use rusqlite::Connection;
use sqlbulk_catalog::Catalog;
use sqlbulk_type::{Result, Step, TableName, Verb, error::BulkError, return_error};
use tracing::{debug, instrument};

use crate::{
	BulkConfig,
	interrupt::Interrupt,
	mapping::{self, FieldMap, MappingPlan},
	request::BulkRequest,
	set_operation,
	source::RowSource,
	staging::{self, StagingDef, StagingGuard},
	transfer::{self, TransferTarget},
};

/// A request that passed validation.
#[derive(Debug)]
pub(crate) struct Prepared<'a> {
	pub verb: Verb,
	pub destination: TableName,
	pub source: RowSource<'a>,
	pub mapping: Option<Vec<FieldMap>>,
	pub qualifiers: Option<Vec<String>>,
	pub config: BulkConfig,
}

/// Checks that need no I/O.
pub(crate) fn validate(request: BulkRequest<'_>) -> Result<Prepared<'_>> {
	let BulkRequest {
		verb,
		destination,
		source,
		mapping,
		qualifiers,
		config,
	} = request;

	let destination = match (&source, destination.is_empty()) {
		(Some(source), true) => source.bound_table().map(TableName::parse).unwrap_or(destination),
		_ => destination,
	};

	let Some(source) = source else {
		return_error!(BulkError::NullSource {
			destination: destination.to_string(),
		});
	};

	if destination.is_empty() {
		return_error!(BulkError::TableNameMissing);
	}

	if matches!(source, RowSource::Keys(_)) && verb != Verb::Delete {
		return_error!(BulkError::UnsupportedSource {
			destination: destination.to_string(),
			verb,
			shape: source.shape(),
			reason: "bare keys identify rows to delete, they carry no values to write".to_string(),
		});
	}

	Ok(Prepared {
		verb,
		destination,
		source,
		mapping,
		qualifiers,
		config,
	})
}

/// Resolve the destination and build the mapping plan.
pub(crate) fn resolve(conn: &Connection, catalog: &Catalog, prepared: &Prepared<'_>) -> Result<MappingPlan> {
	let table = match catalog.find(conn, &prepared.destination)? {
		Some(table) => table,
		None if prepared.source.is_typed() => {
			return_error!(BulkError::TableNotFound {
				destination: prepared.destination.to_string(),
			})
		}
		None => {
			return_error!(BulkError::MissingFields {
				destination: prepared.destination.to_string(),
				source_fields: prepared.source.declared_fields(),
			})
		}
	};

	let schema = prepared.source.schema(prepared.verb, &table)?;
	mapping::plan(
		prepared.verb,
		table,
		&schema,
		prepared.mapping.as_deref(),
		prepared.qualifiers.as_deref(),
		&prepared.config,
	)
}

/// Transfer straight into the destination.
pub(crate) fn insert_direct(
	conn: &Connection,
	plan: &MappingPlan,
	source: RowSource<'_>,
	config: &BulkConfig,
	interrupt: &Interrupt,
) -> Result<usize> {
	let destination = plan.destination();
	let target = TransferTarget::new(plan.table.table_name().quoted(), plan.mapping.iter(), plan.width);
	let deadline = interrupt.begin(Step::Transfer, &destination);
	transfer::transfer(conn, &target, source.into_rows(config.row_state), config, &deadline, &destination)
}

/// Transfer into the staging table.
pub(crate) fn stage_rows(
	conn: &Connection,
	plan: &MappingPlan,
	staging: &StagingDef,
	source: RowSource<'_>,
	config: &BulkConfig,
	interrupt: &Interrupt,
) -> Result<usize> {
	let destination = plan.destination();
	let target = TransferTarget::new(staging.quoted(), plan.staged.iter(), plan.width);
	let deadline = interrupt.begin(Step::Transfer, &destination);
	transfer::transfer(conn, &target, source.into_rows(config.row_state), config, &deadline, &destination)
}

pub(crate) fn apply(
	conn: &Connection,
	verb: Verb,
	plan: &MappingPlan,
	staging: &StagingDef,
	config: &BulkConfig,
	interrupt: &Interrupt,
) -> Result<usize> {
	let deadline = interrupt.begin(Step::Execute, &plan.destination());
	set_operation::execute(conn, verb, plan, staging, config.keep_identity, &deadline)
}

/// Runs bulk operations on a borrowed connection.
///
/// The connection may be inside a caller's transaction, every step only
/// uses savepoints.
pub struct Bulk<'c> {
	conn: &'c Connection,
	catalog: &'c Catalog,
}

impl<'c> Bulk<'c> {
	pub fn new(conn: &'c Connection, catalog: &'c Catalog) -> Self {
		Self {
			conn,
			catalog,
		}
	}

	#[instrument(
		name = "bulk::operation",
		level = "debug",
		skip_all,
		fields(verb = %request.verb, destination = %request.destination)
	)]
	pub fn execute(&self, request: BulkRequest<'_>) -> Result<usize> {
		let prepared = validate(request)?;
		let interrupt = Interrupt::new(prepared.config.timeout);
		let plan = resolve(self.conn, self.catalog, &prepared)?;

		let Prepared {
			verb,
			source,
			config,
			..
		} = prepared;

		if !verb.is_staged() {
			let affected = insert_direct(self.conn, &plan, source, &config, &interrupt)?;
			debug!(affected, "bulk insert complete");
			return Ok(affected);
		}

		let destination = plan.destination();
		let guard = StagingGuard::new(self.conn, StagingDef::new(&plan, verb, &config));
		let def = guard.def();

		staging::create(self.conn, def, &destination)?;
		let staged = stage_rows(self.conn, &plan, def, source, &config, &interrupt)?;
		if staged == 0 {
			debug!("empty source, nothing to apply");
			return Ok(0);
		}
		staging::index(self.conn, def, &destination)?;
		let affected = apply(self.conn, verb, &plan, def, &config, &interrupt)?;

		debug!(staged, affected, "bulk operation complete");
		Ok(affected)
	}

	pub fn insert(&self, destination: impl Into<TableName>, source: RowSource<'_>) -> Result<usize> {
		self.execute(BulkRequest::insert(destination).source(source))
	}

	pub fn update(&self, destination: impl Into<TableName>, source: RowSource<'_>) -> Result<usize> {
		self.execute(BulkRequest::update(destination).source(source))
	}

	pub fn delete(&self, destination: impl Into<TableName>, source: RowSource<'_>) -> Result<usize> {
		self.execute(BulkRequest::delete(destination).source(source))
	}

	pub fn merge(&self, destination: impl Into<TableName>, source: RowSource<'_>) -> Result<usize> {
		self.execute(BulkRequest::merge(destination).source(source))
	}

	pub fn merge_delete(&self, destination: impl Into<TableName>, source: RowSource<'_>) -> Result<usize> {
		self.execute(BulkRequest::merge_delete(destination).source(source))
	}
}

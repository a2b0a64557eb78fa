// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Staging tables.
//!
//! A staging table mirrors the declared types of the staged destination
//! columns without any of their constraints. Session staging lives in
//! the connection-private `temp` schema and disappears with the
//! connection, physical staging is an ordinary table next to the
//! destination and must always be dropped explicitly.

use rusqlite::Connection;
use sqlbulk_type::{Result, Step, TableName, Verb, error, error::BulkError, quote_identifier};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{BulkConfig, mapping::MappingPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingMode {
	Session,
	Physical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedColumn {
	pub name: String,
	pub declared_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingDef {
	pub schema: String,
	pub name: String,
	pub mode: StagingMode,
	pub columns: Vec<StagedColumn>,
	/// Columns the staging index covers.
	pub qualifiers: Vec<String>,
}

impl StagingDef {
	/// Describe a fresh, uniquely named staging table for `plan`.
	pub fn new(plan: &MappingPlan, verb: Verb, config: &BulkConfig) -> Self {
		let mode = if config.use_physical_staging {
			StagingMode::Physical
		} else {
			StagingMode::Session
		};
		let schema = match mode {
			StagingMode::Session => "temp".to_string(),
			StagingMode::Physical => plan.table.schema.clone(),
		};
		let columns = plan
			.staged
			.iter()
			.map(|field| StagedColumn {
				name: field.column.clone(),
				declared_type: plan
					.table
					.column(&field.column)
					.map(|column| column.declared_type.clone())
					.unwrap_or_default(),
			})
			.collect();

		Self {
			schema,
			name: format!("{}{}_{}", config.staging_prefix, verb.tag(), Uuid::new_v4().simple()),
			mode,
			columns,
			qualifiers: plan.qualifiers.clone(),
		}
	}

	pub fn table_name(&self) -> TableName {
		TableName::with_schema(self.schema.clone(), self.name.clone())
	}

	pub fn quoted(&self) -> String {
		self.table_name().quoted()
	}

	fn create_sql(&self) -> String {
		let columns: Vec<String> = self
			.columns
			.iter()
			.map(|column| {
				if column.declared_type.is_empty() {
					quote_identifier(&column.name)
				} else {
					format!("{} {}", quote_identifier(&column.name), column.declared_type)
				}
			})
			.collect();
		format!("CREATE TABLE {} ({})", self.quoted(), columns.join(", "))
	}

	fn index_sql(&self) -> Option<String> {
		if self.qualifiers.is_empty() {
			return None;
		}
		let columns: Vec<String> = self.qualifiers.iter().map(|q| quote_identifier(q)).collect();
		Some(format!(
			"CREATE INDEX {}.{} ON {} ({})",
			quote_identifier(&self.schema),
			quote_identifier(&format!("{}_ix", self.name)),
			quote_identifier(&self.name),
			columns.join(", ")
		))
	}
}

/// Create the staging table.
#[instrument(name = "bulk::staging::create", level = "debug", skip_all, fields(staging = %def.name, mode = ?def.mode))]
pub fn create(conn: &Connection, def: &StagingDef, destination: &str) -> Result<()> {
	conn.execute_batch(&def.create_sql()).map_err(|err| {
		error!(BulkError::StagingCreationFailed {
			destination: destination.to_string(),
			staging: def.table_name().to_string(),
			step: Step::AcquireStaging,
			cause: sqlbulk_type::error::diagnostic::sqlite::from_rusqlite_error(&err),
		})
	})?;
	debug!(columns = def.columns.len(), "staging table created");
	Ok(())
}

/// Index the qualifier columns once the rows are in.
#[instrument(name = "bulk::staging::index", level = "debug", skip_all, fields(staging = %def.name))]
pub fn index(conn: &Connection, def: &StagingDef, destination: &str) -> Result<()> {
	let Some(sql) = def.index_sql() else {
		return Ok(());
	};
	conn.execute_batch(&sql).map_err(|err| {
		error!(BulkError::StagingCreationFailed {
			destination: destination.to_string(),
			staging: def.table_name().to_string(),
			step: Step::IndexStaging,
			cause: sqlbulk_type::error::diagnostic::sqlite::from_rusqlite_error(&err),
		})
	})
}

/// Drop the staging table. Never fails, a missing table is not an error
/// and a failed drop is only logged.
#[instrument(name = "bulk::staging::release", level = "debug", skip_all, fields(staging = %def.name))]
pub fn release(conn: &Connection, def: &StagingDef) -> bool {
	match conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", def.quoted())) {
		Ok(()) => true,
		Err(err) => {
			warn!(staging = %def.table_name(), error = %err, "failed to drop staging table");
			false
		}
	}
}

/// Drops the staging table when it goes out of scope.
pub struct StagingGuard<'c> {
	conn: &'c Connection,
	def: StagingDef,
}

impl<'c> StagingGuard<'c> {
	pub fn new(conn: &'c Connection, def: StagingDef) -> Self {
		Self {
			conn,
			def,
		}
	}

	pub fn def(&self) -> &StagingDef {
		&self.def
	}
}

impl Drop for StagingGuard<'_> {
	fn drop(&mut self) {
		release(self.conn, &self.def);
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use rusqlite::Connection;
use sqlbulk_type::{
	Result, TableName,
	error::{BulkError, diagnostic::sqlite::from_rusqlite_error},
	return_error,
};
use tracing::{debug, instrument};

use crate::{reader::read_table, table_def::TableDef};

/// Resolves destination tables to their definitions.
///
/// Definitions are cached by name. One catalog describes one database; share
/// it between connections to the same database only. Call
/// [`Catalog::invalidate`] after altering a table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
	tables: Arc<RwLock<HashMap<String, Arc<TableDef>>>>,
}

impl Catalog {
	pub fn new() -> Self {
		Self::default()
	}

	#[instrument(name = "catalog::table::resolve", level = "trace", skip(self, conn), fields(table = %name))]
	pub fn resolve(&self, conn: &Connection, name: &TableName) -> Result<Arc<TableDef>> {
		match self.find(conn, name)? {
			Some(table) => Ok(table),
			None => return_error!(BulkError::TableNotFound {
				destination: name.to_string(),
			}),
		}
	}

	/// Like [`Catalog::resolve`] but a missing table is `Ok(None)`.
	#[instrument(name = "catalog::table::find", level = "trace", skip(self, conn), fields(table = %name))]
	pub fn find(&self, conn: &Connection, name: &TableName) -> Result<Option<Arc<TableDef>>> {
		if name.is_empty() {
			return_error!(BulkError::TableNameMissing);
		}

		let key = name.cache_key();
		if let Some(table) = self.tables.read().get(&key) {
			return Ok(Some(table.clone()));
		}

		let table = read_table(conn, name).map_err(|err| {
			sqlbulk_type::error!(BulkError::CatalogFailed {
				destination: name.to_string(),
				cause: from_rusqlite_error(&err),
			})
		})?;

		let Some(table) = table else {
			return Ok(None);
		};

		debug!(
			schema = %table.schema,
			columns = table.columns.len(),
			identity = ?table.identity,
			primary_key = ?table.primary_key,
			"resolved table"
		);

		let table = Arc::new(table);
		self.tables.write().insert(key, table.clone());
		Ok(Some(table))
	}

	pub fn invalidate(&self, name: &TableName) {
		self.tables.write().remove(&name.cache_key());
	}

	pub fn clear(&self) {
		self.tables.write().clear();
	}
}

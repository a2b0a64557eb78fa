// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};
use sqlbulk_type::TableName;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
	pub name: String,
	pub ordinal: usize,
	/// Declared type as written in the table definition, empty when untyped.
	pub declared_type: String,
	pub not_null: bool,
	pub default: Option<String>,
	/// 1-based position within the primary key.
	pub primary_key: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
	/// Schema the table was found in (`main`, `temp` or an attached name).
	pub schema: String,
	pub name: String,
	pub columns: Vec<ColumnDef>,
	/// The rowid-aliasing `INTEGER PRIMARY KEY`, generated on insert.
	pub identity: Option<String>,
	pub primary_key: Vec<String>,
}

impl TableDef {
	pub fn table_name(&self) -> TableName {
		TableName::with_schema(self.schema.clone(), self.name.clone())
	}

	pub fn column(&self, name: &str) -> Option<&ColumnDef> {
		self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
	}

	pub fn column_names(&self) -> Vec<String> {
		self.columns.iter().map(|c| c.name.clone()).collect()
	}

	pub fn is_identity(&self, column: &str) -> bool {
		self.identity.as_deref().is_some_and(|identity| identity.eq_ignore_ascii_case(column))
	}
}

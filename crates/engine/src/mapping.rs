// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Field mapping and qualifier resolution.
//!
//! A mapping pairs source fields with destination columns. Without an
//! explicit mapping every source field whose name matches a column
//! (case-insensitively) is mapped onto it and the rest are ignored.
//! Qualifiers are the columns that decide whether a staged row matches a
//! destination row, they default to the primary key.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlbulk_catalog::TableDef;
use sqlbulk_type::{Result, Verb, error::BulkError, return_error};
use tracing::{debug, instrument};

use crate::{BulkConfig, source::SourceSchema};

/// One explicit `source field -> destination column` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldMap {
	pub source: String,
	pub column: String,
}

impl FieldMap {
	pub fn new(source: impl Into<String>, column: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			column: column.into(),
		}
	}
}

impl<S: Into<String>, C: Into<String>> From<(S, C)> for FieldMap {
	fn from((source, column): (S, C)) -> Self {
		FieldMap::new(source, column)
	}
}

/// A resolved pair. `column` carries the catalog's spelling and `ordinal`
/// the source field's position in each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedField {
	pub source: String,
	pub ordinal: usize,
	pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldMapping {
	fields: Vec<MappedField>,
}

impl FieldMapping {
	pub fn iter(&self) -> impl Iterator<Item = &MappedField> {
		self.fields.iter()
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	pub fn columns(&self) -> Vec<&str> {
		self.fields.iter().map(|f| f.column.as_str()).collect()
	}

	pub fn find_column(&self, column: &str) -> Option<&MappedField> {
		self.fields.iter().find(|f| f.column.eq_ignore_ascii_case(column))
	}

	fn find_source(&self, source: &str) -> Option<&MappedField> {
		self.fields.iter().find(|f| f.source.eq_ignore_ascii_case(source))
	}

	fn push(&mut self, destination: &str, field: MappedField) -> Result<()> {
		if let Some(existing) = self.find_column(&field.column) {
			if existing.source.eq_ignore_ascii_case(&field.source) {
				return Ok(());
			}
			return_error!(BulkError::DuplicateTarget {
				destination: destination.to_string(),
				column: field.column,
				first: existing.source.clone(),
				second: field.source,
			});
		}
		if let Some(existing) = self.find_source(&field.source) {
			return_error!(BulkError::DuplicateSource {
				destination: destination.to_string(),
				field: field.source,
				first: existing.column.clone(),
				second: field.column,
			});
		}
		self.fields.push(field);
		Ok(())
	}

	fn retain(&mut self, keep: impl FnMut(&MappedField) -> bool) {
		self.fields.retain(keep);
	}
}

/// Everything the later steps need to know about columns.
#[derive(Debug, Clone)]
pub struct MappingPlan {
	pub table: Arc<TableDef>,
	pub mapping: FieldMapping,
	/// Join columns in catalog spelling, empty for insert.
	pub qualifiers: Vec<String>,
	/// Columns of the staging table: the mapping plus every qualifier.
	pub staged: Vec<MappedField>,
	/// Number of fields in every source row.
	pub width: usize,
}

impl MappingPlan {
	pub fn destination(&self) -> String {
		self.table.table_name().to_string()
	}

	pub fn staged_columns(&self) -> Vec<&str> {
		self.staged.iter().map(|f| f.column.as_str()).collect()
	}

	fn is_qualifier(&self, column: &str) -> bool {
		self.qualifiers.iter().any(|q| q.eq_ignore_ascii_case(column))
	}

	/// Columns an update writes: mapped, not a qualifier and not the identity.
	pub fn assignable(&self) -> Vec<&str> {
		self.mapping
			.iter()
			.map(|f| f.column.as_str())
			.filter(|column| !self.is_qualifier(column) && !self.table.is_identity(column))
			.collect()
	}

	/// Columns an insert writes.
	pub fn insertable(&self, keep_identity: bool) -> Vec<&str> {
		self.mapping
			.iter()
			.map(|f| f.column.as_str())
			.filter(|column| keep_identity || !self.table.is_identity(column))
			.collect()
	}
}

/// Resolve the mapping between `schema` and `table`, explicit when
/// `explicit` is given and implicit otherwise.
pub fn resolve_mapping(table: &TableDef, schema: &SourceSchema, explicit: Option<&[FieldMap]>) -> Result<FieldMapping> {
	let destination = table.table_name().to_string();
	let mut mapping = FieldMapping::default();

	match explicit {
		Some(pairs) => {
			for pair in pairs {
				let Some(ordinal) = schema.position(&pair.source) else {
					return_error!(BulkError::UnknownSourceField {
						destination,
						field: pair.source.clone(),
						available: schema.fields().to_vec(),
					});
				};
				let Some(column) = table.column(&pair.column) else {
					return_error!(BulkError::UnknownColumn {
						destination,
						column: pair.column.clone(),
						available: table.column_names(),
					});
				};
				mapping.push(
					&destination,
					MappedField {
						source: schema.fields()[ordinal].clone(),
						ordinal,
						column: column.name.clone(),
					},
				)?;
			}
		}
		None => {
			for (ordinal, field) in schema.fields().iter().enumerate() {
				if let Some(column) = table.column(field) {
					mapping.push(
						&destination,
						MappedField {
							source: field.clone(),
							ordinal,
							column: column.name.clone(),
						},
					)?;
				}
			}
		}
	}

	Ok(mapping)
}

/// Resolve the qualifier set and the staged column list.
pub fn resolve_qualifiers(
	table: &TableDef,
	schema: &SourceSchema,
	mapping: &FieldMapping,
	explicit: Option<&[String]>,
) -> Result<(Vec<String>, Vec<MappedField>)> {
	let destination = table.table_name().to_string();

	let mut qualifiers: Vec<String> = Vec::new();
	match explicit {
		Some(names) if !names.is_empty() => {
			for name in names {
				let Some(column) = table.column(name) else {
					return_error!(BulkError::UnknownQualifier {
						destination,
						column: name.clone(),
					});
				};
				if !qualifiers.iter().any(|q| q.eq_ignore_ascii_case(&column.name)) {
					qualifiers.push(column.name.clone());
				}
			}
		}
		_ => qualifiers.extend(table.primary_key.iter().cloned()),
	}

	if qualifiers.is_empty() {
		return_error!(BulkError::MissingQualifiers {
			destination,
		});
	}

	let mut staged: Vec<MappedField> = mapping.iter().cloned().collect();
	for qualifier in &qualifiers {
		if mapping.find_column(qualifier).is_some() {
			continue;
		}
		let Some(ordinal) = schema.position(qualifier) else {
			return_error!(BulkError::UnstageableQualifier {
				destination,
				column: qualifier.clone(),
			});
		};
		staged.push(MappedField {
			source: schema.fields()[ordinal].clone(),
			ordinal,
			column: qualifier.clone(),
		});
	}

	Ok((qualifiers, staged))
}

/// Build the plan for `verb`.
#[instrument(name = "bulk::mapping::plan", level = "debug", skip_all, fields(verb = %verb, table = %table.name))]
pub fn plan(
	verb: Verb,
	table: Arc<TableDef>,
	schema: &SourceSchema,
	explicit_mapping: Option<&[FieldMap]>,
	explicit_qualifiers: Option<&[String]>,
	config: &BulkConfig,
) -> Result<MappingPlan> {
	let destination = table.table_name().to_string();
	let mut mapping = resolve_mapping(&table, schema, explicit_mapping)?;

	if verb == Verb::Insert && !config.keep_identity {
		mapping.retain(|f| !table.is_identity(&f.column));
	}

	if mapping.is_empty() {
		return_error!(BulkError::MissingFields {
			destination,
			source_fields: schema.fields().to_vec(),
		});
	}

	let (qualifiers, staged) = if verb.is_staged() {
		resolve_qualifiers(&table, schema, &mapping, explicit_qualifiers)?
	} else {
		(vec![], mapping.iter().cloned().collect())
	};

	let plan = MappingPlan {
		table,
		mapping,
		qualifiers,
		staged,
		width: schema.len(),
	};

	let nothing_to_assign = match verb {
		Verb::Update => plan.assignable().is_empty(),
		Verb::Merge | Verb::MergeDelete => plan.insertable(config.keep_identity).is_empty(),
		_ => false,
	};
	if nothing_to_assign {
		return_error!(BulkError::NothingToAssign {
			destination,
			verb,
			qualifiers: plan.qualifiers.clone(),
		});
	}

	debug!(
		mapped = plan.mapping.len(),
		staged = plan.staged.len(),
		qualifiers = ?plan.qualifiers,
		"mapping resolved"
	);
	Ok(plan)
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The row shapes a bulk operation can consume.

mod cursor;
mod record;
mod tabular;

pub use cursor::{Cursor, IterCursor};
pub use record::Record;
use sqlbulk_catalog::TableDef;
use sqlbulk_type::{Result, Row, Value, Verb, error, error::BulkError};
pub use tabular::{RowState, Tabular, TabularRow};

/// Ordered field names of a row source. Every row carries one value per
/// field, in this order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceSchema {
	fields: Vec<String>,
}

impl SourceSchema {
	pub fn new<I, S>(fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			fields: fields.into_iter().map(Into::into).collect(),
		}
	}

	pub fn fields(&self) -> &[String] {
		&self.fields
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Ordinal of `name`, compared case-insensitively.
	pub fn position(&self, name: &str) -> Option<usize> {
		self.fields.iter().position(|field| field.eq_ignore_ascii_case(name))
	}
}

pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row>> + Send + 'a>;

/// Where the rows of a bulk operation come from.
pub enum RowSource<'a> {
	/// Typed records whose field list is known up front.
	Records {
		schema: SourceSchema,
		table: Option<&'static str>,
		rows: Box<dyn Iterator<Item = Row> + Send + 'a>,
	},
	/// A forward-only reader, consumed exactly once.
	Cursor(Box<dyn Cursor + 'a>),
	Tabular(Tabular),
	/// Bare primary-key values, accepted by delete only.
	Keys(Vec<Value>),
}

impl<'a> RowSource<'a> {
	pub fn records<I, R>(records: I) -> Self
	where
		I: IntoIterator<Item = R>,
		I::IntoIter: Send + 'a,
		R: Record,
	{
		RowSource::Records {
			schema: SourceSchema::new(R::fields().iter().copied()),
			table: R::table(),
			rows: Box::new(records.into_iter().map(|record| record.values())),
		}
	}

	pub fn cursor(cursor: impl Cursor + 'a) -> Self {
		RowSource::Cursor(Box::new(cursor))
	}

	pub fn tabular(tabular: Tabular) -> Self {
		RowSource::Tabular(tabular)
	}

	pub fn keys<I, V>(keys: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<Value>,
	{
		RowSource::Keys(keys.into_iter().map(Into::into).collect())
	}

	pub fn shape(&self) -> &'static str {
		match self {
			RowSource::Records {
				..
			} => "records",
			RowSource::Cursor(_) => "cursor",
			RowSource::Tabular(_) => "tabular",
			RowSource::Keys(_) => "keys",
		}
	}

	/// Records carry their own field list, the other shapes only describe
	/// whatever the caller loaded.
	pub fn is_typed(&self) -> bool {
		matches!(self, RowSource::Records { .. })
	}

	/// Table a record type declares itself bound to.
	pub fn bound_table(&self) -> Option<&'static str> {
		match self {
			RowSource::Records {
				table,
				..
			} => *table,
			_ => None,
		}
	}

	/// Field names known without touching the destination. Key sources
	/// have none until the primary key is known.
	pub fn declared_fields(&self) -> Vec<String> {
		match self {
			RowSource::Records {
				schema,
				..
			} => schema.fields().to_vec(),
			RowSource::Cursor(cursor) => cursor.schema().fields().to_vec(),
			RowSource::Tabular(tabular) => tabular.columns().to_vec(),
			RowSource::Keys(_) => vec![],
		}
	}

	/// Source schema as seen against `table`. A key source is a single
	/// field named after the table's primary key.
	pub fn schema(&self, verb: Verb, table: &TableDef) -> Result<SourceSchema> {
		match self {
			RowSource::Keys(_) => match table.primary_key.as_slice() {
				[pk] => Ok(SourceSchema::new([pk.clone()])),
				_ => Err(error!(BulkError::UnsupportedSource {
					destination: table.table_name().to_string(),
					verb,
					shape: self.shape(),
					reason: format!(
						"bare keys need a single-column primary key, {} has {}",
						table.table_name(),
						table.primary_key.len()
					),
				})),
			},
			_ => Ok(SourceSchema::new(self.declared_fields())),
		}
	}

	/// Consume the source. Tabular rows outside `row_state` are skipped.
	pub fn into_rows(self, row_state: Option<RowState>) -> RowIter<'a> {
		match self {
			RowSource::Records {
				rows,
				..
			} => Box::new(rows.map(Ok)),
			RowSource::Cursor(mut cursor) => Box::new(std::iter::from_fn(move || cursor.next_row().transpose())),
			RowSource::Tabular(tabular) => Box::new(
				tabular.into_rows()
					.filter(move |row| row_state.is_none_or(|state| row.state == state))
					.map(|row| Ok(row.values)),
			),
			RowSource::Keys(keys) => Box::new(keys.into_iter().map(|key| Ok(vec![key]))),
		}
	}
}

impl std::fmt::Debug for RowSource<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RowSource").field("shape", &self.shape()).field("fields", &self.declared_fields()).finish()
	}
}

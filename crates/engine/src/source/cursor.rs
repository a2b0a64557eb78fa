// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sqlbulk_type::{Result, Row};

use super::SourceSchema;

/// Forward-only row reader.
pub trait Cursor: Send {
	fn schema(&self) -> SourceSchema;

	/// The next row, `Ok(None)` once exhausted. An error ends the transfer.
	fn next_row(&mut self) -> Result<Option<Row>>;
}

/// A cursor over any iterator of rows.
pub struct IterCursor<'a> {
	schema: SourceSchema,
	rows: Box<dyn Iterator<Item = Result<Row>> + Send + 'a>,
}

impl<'a> IterCursor<'a> {
	pub fn new<F, S, I>(fields: F, rows: I) -> Self
	where
		F: IntoIterator<Item = S>,
		S: Into<String>,
		I: IntoIterator<Item = Row>,
		I::IntoIter: Send + 'a,
	{
		Self {
			schema: SourceSchema::new(fields),
			rows: Box::new(rows.into_iter().map(Ok)),
		}
	}

	/// Like [`IterCursor::new`] for readers that can fail mid-stream.
	pub fn fallible<F, S, I>(fields: F, rows: I) -> Self
	where
		F: IntoIterator<Item = S>,
		S: Into<String>,
		I: IntoIterator<Item = Result<Row>>,
		I::IntoIter: Send + 'a,
	{
		Self {
			schema: SourceSchema::new(fields),
			rows: Box::new(rows.into_iter()),
		}
	}
}

impl Cursor for IterCursor<'_> {
	fn schema(&self) -> SourceSchema {
		self.schema.clone()
	}

	fn next_row(&mut self) -> Result<Option<Row>> {
		self.rows.next().transpose()
	}
}

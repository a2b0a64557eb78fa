// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use rusqlite::{Params, Statement, types::Value};
use serde::{Deserialize, Serialize};
use sqlbulk_type::Row;

/// Change state of a buffered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowState {
	Detached,
	Unchanged,
	Added,
	Deleted,
	Modified,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabularRow {
	pub state: RowState,
	pub values: Row,
}

/// An in-memory table of named columns whose rows carry a [`RowState`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tabular {
	columns: Vec<String>,
	rows: Vec<TabularRow>,
}

impl Tabular {
	pub fn new<I, S>(columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			columns: columns.into_iter().map(Into::into).collect(),
			rows: vec![],
		}
	}

	/// Load every row of a query, marked [`RowState::Unchanged`].
	pub fn from_query<P: Params>(stmt: &mut Statement<'_>, params: P) -> rusqlite::Result<Self> {
		let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
		let width = columns.len();
		let mut result = Self::new(columns);
		let mut rows = stmt.query(params)?;
		while let Some(row) = rows.next()? {
			let values = (0..width).map(|idx| row.get::<_, Value>(idx)).collect::<rusqlite::Result<Row>>()?;
			result.push_with_state(RowState::Unchanged, values);
		}
		Ok(result)
	}

	/// Append a row as [`RowState::Added`].
	pub fn push(&mut self, values: Row) -> &mut Self {
		self.push_with_state(RowState::Added, values)
	}

	pub fn push_with_state(&mut self, state: RowState, values: Row) -> &mut Self {
		self.rows.push(TabularRow {
			state,
			values,
		});
		self
	}

	/// Set the state of the row at `index`, returns false when out of range.
	pub fn set_state(&mut self, index: usize, state: RowState) -> bool {
		match self.rows.get_mut(index) {
			Some(row) => {
				row.state = state;
				true
			}
			None => false,
		}
	}

	/// Drop deleted rows and mark the rest unchanged.
	pub fn accept_changes(&mut self) {
		self.rows.retain(|row| row.state != RowState::Deleted);
		for row in &mut self.rows {
			row.state = RowState::Unchanged;
		}
	}

	pub fn columns(&self) -> &[String] {
		&self.columns
	}

	pub fn rows(&self) -> &[TabularRow] {
		&self.rows
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	pub(crate) fn into_rows(self) -> impl Iterator<Item = TabularRow> {
		self.rows.into_iter()
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Streaming row transfer.
//!
//! Rows are bound into multi-row `INSERT ... VALUES` statements of up to
//! [`BulkConfig::rows_per_statement`] rows. The whole transfer runs inside
//! one savepoint, so a failure at any row leaves the target as it was.

use rusqlite::{Connection, params_from_iter};
use sqlbulk_type::{Result, Value, error, error::BulkError, error::diagnostic::source::row_width_mismatch};
use tracing::{debug, instrument, warn};

use crate::{BulkConfig, interrupt::Deadline, mapping::MappedField, source::RowIter};

const SAVEPOINT: &str = "sqlbulk_transfer";

/// Table the rows are written to and the source ordinal feeding each of
/// its columns.
#[derive(Debug, Clone)]
pub(crate) struct TransferTarget {
	pub table: String,
	pub columns: Vec<(String, usize)>,
	/// Number of fields every source row must carry.
	pub width: usize,
}

impl TransferTarget {
	pub(crate) fn new<'f>(table: String, fields: impl IntoIterator<Item = &'f MappedField>, width: usize) -> Self {
		Self {
			table,
			columns: fields.into_iter().map(|f| (f.column.clone(), f.ordinal)).collect(),
			width,
		}
	}

	fn insert_sql(&self, rows: usize) -> String {
		let columns: Vec<String> =
			self.columns.iter().map(|(name, _)| sqlbulk_type::quote_identifier(name)).collect();
		let tuple = format!("({})", vec!["?"; self.columns.len()].join(", "));
		let values = vec![tuple.as_str(); rows].join(", ");
		format!("INSERT INTO {} ({}) VALUES {}", self.table, columns.join(", "), values)
	}
}

/// Copy every row of `rows` into `target`. Returns the number of rows
/// written.
#[instrument(name = "bulk::transfer", level = "debug", skip_all, fields(target = %target.table))]
pub(crate) fn transfer(
	conn: &Connection,
	target: &TransferTarget,
	rows: RowIter<'_>,
	config: &BulkConfig,
	deadline: &Deadline,
	destination: &str,
) -> Result<usize> {
	deadline.check()?;
	conn.execute_batch(&format!("SAVEPOINT {}", SAVEPOINT))
		.map_err(|err| deadline.classify(&err, |cause| failed(destination, target, 0, cause)))?;

	let result = {
		let _progress = deadline.install(conn);
		write_batches(conn, target, rows, config, deadline, destination)
	};

	match result {
		Ok(count) => {
			conn.execute_batch(&format!("RELEASE {}", SAVEPOINT))
				.map_err(|err| deadline.classify(&err, |cause| failed(destination, target, count, cause)))?;
			debug!(rows = count, "transfer complete");
			Ok(count)
		}
		Err(err) => {
			if let Err(rollback) = conn.execute_batch(&format!("ROLLBACK TO {0}; RELEASE {0}", SAVEPOINT)) {
				warn!(error = %rollback, "failed to roll back transfer");
			}
			Err(err)
		}
	}
}

fn write_batches(
	conn: &Connection,
	target: &TransferTarget,
	rows: RowIter<'_>,
	config: &BulkConfig,
	deadline: &Deadline,
	destination: &str,
) -> Result<usize> {
	let per_statement = config.rows_per_statement(target.columns.len());
	let mut params: Vec<Value> = Vec::with_capacity(per_statement * target.columns.len());
	let mut pending = 0usize;
	let mut written = 0usize;

	for (index, row) in rows.enumerate() {
		let row = row.map_err(|err| error!(failed(destination, target, written, err.diagnostic())))?;
		if row.len() != target.width {
			return Err(error!(failed(
				destination,
				target,
				written,
				row_width_mismatch(index, target.width, row.len())
			)));
		}

		params.extend(target.columns.iter().map(|(_, ordinal)| row[*ordinal].clone()));
		pending += 1;

		if pending == per_statement {
			written += flush(conn, target, &params, pending, deadline, destination, written)?;
			params.clear();
			pending = 0;
		}
	}

	if pending > 0 {
		written += flush(conn, target, &params, pending, deadline, destination, written)?;
	}
	Ok(written)
}

fn flush(
	conn: &Connection,
	target: &TransferTarget,
	params: &[Value],
	rows: usize,
	deadline: &Deadline,
	destination: &str,
	written: usize,
) -> Result<usize> {
	deadline.check()?;
	let mut stmt = conn
		.prepare_cached(&target.insert_sql(rows))
		.map_err(|err| deadline.classify(&err, |cause| failed(destination, target, written, cause)))?;
	stmt.execute(params_from_iter(params.iter()))
		.map_err(|err| deadline.classify(&err, |cause| failed(destination, target, written, cause)))?;
	Ok(rows)
}

fn failed(destination: &str, target: &TransferTarget, rows: usize, cause: sqlbulk_type::Diagnostic) -> BulkError {
	BulkError::TransferFailed {
		destination: destination.to_string(),
		target: target.table.clone(),
		rows,
		cause,
	}
}

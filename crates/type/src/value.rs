// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub use rusqlite::types::Value;

/// One source row, positionally aligned with its source schema.
pub type Row = Vec<Value>;

/// Short name of the storage class a value carries, used in diagnostics.
pub fn storage_class(value: &Value) -> &'static str {
	match value {
		Value::Null => "NULL",
		Value::Integer(_) => "INTEGER",
		Value::Real(_) => "REAL",
		Value::Text(_) => "TEXT",
		Value::Blob(_) => "BLOB",
	}
}

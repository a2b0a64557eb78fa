// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Reads table definitions out of SQLite's schema tables.

use rusqlite::{Connection, OptionalExtension, params};
use sqlbulk_type::{TableName, quote_identifier};

use crate::table_def::{ColumnDef, TableDef};

/// Schemas to search for an unqualified name, in SQLite's own lookup order:
/// `temp`, then `main`, then attached databases.
fn search_path(conn: &Connection, name: &TableName) -> rusqlite::Result<Vec<String>> {
	if let Some(schema) = &name.schema {
		return Ok(vec![schema.clone()]);
	}

	let mut stmt = conn.prepare("SELECT name FROM pragma_database_list ORDER BY seq")?;
	let attached = stmt.query_map([], |row| row.get::<_, String>(0))?.collect::<rusqlite::Result<Vec<_>>>()?;

	let mut path = vec!["temp".to_string()];
	path.extend(attached.into_iter().filter(|schema| !schema.eq_ignore_ascii_case("temp")));
	Ok(path)
}

pub(crate) fn read_table(conn: &Connection, name: &TableName) -> rusqlite::Result<Option<TableDef>> {
	for schema in search_path(conn, name)? {
		let found = conn
			.query_row(
				&format!(
					"SELECT name, sql FROM {}.sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
					quote_identifier(&schema)
				),
				params![name.name],
				|row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)),
			)
			.optional()?;

		if let Some((table, sql)) = found {
			let columns = read_columns(conn, &schema, &table)?;
			let key_index = has_key_index(conn, &schema, &table)?;
			return Ok(Some(build(schema, table, sql.unwrap_or_default(), columns, key_index)));
		}
	}
	Ok(None)
}

fn read_columns(conn: &Connection, schema: &str, table: &str) -> rusqlite::Result<Vec<ColumnDef>> {
	let mut stmt = conn.prepare(
		"SELECT cid, name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1, ?2) ORDER BY cid",
	)?;

	stmt.query_map(params![table, schema], |row| {
		let primary_key: i64 = row.get(5)?;
		Ok(ColumnDef {
			ordinal: row.get::<_, i64>(0)? as usize,
			name: row.get(1)?,
			declared_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
			not_null: row.get::<_, i64>(3)? != 0,
			default: row.get(4)?,
			primary_key: (primary_key > 0).then_some(primary_key as usize),
		})
	})?
	.collect()
}

/// Whether the primary key is backed by its own index. A rowid alias never
/// is, while `INTEGER PRIMARY KEY DESC` gets one like any other key.
fn has_key_index(conn: &Connection, schema: &str, table: &str) -> rusqlite::Result<bool> {
	conn.query_row(
		"SELECT count(*) FROM pragma_index_list(?1, ?2) WHERE origin = 'pk'",
		params![table, schema],
		|row| row.get::<_, i64>(0),
	)
	.map(|count| count > 0)
}

fn build(schema: String, name: String, sql: String, columns: Vec<ColumnDef>, key_index: bool) -> TableDef {
	let mut keyed: Vec<&ColumnDef> = columns.iter().filter(|c| c.primary_key.is_some()).collect();
	keyed.sort_by_key(|c| c.primary_key);
	let primary_key: Vec<String> = keyed.iter().map(|c| c.name.clone()).collect();

	let without_rowid = sql.to_uppercase().contains("WITHOUT ROWID");

	// Only a lone, unindexed INTEGER PRIMARY KEY on a rowid table aliases the rowid.
	let identity = match keyed.as_slice() {
		[column] if !without_rowid && !key_index && column.declared_type.eq_ignore_ascii_case("INTEGER") => {
			Some(column.name.clone())
		}
		_ => None,
	};

	TableDef {
		schema,
		name,
		columns,
		identity,
		primary_key,
	}
}

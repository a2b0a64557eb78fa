// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Destination tables and row-by-row helpers used to seed and verify bulk
//! operations.

use std::path::Path;

use rusqlite::{Connection, params_from_iter};
use sqlbulk_type::{Value, quote_identifier};

use crate::init_tracing;

pub const PEOPLE: &str = "CREATE TABLE people (
	id INTEGER PRIMARY KEY,
	first_name TEXT NOT NULL,
	last_name TEXT NOT NULL,
	age INTEGER,
	email TEXT
)";

pub const LEDGER: &str = "CREATE TABLE ledger (
	account TEXT NOT NULL,
	entry INTEGER NOT NULL,
	amount REAL,
	memo TEXT,
	PRIMARY KEY (account, entry)
)";

pub const NOTES: &str = "CREATE TABLE notes (
	topic TEXT,
	body TEXT
)";

pub fn memory() -> Connection {
	init_tracing();
	let conn = Connection::open_in_memory().expect("failed to open in-memory database");
	create_fixtures(&conn);
	conn
}

pub fn open(path: &Path) -> Connection {
	init_tracing();
	Connection::open(path.join("bulk.db")).expect("failed to open database")
}

pub fn create_fixtures(conn: &Connection) {
	conn.execute_batch(&[PEOPLE, LEDGER, NOTES].join(";\n")).expect("failed to create fixture tables");
}

/// Insert one row and return its rowid.
pub fn insert_row(conn: &Connection, table: &str, values: &[(&str, Value)]) -> i64 {
	let columns: Vec<String> = values.iter().map(|(name, _)| quote_identifier(name)).collect();
	let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
	let sql = format!(
		"INSERT INTO {} ({}) VALUES ({})",
		quote_identifier(table),
		columns.join(", "),
		placeholders.join(", ")
	);
	conn.execute(&sql, params_from_iter(values.iter().map(|(_, value)| value)))
		.unwrap_or_else(|err| panic!("insert into {} failed: {}", table, err));
	conn.last_insert_rowid()
}

/// Seed `count` people named `first{i}` / `last{i}` and return their ids.
pub fn seed_people(conn: &Connection, count: usize) -> Vec<i64> {
	(0..count)
		.map(|i| {
			insert_row(
				conn,
				"people",
				&[
					("first_name", Value::Text(format!("first{}", i))),
					("last_name", Value::Text(format!("last{}", i))),
					("age", Value::Integer(20 + i as i64)),
					("email", Value::Text(format!("person{}@example.com", i))),
				],
			)
		})
		.collect()
}

pub fn seed_ledger(conn: &Connection, account: &str, entries: usize) {
	for entry in 0..entries {
		insert_row(
			conn,
			"ledger",
			&[
				("account", Value::Text(account.to_string())),
				("entry", Value::Integer(entry as i64)),
				("amount", Value::Real(entry as f64 * 1.5)),
				("memo", Value::Text(format!("entry {}", entry))),
			],
		);
	}
}

pub fn count_rows(conn: &Connection, table: &str) -> usize {
	count_where(conn, table, "1 = 1")
}

pub fn count_where(conn: &Connection, table: &str, predicate: &str) -> usize {
	conn.query_row(&format!("SELECT COUNT(*) FROM {} WHERE {}", quote_identifier(table), predicate), [], |row| {
		row.get::<_, i64>(0)
	})
	.expect("count failed") as usize
}

/// Read one column of every row ordered by `order_by`.
pub fn column_values(conn: &Connection, table: &str, column: &str, order_by: &str) -> Vec<Value> {
	let mut stmt = conn
		.prepare(&format!(
			"SELECT {} FROM {} ORDER BY {}",
			quote_identifier(column),
			quote_identifier(table),
			order_by
		))
		.expect("prepare failed");
	stmt.query_map([], |row| row.get::<_, Value>(0))
		.expect("query failed")
		.collect::<rusqlite::Result<Vec<_>>>()
		.expect("read failed")
}

/// Names of leftover staging tables in `main` and `temp` with the given
/// prefix.
pub fn staging_tables(conn: &Connection, prefix: &str) -> Vec<String> {
	let mut names = Vec::new();
	for schema in ["main", "temp"] {
		let mut stmt = conn
			.prepare(&format!(
				"SELECT name FROM {}.sqlite_master WHERE type = 'table' AND substr(name, 1, ?1) = ?2",
				schema
			))
			.expect("prepare failed");
		let found = stmt
			.query_map(rusqlite::params![prefix.len() as i64, prefix], |row| row.get::<_, String>(0))
			.expect("query failed")
			.collect::<rusqlite::Result<Vec<_>>>()
			.expect("read failed");
		names.extend(found.into_iter().map(|name| format!("{}.{}", schema, name)));
	}
	names
}

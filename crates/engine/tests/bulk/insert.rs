// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sqlbulk_engine::{BulkRequest, ErrorKind, IterCursor, RowSource, Value};
use sqlbulk_testing::fixture::{count_rows, memory, staging_tables};

use crate::{PREFIX, people, people_ids, run};

#[test]
fn test_insert_generates_identity() {
	let conn = memory();
	let people: Vec<_> = people(5).into_iter().enumerate().map(|(i, p)| p.with_id(100 + i as i64)).collect();

	let inserted = run(&conn, BulkRequest::insert("people").source(RowSource::records(&people))).unwrap();

	assert_eq!(inserted, 5);
	assert_eq!(people_ids(&conn), vec![1, 2, 3, 4, 5]);
	// inserts never stage
	assert!(staging_tables(&conn, PREFIX).is_empty());
}

#[test]
fn test_insert_keeps_identity() {
	let conn = memory();
	let people: Vec<_> = people(3).into_iter().enumerate().map(|(i, p)| p.with_id(100 + i as i64)).collect();

	let inserted =
		run(&conn, BulkRequest::insert("people").source(RowSource::records(&people)).keep_identity(true)).unwrap();

	assert_eq!(inserted, 3);
	assert_eq!(people_ids(&conn), vec![100, 101, 102]);
}

#[test]
fn test_insert_spans_batches() {
	let conn = memory();
	let people = people(25);

	let inserted =
		run(&conn, BulkRequest::insert("people").source(RowSource::records(&people)).batch_size(7)).unwrap();

	assert_eq!(inserted, 25);
	assert_eq!(count_rows(&conn, "people"), 25);
}

#[test]
fn test_insert_constraint_violation_rolls_back() {
	let conn = memory();
	let rows = (0..10).map(|i| {
		let first = if i == 7 {
			Value::Null
		} else {
			Value::Text(format!("first{}", i))
		};
		vec![first, Value::Text(format!("last{}", i))]
	});

	let err = run(
		&conn,
		BulkRequest::insert("people")
			.source(RowSource::cursor(IterCursor::new(["first_name", "last_name"], rows)))
			.batch_size(2),
	)
	.unwrap_err();

	assert_eq!(err.kind(), Some(ErrorKind::TransferFailed));
	assert_eq!(err.code, "TRANSFER_001");
	assert!(err.cause.as_ref().is_some_and(|cause| cause.code.starts_with("SQLITE_")));
	assert_eq!(count_rows(&conn, "people"), 0);
}

#[test]
fn test_insert_inside_caller_transaction() {
	let mut conn = memory();
	let tx = conn.transaction().unwrap();

	let inserted = run(&tx, BulkRequest::insert("people").source(RowSource::records(&people(4)))).unwrap();
	assert_eq!(inserted, 4);
	assert_eq!(count_rows(&tx, "people"), 4);

	tx.rollback().unwrap();
	assert_eq!(count_rows(&conn, "people"), 0);
}

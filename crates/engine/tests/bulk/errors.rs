// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sqlbulk_engine::{BulkRequest, ErrorKind, IterCursor, RowSource, Step, Tabular, Value, Verb};
use sqlbulk_testing::fixture::{count_rows, memory, staging_tables};

use crate::{PREFIX, insert_people, people, run};

#[test]
fn test_null_source() {
	let conn = memory();

	for verb in [Verb::Insert, Verb::Update, Verb::Delete, Verb::Merge, Verb::MergeDelete] {
		let err = run(&conn, BulkRequest::new(verb, "people")).unwrap_err();
		assert_eq!(err.kind(), Some(ErrorKind::NullSource));
		assert_eq!(err.code, "SOURCE_001");
		assert_eq!(err.step(), Some(Step::Validate));
	}
	assert!(staging_tables(&conn, PREFIX).is_empty());
}

#[test]
fn test_null_source_before_table_lookup() {
	let conn = memory();

	let err = run(&conn, BulkRequest::delete("does_not_exist")).unwrap_err();

	assert_eq!(err.kind(), Some(ErrorKind::NullSource));
}

#[test]
fn test_mapping_unknown_source_field() {
	let conn = memory();
	let people = insert_people(&conn, 3);

	let err = run(
		&conn,
		BulkRequest::delete("people").source(RowSource::records(&people)).mapping([("identifier", "id")]),
	)
	.unwrap_err();

	assert_eq!(err.kind(), Some(ErrorKind::InvalidMapping));
	assert_eq!(err.code, "MAPPING_001");
	let rendered = err.to_string();
	assert!(rendered.contains("identifier"), "{}", rendered);
	assert!(rendered.contains("main.people"), "{}", rendered);
	assert_eq!(count_rows(&conn, "people"), 3);
	assert!(staging_tables(&conn, PREFIX).is_empty());
}

#[test]
fn test_mapping_unknown_column() {
	let conn = memory();
	let people = insert_people(&conn, 1);

	let err =
		run(&conn, BulkRequest::delete("people").source(RowSource::records(&people)).mapping([("id", "person_id")]))
			.unwrap_err();

	assert_eq!(err.code, "MAPPING_002");
	assert!(err.to_string().contains("person_id"));
}

#[test]
fn test_mapping_ambiguous_target() {
	let conn = memory();
	let people = insert_people(&conn, 1);

	let err = run(
		&conn,
		BulkRequest::update("people")
			.source(RowSource::records(&people))
			.mapping([("id", "id"), ("first_name", "last_name"), ("last_name", "last_name")]),
	)
	.unwrap_err();

	assert_eq!(err.code, "MAPPING_003");
	let rendered = err.to_string();
	assert!(rendered.contains("first_name") && rendered.contains("last_name"), "{}", rendered);
	assert!(staging_tables(&conn, PREFIX).is_empty());
}

#[test]
fn test_unknown_qualifier() {
	let conn = memory();
	let people = insert_people(&conn, 1);

	let err = run(&conn, BulkRequest::delete("people").source(RowSource::records(&people)).qualifiers(["zip"]))
		.unwrap_err();

	assert_eq!(err.code, "MAPPING_005");
}

#[test]
fn test_missing_qualifiers_on_table_without_key() {
	let conn = memory();
	let rows = vec![vec![Value::Text("rust".to_string()), Value::Text("ownership".to_string())]];

	let err = run(&conn, BulkRequest::delete("notes").source(RowSource::cursor(IterCursor::new(["topic", "body"], rows))))
		.unwrap_err();

	assert_eq!(err.code, "MAPPING_007");
}

#[test]
fn test_qualifiers_on_table_without_key() {
	let conn = memory();
	conn.execute_batch("INSERT INTO notes VALUES ('rust', 'ownership'), ('rust', 'borrowing'), ('go', 'channels')")
		.unwrap();
	let rows = vec![vec![Value::Text("rust".to_string())]];

	let deleted = run(
		&conn,
		BulkRequest::delete("notes").source(RowSource::cursor(IterCursor::new(["topic"], rows))).qualifiers(["topic"]),
	)
	.unwrap();

	assert_eq!(deleted, 2);
	assert_eq!(count_rows(&conn, "notes"), 1);
}

#[test]
fn test_unknown_table_with_records() {
	let conn = memory();

	let err = run(&conn, BulkRequest::delete("persons").source(RowSource::records(&people(2)))).unwrap_err();

	assert_eq!(err.kind(), Some(ErrorKind::UnresolvableSchema));
	assert_eq!(err.code, "SCHEMA_002");
}

#[test]
fn test_unknown_table_with_cursor() {
	let conn = memory();
	let rows = vec![vec![Value::Integer(1)]];

	let err = run(&conn, BulkRequest::delete("persons").source(RowSource::cursor(IterCursor::new(["id"], rows))))
		.unwrap_err();

	assert_eq!(err.kind(), Some(ErrorKind::MissingFields));
	assert_eq!(err.code, "FIELDS_001");
	assert!(err.to_string().contains("id"));
}

#[test]
fn test_unknown_table_with_tabular() {
	let conn = memory();
	let mut tabular = Tabular::new(["id"]);
	tabular.push(vec![Value::Integer(1)]);

	let err = run(&conn, BulkRequest::delete("persons").source(RowSource::tabular(tabular))).unwrap_err();

	assert_eq!(err.kind(), Some(ErrorKind::MissingFields));
}

#[test]
fn test_missing_table_name() {
	let conn = memory();
	let rows = vec![vec![Value::Integer(1)]];

	let err = run(&conn, BulkRequest::delete("").source(RowSource::cursor(IterCursor::new(["id"], rows)))).unwrap_err();

	assert_eq!(err.code, "SCHEMA_001");
}

#[test]
fn test_no_field_matches() {
	let conn = memory();
	let rows = vec![vec![Value::Integer(1)]];

	let err = run(&conn, BulkRequest::delete("people").source(RowSource::cursor(IterCursor::new(["colour"], rows))))
		.unwrap_err();

	assert_eq!(err.kind(), Some(ErrorKind::MissingFields));
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sqlbulk_engine::{
	BulkConfig, BulkRequest, Catalog, ErrorKind, IterCursor, RowSource, StagingMode, TableName, Value, Verb, mapping,
	source::SourceSchema,
	staging::{self, StagingDef, StagingGuard},
};
use sqlbulk_testing::{
	fixture::{count_rows, create_fixtures, memory, open, staging_tables},
	tempdir::temp_dir,
};

use crate::{PREFIX, insert_people, run};

fn people_plan(conn: &rusqlite::Connection, verb: Verb) -> sqlbulk_engine::MappingPlan {
	let table = Catalog::new().resolve(conn, &TableName::new("people")).unwrap();
	mapping::plan(verb, table, &SourceSchema::new(["id", "age"]), None, None, &BulkConfig::default()).unwrap()
}

#[test]
fn test_staging_name_and_columns() {
	let conn = memory();
	let plan = people_plan(&conn, Verb::Update);

	let session = StagingDef::new(&plan, Verb::Update, &BulkConfig::default());
	assert_eq!(session.mode, StagingMode::Session);
	assert_eq!(session.schema, "temp");
	assert!(session.name.starts_with("_bulk_update_"), "{}", session.name);
	assert_eq!(session.columns.iter().map(|c| c.declared_type.as_str()).collect::<Vec<_>>(), vec![
		"INTEGER", "INTEGER"
	]);

	let physical = StagingDef::new(&plan, Verb::Update, &BulkConfig::default().physical_staging(true).staging_prefix("stg_"));
	assert_eq!(physical.mode, StagingMode::Physical);
	assert_eq!(physical.schema, "main");
	assert!(physical.name.starts_with("stg_update_"));
	assert_ne!(physical.name, StagingDef::new(&plan, Verb::Update, &BulkConfig::default()).name);
}

#[test]
fn test_staging_has_no_constraints() {
	let conn = memory();
	let plan = people_plan(&conn, Verb::Delete);
	let def = StagingDef::new(&plan, Verb::Delete, &BulkConfig::default());

	staging::create(&conn, &def, "people").unwrap();
	// duplicate and null keys are accepted
	conn.execute_batch(&format!("INSERT INTO {0} VALUES (1, NULL), (1, NULL), (NULL, 3)", def.quoted())).unwrap();
	staging::index(&conn, &def, "people").unwrap();

	assert!(staging::release(&conn, &def));
	assert!(staging::release(&conn, &def));
	assert!(staging_tables(&conn, PREFIX).is_empty());
}

#[test]
fn test_guard_releases_on_drop() {
	let conn = memory();
	let plan = people_plan(&conn, Verb::Merge);

	{
		let guard = StagingGuard::new(&conn, StagingDef::new(&plan, Verb::Merge, &BulkConfig::default()));
		staging::create(&conn, guard.def(), "people").unwrap();
		assert_eq!(staging_tables(&conn, PREFIX).len(), 1);
	}

	assert!(staging_tables(&conn, PREFIX).is_empty());
}

#[test]
fn test_creation_failure() {
	let conn = memory();
	let plan = people_plan(&conn, Verb::Delete);
	let def = StagingDef::new(&plan, Verb::Delete, &BulkConfig::default());
	staging::create(&conn, &def, "people").unwrap();

	let err = staging::create(&conn, &def, "people").unwrap_err();

	assert_eq!(err.kind(), Some(ErrorKind::StagingCreationFailed));
	assert_eq!(err.code, "STAGING_001");
	staging::release(&conn, &def);
}

#[test]
fn test_physical_staging_roundtrip() {
	temp_dir(|path| {
		let conn = open(path);
		create_fixtures(&conn);
		let mut people = insert_people(&conn, 8);
		for person in &mut people {
			person.age = Some(18);
		}

		let updated = run(
			&conn,
			BulkRequest::update("people").source(RowSource::records(&people)).physical_staging(true),
		)
		.unwrap();

		assert_eq!(updated, 8);
		assert!(staging_tables(&conn, PREFIX).is_empty());
	})
}

#[test]
fn test_physical_staging_removed_after_failure() {
	temp_dir(|path| {
		let conn = open(path);
		create_fixtures(&conn);
		insert_people(&conn, 3);

		let rows = vec![vec![Value::Integer(1)], vec![Value::Integer(2), Value::Null]];
		let err = run(
			&conn,
			BulkRequest::delete("people")
				.source(RowSource::cursor(IterCursor::new(["id"], rows)))
				.physical_staging(true),
		)
		.unwrap_err();

		assert_eq!(err.kind(), Some(ErrorKind::TransferFailed));
		assert!(staging_tables(&conn, PREFIX).is_empty());
		assert_eq!(count_rows(&conn, "people"), 3);
	})
}

#[test]
fn test_staging_in_attached_schema() {
	temp_dir(|path| {
		let conn = memory();
		conn.execute("ATTACH DATABASE ?1 AS archive", [path.join("archive.db").to_string_lossy().to_string()])
			.unwrap();
		conn.execute_batch("CREATE TABLE archive.events (id INTEGER PRIMARY KEY, kind TEXT); INSERT INTO archive.events (kind) VALUES ('a'), ('b'), ('c');")
			.unwrap();

		let deleted = run(
			&conn,
			BulkRequest::delete("archive.events").source(RowSource::keys([1i64, 2])).physical_staging(true),
		)
		.unwrap();

		assert_eq!(deleted, 2);
		let left: i64 = conn.query_row("SELECT COUNT(*) FROM archive.events", [], |row| row.get(0)).unwrap();
		assert_eq!(left, 1);
		let staged: i64 = conn
			.query_row("SELECT COUNT(*) FROM archive.sqlite_master WHERE name LIKE '\\_bulk\\_%' ESCAPE '\\'", [], |row| {
				row.get(0)
			})
			.unwrap();
		assert_eq!(staged, 0);
	})
}

#[test]
fn test_delete_stages_every_mapped_column() {
	let conn = memory();
	let plan = people_plan(&conn, Verb::Delete);
	assert_eq!(plan.qualifiers, vec!["id"]);
	assert_eq!(plan.staged_columns(), vec!["id", "age"]);
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use sqlbulk_engine::{BulkRequest, ErrorKind, RowSource, Step};
use sqlbulk_testing::fixture::{count_rows, memory, staging_tables};

use crate::{PREFIX, insert_people, run};

#[test]
fn test_zero_timeout_fails_transfer() {
	let conn = memory();
	let people = insert_people(&conn, 5);

	let err = run(
		&conn,
		BulkRequest::delete("people").source(RowSource::records(&people)).timeout(Duration::ZERO),
	)
	.unwrap_err();

	assert_eq!(err.kind(), Some(ErrorKind::TransferFailed));
	assert_eq!(err.code, "TRANSFER_002");
	assert_eq!(err.step(), Some(Step::Transfer));
	assert_eq!(count_rows(&conn, "people"), 5);
	assert!(staging_tables(&conn, PREFIX).is_empty());
}

#[test]
fn test_generous_timeout() {
	let conn = memory();
	let people = insert_people(&conn, 5);

	let deleted = run(
		&conn,
		BulkRequest::delete("people").source(RowSource::records(&people)).timeout(Duration::from_secs(60)),
	)
	.unwrap();

	assert_eq!(deleted, 5);
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	sync::Arc,
	thread,
	time::{Duration, Instant},
};

use parking_lot::Mutex;
use sqlbulk_engine::{
	AsyncBulk, BulkRequest, CancellationToken, Catalog, Cursor, ErrorKind, Result, Row, RowSource, SharedConnection,
	SourceSchema, Step, Value,
};
use sqlbulk_testing::fixture::{count_rows, memory, staging_tables};

use crate::{PREFIX, Person, insert_people, people_ids};

fn shared(people: usize) -> (SharedConnection, Vec<Person>) {
	let conn = memory();
	let people = insert_people(&conn, people);
	(Arc::new(Mutex::new(conn)), people)
}

/// Yields ids and cancels `token` once `cancel_at` rows were read.
struct CancellingCursor {
	token: CancellationToken,
	ids: Vec<i64>,
	position: usize,
	cancel_at: usize,
}

impl Cursor for CancellingCursor {
	fn schema(&self) -> SourceSchema {
		SourceSchema::new(["id"])
	}

	fn next_row(&mut self) -> Result<Option<Row>> {
		if self.position == self.cancel_at {
			self.token.cancel();
		}
		if self.position > self.cancel_at {
			thread::sleep(Duration::from_millis(1));
		}
		let row = self.ids.get(self.position).map(|id| vec![Value::Integer(*id)]);
		self.position += 1;
		Ok(row)
	}
}

/// Yields `count` ids, pausing before each one.
struct SlowCursor {
	position: i64,
	count: i64,
}

impl Cursor for SlowCursor {
	fn schema(&self) -> SourceSchema {
		SourceSchema::new(["id"])
	}

	fn next_row(&mut self) -> Result<Option<Row>> {
		if self.position >= self.count {
			return Ok(None);
		}
		thread::sleep(Duration::from_millis(1));
		self.position += 1;
		Ok(Some(vec![Value::Integer(self.position)]))
	}
}

async fn wait_for_staging_release(conn: &SharedConnection) {
	let deadline = Instant::now() + Duration::from_secs(10);
	loop {
		let left = staging_tables(&conn.lock(), PREFIX);
		if left.is_empty() {
			return;
		}
		assert!(Instant::now() < deadline, "staging left behind: {:?}", left);
		tokio::time::sleep(Duration::from_millis(20)).await;
	}
}

#[tokio::test]
async fn test_async_delete() {
	let (conn, people) = shared(10);
	let bulk = AsyncBulk::new(conn.clone(), Catalog::new());

	let deleted = bulk
		.execute(BulkRequest::delete("people").source(RowSource::records(people)), CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(deleted, 10);
	let conn = conn.lock();
	assert_eq!(count_rows(&conn, "people"), 0);
	assert!(staging_tables(&conn, PREFIX).is_empty());
}

#[tokio::test]
async fn test_async_insert_and_merge() {
	let (conn, _) = shared(0);
	let bulk = AsyncBulk::new(conn.clone(), Catalog::new());

	let inserted = bulk
		.execute(BulkRequest::insert("people").source(RowSource::records(crate::people(4))), CancellationToken::new())
		.await
		.unwrap();
	assert_eq!(inserted, 4);

	let mut people = crate::people(5);
	for (person, id) in people.iter_mut().zip(1..=4) {
		person.id = Some(id);
	}
	let merged = bulk
		.execute(BulkRequest::merge("people").source(RowSource::records(people)), CancellationToken::new())
		.await
		.unwrap();

	assert_eq!(merged, 5);
	assert_eq!(people_ids(&conn.lock()), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_cancelled_before_start() {
	let (conn, people) = shared(3);
	let bulk = AsyncBulk::new(conn.clone(), Catalog::new());
	let token = CancellationToken::new();
	token.cancel();

	let err = bulk.execute(BulkRequest::delete("people").source(RowSource::records(people)), token).await.unwrap_err();

	assert!(err.is_cancelled());
	assert_eq!(err.kind(), Some(ErrorKind::Cancelled));
	assert_eq!(err.code, "CANCELLED_001");
	let conn = conn.lock();
	assert_eq!(count_rows(&conn, "people"), 3);
	assert!(staging_tables(&conn, PREFIX).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_during_transfer() {
	let (conn, people) = shared(20);
	let bulk = AsyncBulk::new(conn.clone(), Catalog::new());
	let token = CancellationToken::new();

	let mut ids: Vec<i64> = people.iter().filter_map(|person| person.id).collect();
	ids.extend(1_000..3_000);
	let cursor = CancellingCursor {
		token: token.clone(),
		ids,
		position: 0,
		cancel_at: 5,
	};

	let err = bulk
		.execute(BulkRequest::delete("people").source(RowSource::cursor(cursor)).batch_size(10), token)
		.await
		.unwrap_err();

	assert!(err.is_cancelled(), "{}", err);
	let conn = conn.lock();
	assert_eq!(count_rows(&conn, "people"), 20);
	assert!(staging_tables(&conn, PREFIX).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_during_execute() {
	let (conn, people) = shared(3);
	{
		let conn = conn.lock();
		conn.execute_batch(
			"CREATE TABLE filler (x INTEGER);
			WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 2000)
			INSERT INTO filler SELECT x FROM n;
			CREATE TRIGGER people_slow_delete BEFORE DELETE ON people BEGIN
				SELECT count(*) FROM filler a, filler b, filler c;
			END;",
		)
		.unwrap();
	}
	let bulk = AsyncBulk::new(conn.clone(), Catalog::new());
	let token = CancellationToken::new();

	let canceller = token.clone();
	tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(500)).await;
		canceller.cancel();
	});

	let err = bulk.execute(BulkRequest::delete("people").source(RowSource::records(people)), token).await.unwrap_err();

	assert!(err.is_cancelled(), "{}", err);
	assert_eq!(err.step(), Some(Step::Execute));
	let conn = conn.lock();
	assert_eq!(count_rows(&conn, "people"), 3);
	assert!(staging_tables(&conn, PREFIX).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropped_operation_releases_staging() {
	let (conn, _) = shared(20);
	let bulk = AsyncBulk::new(conn.clone(), Catalog::new());

	let request = BulkRequest::delete("people")
		.source(RowSource::cursor(SlowCursor {
			position: 0,
			count: 10_000,
		}))
		.physical_staging(true)
		.batch_size(1);
	let outcome =
		tokio::time::timeout(Duration::from_millis(50), bulk.execute(request, CancellationToken::new())).await;
	assert!(outcome.is_err());

	wait_for_staging_release(&conn).await;
	assert_eq!(count_rows(&conn.lock(), "people"), 20);
}

#[tokio::test]
async fn test_async_timeout() {
	let (conn, people) = shared(4);
	let bulk = AsyncBulk::new(conn.clone(), Catalog::new());

	let err = bulk
		.execute(
			BulkRequest::delete("people").source(RowSource::records(people)).timeout(Duration::ZERO),
			CancellationToken::new(),
		)
		.await
		.unwrap_err();

	assert_eq!(err.code, "TRANSFER_002");
	let conn = conn.lock();
	assert_eq!(count_rows(&conn, "people"), 4);
	assert!(staging_tables(&conn, PREFIX).is_empty());
}

#[tokio::test]
async fn test_async_null_source() {
	let (conn, _) = shared(1);
	let bulk = AsyncBulk::new(conn, Catalog::new());

	let err = bulk.execute(BulkRequest::update("people"), CancellationToken::new()).await.unwrap_err();

	assert_eq!(err.kind(), Some(ErrorKind::NullSource));
}

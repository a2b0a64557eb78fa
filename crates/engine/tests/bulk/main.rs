// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod async_cancel;
mod errors;
mod insert;
mod staging;
mod timeout;

use rusqlite::Connection;
use sqlbulk_engine::{Bulk, BulkRequest, Catalog, Record, Result, Row, Value};
use sqlbulk_testing::fixture::column_values;

pub const PREFIX: &str = "_bulk_";

#[derive(Debug, Clone)]
pub struct Person {
	pub id: Option<i64>,
	pub first_name: String,
	pub last_name: String,
	pub age: Option<i64>,
	pub email: Option<String>,
}

impl Person {
	pub fn new(i: usize) -> Self {
		Self {
			id: None,
			first_name: format!("first{}", i),
			last_name: format!("last{}", i),
			age: Some(20 + i as i64),
			email: Some(format!("person{}@example.com", i)),
		}
	}

	pub fn with_id(mut self, id: i64) -> Self {
		self.id = Some(id);
		self
	}
}

impl Record for Person {
	fn fields() -> &'static [&'static str] {
		&["id", "first_name", "last_name", "age", "email"]
	}

	fn values(&self) -> Row {
		vec![
			self.id.map(Value::Integer).unwrap_or(Value::Null),
			Value::Text(self.first_name.clone()),
			Value::Text(self.last_name.clone()),
			self.age.map(Value::Integer).unwrap_or(Value::Null),
			self.email.clone().map(Value::Text).unwrap_or(Value::Null),
		]
	}

	fn table() -> Option<&'static str> {
		Some("people")
	}
}

/// A person carrying a field the destination does not have.
#[derive(Debug, Clone)]
pub struct Contact {
	pub person: Person,
	pub nickname: String,
}

impl Record for Contact {
	fn fields() -> &'static [&'static str] {
		&["id", "first_name", "last_name", "age", "email", "nickname"]
	}

	fn values(&self) -> Row {
		let mut values = self.person.values();
		values.push(Value::Text(self.nickname.clone()));
		values
	}
}

pub fn people(count: usize) -> Vec<Person> {
	(0..count).map(Person::new).collect()
}

pub fn run(conn: &Connection, request: BulkRequest<'_>) -> Result<usize> {
	Bulk::new(conn, &Catalog::new()).execute(request)
}

/// Ids of every row of `people`, ascending.
pub fn people_ids(conn: &Connection) -> Vec<i64> {
	column_values(conn, "people", "id", "id")
		.into_iter()
		.map(|value| match value {
			Value::Integer(id) => id,
			other => panic!("unexpected id {:?}", other),
		})
		.collect()
}

/// Seed people through the bulk path and return them with their ids.
pub fn insert_people(conn: &Connection, count: usize) -> Vec<Person> {
	let people = people(count);
	let inserted = run(conn, BulkRequest::insert("people").source(sqlbulk_engine::RowSource::records(&people))).unwrap();
	assert_eq!(inserted, count);

	people.into_iter().zip(people_ids(conn)).map(|(person, id)| person.with_id(id)).collect()
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use sqlbulk_type::{TableName, Verb};

use crate::{
	BulkConfig,
	mapping::FieldMap,
	source::{RowSource, RowState},
};

/// A single bulk operation: verb, destination, rows and options.
///
/// ```ignore
/// let request = BulkRequest::delete("people")
/// 	.source(RowSource::records(&people))
/// 	.qualifiers(["first_name", "last_name"]);
/// ```
#[derive(Debug)]
pub struct BulkRequest<'a> {
	pub(crate) verb: Verb,
	pub(crate) destination: TableName,
	pub(crate) source: Option<RowSource<'a>>,
	pub(crate) mapping: Option<Vec<FieldMap>>,
	pub(crate) qualifiers: Option<Vec<String>>,
	pub(crate) config: BulkConfig,
}

impl<'a> BulkRequest<'a> {
	/// `destination` accepts `table`, `schema.table` and quoted forms. An
	/// empty name falls back to the table a record source is bound to.
	pub fn new(verb: Verb, destination: impl Into<TableName>) -> Self {
		Self {
			verb,
			destination: destination.into(),
			source: None,
			mapping: None,
			qualifiers: None,
			config: BulkConfig::default(),
		}
	}

	pub fn insert(destination: impl Into<TableName>) -> Self {
		Self::new(Verb::Insert, destination)
	}

	pub fn update(destination: impl Into<TableName>) -> Self {
		Self::new(Verb::Update, destination)
	}

	pub fn delete(destination: impl Into<TableName>) -> Self {
		Self::new(Verb::Delete, destination)
	}

	pub fn merge(destination: impl Into<TableName>) -> Self {
		Self::new(Verb::Merge, destination)
	}

	pub fn merge_delete(destination: impl Into<TableName>) -> Self {
		Self::new(Verb::MergeDelete, destination)
	}

	pub fn source(mut self, source: RowSource<'a>) -> Self {
		self.source = Some(source);
		self
	}

	pub fn mapping<I, M>(mut self, mapping: I) -> Self
	where
		I: IntoIterator<Item = M>,
		M: Into<FieldMap>,
	{
		self.mapping = Some(mapping.into_iter().map(Into::into).collect());
		self
	}

	pub fn qualifiers<I, S>(mut self, qualifiers: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.qualifiers = Some(qualifiers.into_iter().map(Into::into).collect());
		self
	}

	pub fn config(mut self, config: BulkConfig) -> Self {
		self.config = config;
		self
	}

	pub fn batch_size(mut self, batch_size: usize) -> Self {
		self.config.batch_size = batch_size;
		self
	}

	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.config.timeout = Some(timeout);
		self
	}

	pub fn keep_identity(mut self, enabled: bool) -> Self {
		self.config.keep_identity = enabled;
		self
	}

	pub fn physical_staging(mut self, enabled: bool) -> Self {
		self.config.use_physical_staging = enabled;
		self
	}

	pub fn row_state(mut self, state: RowState) -> Self {
		self.config.row_state = Some(state);
		self
	}

	pub fn verb(&self) -> Verb {
		self.verb
	}

	pub fn destination(&self) -> &TableName {
		&self.destination
	}
}

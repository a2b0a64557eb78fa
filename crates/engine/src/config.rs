// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::source::RowState;

/// SQLite's default `SQLITE_MAX_VARIABLE_NUMBER` since 3.32.
pub const MAX_BOUND_PARAMETERS: usize = 32_766;

pub const DEFAULT_BATCH_SIZE: usize = 1_000;

pub const DEFAULT_STAGING_PREFIX: &str = "_bulk_";

/// Options recognised by every bulk operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkConfig {
	/// Rows per transfer batch. Capped so one batch never binds more than
	/// [`MAX_BOUND_PARAMETERS`] values; `0` means the default.
	pub batch_size: usize,
	/// Deadline applied separately to the transfer and to the set
	/// operation. `None` is unbounded, `Some(Duration::ZERO)` expires at once.
	pub timeout: Option<Duration>,
	/// Stage into an ordinary table instead of a connection-private
	/// `TEMP` table.
	pub use_physical_staging: bool,
	/// Insert the source's identity values instead of letting SQLite
	/// generate them.
	pub keep_identity: bool,
	/// Only transfer tabular rows in this state.
	pub row_state: Option<RowState>,
	pub staging_prefix: String,
}

impl Default for BulkConfig {
	fn default() -> Self {
		Self {
			batch_size: DEFAULT_BATCH_SIZE,
			timeout: None,
			use_physical_staging: false,
			keep_identity: false,
			row_state: None,
			staging_prefix: DEFAULT_STAGING_PREFIX.to_string(),
		}
	}
}

impl BulkConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn batch_size(mut self, batch_size: usize) -> Self {
		self.batch_size = batch_size;
		self
	}

	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	pub fn physical_staging(mut self, enabled: bool) -> Self {
		self.use_physical_staging = enabled;
		self
	}

	pub fn keep_identity(mut self, enabled: bool) -> Self {
		self.keep_identity = enabled;
		self
	}

	pub fn row_state(mut self, state: RowState) -> Self {
		self.row_state = Some(state);
		self
	}

	pub fn staging_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.staging_prefix = prefix.into();
		self
	}

	/// Rows bound by one multi-row `INSERT` for a target of `columns` columns.
	pub(crate) fn rows_per_statement(&self, columns: usize) -> usize {
		let requested = if self.batch_size == 0 {
			DEFAULT_BATCH_SIZE
		} else {
			self.batch_size
		};
		let ceiling = MAX_BOUND_PARAMETERS / columns.max(1);
		requested.min(ceiling).max(1)
	}
}

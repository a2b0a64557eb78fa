// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	time::{Duration, Instant},
};

use rusqlite::Connection;
use sqlbulk_type::{
	Diagnostic, Error, Step, error,
	error::{
		BulkError,
		diagnostic::sqlite::{from_rusqlite_error, is_interrupted},
	},
};

/// Virtual machine instructions between two progress-handler polls.
const PROGRESS_INTERVAL: i32 = 1_000;

/// Cancellation flag and per-step timeout shared by every step of one
/// operation.
#[derive(Debug, Clone)]
pub(crate) struct Interrupt {
	cancelled: Arc<AtomicBool>,
	timeout: Option<Duration>,
}

impl Interrupt {
	pub(crate) fn new(timeout: Option<Duration>) -> Self {
		Self {
			cancelled: Arc::new(AtomicBool::new(false)),
			timeout,
		}
	}

	pub(crate) fn cancel(&self) {
		self.cancelled.store(true, Ordering::Release);
	}

	pub(crate) fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::Acquire)
	}

	/// Start the clock for `step`. Only the transfer and the set operation
	/// are bounded by the timeout.
	pub(crate) fn begin(&self, step: Step, destination: &str) -> Deadline {
		let timeout = match step {
			Step::Transfer | Step::Execute => self.timeout,
			_ => None,
		};
		Deadline {
			cancelled: self.cancelled.clone(),
			expires: timeout.map(|timeout| Instant::now() + timeout),
			timeout,
			step,
			destination: destination.to_string(),
		}
	}
}

pub(crate) struct Deadline {
	cancelled: Arc<AtomicBool>,
	expires: Option<Instant>,
	timeout: Option<Duration>,
	step: Step,
	destination: String,
}

impl Deadline {
	fn expired(&self) -> bool {
		self.expires.is_some_and(|expires| Instant::now() >= expires)
	}

	/// Fails once the operation was cancelled or the step ran out of time.
	pub(crate) fn check(&self) -> Result<(), Error> {
		if self.cancelled.load(Ordering::Acquire) {
			return Err(self.cancelled_error());
		}
		if self.expired() {
			return Err(self.deadline_error());
		}
		Ok(())
	}

	/// Let SQLite abort a running statement on cancellation or expiry. The
	/// handler is removed when the returned guard drops.
	pub(crate) fn install<'c>(&self, conn: &'c Connection) -> ProgressGuard<'c> {
		let cancelled = self.cancelled.clone();
		let expires = self.expires;
		let _ = conn.progress_handler(
			PROGRESS_INTERVAL,
			Some(move || {
				cancelled.load(Ordering::Acquire) || expires.is_some_and(|expires| Instant::now() >= expires)
			}),
		);
		ProgressGuard {
			conn,
		}
	}

	/// Turn a SQLite failure into the step's error. Interrupted statements
	/// become cancellation or deadline errors, anything else goes through
	/// `otherwise`.
	pub(crate) fn classify(&self, err: &rusqlite::Error, otherwise: impl FnOnce(Diagnostic) -> BulkError) -> Error {
		if is_interrupted(err) {
			if self.cancelled.load(Ordering::Acquire) {
				return self.cancelled_error();
			}
			if self.timeout.is_some() {
				return self.deadline_error();
			}
		}
		error!(otherwise(from_rusqlite_error(err)))
	}

	fn cancelled_error(&self) -> Error {
		error!(BulkError::Cancelled {
			destination: self.destination.clone(),
			step: self.step,
		})
	}

	fn deadline_error(&self) -> Error {
		error!(BulkError::DeadlineExceeded {
			destination: self.destination.clone(),
			step: self.step,
			timeout: self.timeout.unwrap_or_default(),
		})
	}
}

pub(crate) struct ProgressGuard<'c> {
	conn: &'c Connection,
}

impl Drop for ProgressGuard<'_> {
	fn drop(&mut self) {
		let _ = self.conn.progress_handler(0, None::<fn() -> bool>);
	}
}

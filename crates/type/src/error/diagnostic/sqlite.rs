// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

/// Wrap a SQLite failure so it can be attached as the cause of a bulk
/// diagnostic.
pub fn from_rusqlite_error(err: &rusqlite::Error) -> Diagnostic {
	match err {
		rusqlite::Error::SqliteFailure(failure, message) => Diagnostic {
			code: format!("SQLITE_{}", failure.extended_code),
			message: message.clone().unwrap_or_else(|| failure.to_string()),
			destination: None,
			step: None,
			label: Some(format!("{:?}", failure.code)),
			help: None,
			notes: vec![],
			cause: None,
		},
		other => Diagnostic::new("SQLITE_CLIENT", other.to_string()),
	}
}

/// Whether the statement was stopped by the progress handler or an
/// interrupt.
pub fn is_interrupted(err: &rusqlite::Error) -> bool {
	matches!(
		err,
		rusqlite::Error::SqliteFailure(failure, _) if failure.code == rusqlite::ErrorCode::OperationInterrupted
	)
}

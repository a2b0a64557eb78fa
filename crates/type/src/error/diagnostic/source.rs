// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

pub fn row_width_mismatch(row: usize, expected: usize, actual: usize) -> Diagnostic {
	Diagnostic {
		code: "ROW_001".to_string(),
		message: format!("row {} has {} values, its source schema has {} fields", row, actual, expected),
		destination: None,
		step: None,
		label: Some("row does not match its schema".to_string()),
		help: Some("every row must carry exactly one value per declared source field, in field order"
			.to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn cursor_failed(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "CURSOR_001".to_string(),
		message: format!("cursor failed: {}", reason.into()),
		destination: None,
		step: None,
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use super::{Diagnostic, IntoDiagnostic};
use crate::{Step, Verb};

#[derive(Debug, thiserror::Error)]
pub enum BulkError {
	#[error("no row source was supplied")]
	NullSource {
		destination: String,
	},

	#[error("source field '{field}' does not exist")]
	UnknownSourceField {
		destination: String,
		field: String,
		available: Vec<String>,
	},

	#[error("column '{column}' does not exist in {destination}")]
	UnknownColumn {
		destination: String,
		column: String,
		available: Vec<String>,
	},

	#[error("column '{column}' is mapped from both '{first}' and '{second}'")]
	DuplicateTarget {
		destination: String,
		column: String,
		first: String,
		second: String,
	},

	#[error("source field '{field}' is mapped to both '{first}' and '{second}'")]
	DuplicateSource {
		destination: String,
		field: String,
		first: String,
		second: String,
	},

	#[error("qualifier '{column}' is not a column of {destination}")]
	UnknownQualifier {
		destination: String,
		column: String,
	},

	#[error("qualifier '{column}' has no source field to stage from")]
	UnstageableQualifier {
		destination: String,
		column: String,
	},

	#[error("no qualifiers were supplied and {destination} has no primary key")]
	MissingQualifiers {
		destination: String,
	},

	#[error("{verb} does not accept a {shape} row source")]
	UnsupportedSource {
		destination: String,
		verb: Verb,
		shape: &'static str,
		reason: String,
	},

	#[error("{verb} has no column to assign")]
	NothingToAssign {
		destination: String,
		verb: Verb,
		qualifiers: Vec<String>,
	},

	#[error("table name was not supplied")]
	TableNameMissing,

	#[error("table {destination} does not exist")]
	TableNotFound {
		destination: String,
	},

	#[error("schema of {destination} could not be read")]
	CatalogFailed {
		destination: String,
		cause: Diagnostic,
	},

	#[error("no source field matches a column of {destination}")]
	MissingFields {
		destination: String,
		source_fields: Vec<String>,
	},

	#[error("staging table {staging} could not be created")]
	StagingCreationFailed {
		destination: String,
		staging: String,
		step: Step,
		cause: Diagnostic,
	},

	#[error("transfer into {target} failed")]
	TransferFailed {
		destination: String,
		target: String,
		rows: usize,
		cause: Diagnostic,
	},

	#[error("{verb} against {destination} failed")]
	ExecutionFailed {
		destination: String,
		verb: Verb,
		cause: Diagnostic,
	},

	#[error("{step} exceeded its deadline")]
	DeadlineExceeded {
		destination: String,
		step: Step,
		timeout: Duration,
	},

	#[error("operation was cancelled")]
	Cancelled {
		destination: String,
		step: Step,
	},
}

impl IntoDiagnostic for BulkError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			BulkError::NullSource {
				destination,
			} => Diagnostic {
				code: "SOURCE_001".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::Validate),
				label: Some("row source is absent".to_string()),
				help: Some("supply records, a cursor, a tabular buffer or primary keys".to_string()),
				notes: vec![],
				cause: None,
			},

			BulkError::UnknownSourceField {
				destination,
				field,
				available,
			} => Diagnostic {
				code: "MAPPING_001".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::ResolveMapping),
				label: Some(format!("'{}' is not a source field", field)),
				help: Some(format!("available source fields: {}", available.join(", "))),
				notes: vec![],
				cause: None,
			},

			BulkError::UnknownColumn {
				destination,
				column,
				available,
			} => Diagnostic {
				code: "MAPPING_002".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::ResolveMapping),
				label: Some(format!("'{}' is not a destination column", column)),
				help: Some(format!("available columns: {}", available.join(", "))),
				notes: vec![],
				cause: None,
			},

			BulkError::DuplicateTarget {
				destination,
				column,
				..
			} => Diagnostic {
				code: "MAPPING_003".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::ResolveMapping),
				label: Some("ambiguous target column".to_string()),
				help: Some(format!("map exactly one source field onto '{}'", column)),
				notes: vec![],
				cause: None,
			},

			BulkError::DuplicateSource {
				destination,
				..
			} => Diagnostic {
				code: "MAPPING_004".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::ResolveMapping),
				label: Some("source field mapped twice".to_string()),
				help: Some("each source field may feed at most one column".to_string()),
				notes: vec![],
				cause: None,
			},

			BulkError::UnknownQualifier {
				destination,
				..
			} => Diagnostic {
				code: "MAPPING_005".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::ResolveMapping),
				label: Some("unknown qualifier".to_string()),
				help: None,
				notes: vec![],
				cause: None,
			},

			BulkError::UnstageableQualifier {
				destination,
				column,
			} => Diagnostic {
				code: "MAPPING_006".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::ResolveMapping),
				label: Some("qualifier cannot be staged".to_string()),
				help: Some(format!("add a source field named '{}' or map one onto it", column)),
				notes: vec![],
				cause: None,
			},

			BulkError::MissingQualifiers {
				destination,
			} => Diagnostic {
				code: "MAPPING_007".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::ResolveMapping),
				label: Some("no join columns".to_string()),
				help: Some("pass qualifier columns that identify destination rows".to_string()),
				notes: vec![],
				cause: None,
			},

			BulkError::UnsupportedSource {
				destination,
				reason,
				..
			} => Diagnostic {
				code: "MAPPING_008".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::Validate),
				label: None,
				help: None,
				notes: vec![reason],
				cause: None,
			},

			BulkError::NothingToAssign {
				destination,
				qualifiers,
				..
			} => Diagnostic {
				code: "MAPPING_009".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::ResolveMapping),
				label: Some("every mapped column is a qualifier or identity".to_string()),
				help: Some("map at least one column besides the qualifiers".to_string()),
				notes: vec![format!("qualifiers: {}", qualifiers.join(", "))],
				cause: None,
			},

			BulkError::TableNameMissing => Diagnostic {
				code: "SCHEMA_001".to_string(),
				message,
				destination: None,
				step: Some(Step::ResolveMapping),
				label: None,
				help: Some("pass a table name or bind the record type to a table".to_string()),
				notes: vec![],
				cause: None,
			},

			BulkError::TableNotFound {
				destination,
			} => Diagnostic {
				code: "SCHEMA_002".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::ResolveMapping),
				label: Some("unknown table".to_string()),
				help: None,
				notes: vec![],
				cause: None,
			},

			BulkError::CatalogFailed {
				destination,
				cause,
			} => Diagnostic {
				code: "SCHEMA_003".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::ResolveMapping),
				label: None,
				help: None,
				notes: vec![],
				cause: Some(Box::new(cause)),
			},

			BulkError::MissingFields {
				destination,
				source_fields,
			} => Diagnostic {
				code: "FIELDS_001".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::ResolveMapping),
				label: Some("no field mapping could be derived".to_string()),
				help: Some("check the table name or pass an explicit mapping".to_string()),
				notes: vec![format!("source fields: {}", source_fields.join(", "))],
				cause: None,
			},

			BulkError::StagingCreationFailed {
				destination,
				staging,
				step,
				cause,
			} => Diagnostic {
				code: "STAGING_001".to_string(),
				message,
				destination: Some(destination),
				step: Some(step),
				label: None,
				help: None,
				notes: vec![format!("staging table: {}", staging)],
				cause: Some(Box::new(cause)),
			},

			BulkError::TransferFailed {
				destination,
				rows,
				cause,
				..
			} => Diagnostic {
				code: "TRANSFER_001".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::Transfer),
				label: None,
				help: None,
				notes: vec![format!("{} rows were transferred before the failure and rolled back", rows)],
				cause: Some(Box::new(cause)),
			},

			BulkError::ExecutionFailed {
				destination,
				cause,
				..
			} => Diagnostic {
				code: "EXECUTE_001".to_string(),
				message,
				destination: Some(destination),
				step: Some(Step::Execute),
				label: None,
				help: None,
				notes: vec!["the destination was left unchanged".to_string()],
				cause: Some(Box::new(cause)),
			},

			BulkError::DeadlineExceeded {
				destination,
				step,
				timeout,
			} => Diagnostic {
				code: match step {
					Step::Transfer => "TRANSFER_002".to_string(),
					_ => "EXECUTE_002".to_string(),
				},
				message,
				destination: Some(destination),
				step: Some(step),
				label: Some(format!("deadline of {}ms exceeded", timeout.as_millis())),
				help: Some("raise the timeout or lower the batch size".to_string()),
				notes: vec![],
				cause: None,
			},

			BulkError::Cancelled {
				destination,
				step,
			} => Diagnostic {
				code: "CANCELLED_001".to_string(),
				message,
				destination: Some(destination),
				step: Some(step),
				label: None,
				help: None,
				notes: vec!["staging was released before the cancellation surfaced".to_string()],
				cause: None,
			},
		}
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Step;

pub mod source;
pub mod sqlite;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	pub code: String,
	pub message: String,
	/// Destination table the failing operation targeted.
	pub destination: Option<String>,
	pub step: Option<Step>,
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
	pub cause: Option<Box<Diagnostic>>,
}

impl Diagnostic {
	pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			code: code.into(),
			message: message.into(),
			destination: None,
			step: None,
			label: None,
			help: None,
			notes: vec![],
			cause: None,
		}
	}

	pub fn with_step(mut self, step: Step) -> Self {
		self.step = Some(step);
		self
	}

	pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
		self.destination = Some(destination.into());
		self
	}
}

/// Failure categories of a bulk operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
	NullSource,
	InvalidMapping,
	UnresolvableSchema,
	MissingFields,
	StagingCreationFailed,
	TransferFailed,
	ExecutionFailed,
	Cancelled,
}

impl ErrorKind {
	pub fn from_code(code: &str) -> Option<Self> {
		let family = code.split('_').next()?;
		match family {
			"SOURCE" => Some(ErrorKind::NullSource),
			"MAPPING" => Some(ErrorKind::InvalidMapping),
			"SCHEMA" => Some(ErrorKind::UnresolvableSchema),
			"FIELDS" => Some(ErrorKind::MissingFields),
			"STAGING" => Some(ErrorKind::StagingCreationFailed),
			"TRANSFER" => Some(ErrorKind::TransferFailed),
			"EXECUTE" => Some(ErrorKind::ExecutionFailed),
			"CANCELLED" => Some(ErrorKind::Cancelled),
			_ => None,
		}
	}
}

impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			ErrorKind::NullSource => f.write_str("null source"),
			ErrorKind::InvalidMapping => f.write_str("invalid mapping"),
			ErrorKind::UnresolvableSchema => f.write_str("unresolvable schema"),
			ErrorKind::MissingFields => f.write_str("missing fields"),
			ErrorKind::StagingCreationFailed => f.write_str("staging creation failed"),
			ErrorKind::TransferFailed => f.write_str("transfer failed"),
			ErrorKind::ExecutionFailed => f.write_str("execution failed"),
			ErrorKind::Cancelled => f.write_str("cancelled"),
		}
	}
}

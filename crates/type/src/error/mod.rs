// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::{Deref, DerefMut},
};

mod bulk;
pub mod diagnostic;
mod r#macro;
mod render;

pub use bulk::BulkError;
pub use diagnostic::{Diagnostic, ErrorKind};
pub use render::DefaultRenderer;

use crate::Step;

pub trait IntoDiagnostic {
	fn into_diagnostic(self) -> Diagnostic;
}

impl IntoDiagnostic for Diagnostic {
	fn into_diagnostic(self) -> Diagnostic {
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Diagnostic);

impl Deref for Error {
	type Target = Diagnostic;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Error {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let out = DefaultRenderer::render_string(&self.0);
		f.write_str(out.as_str())
	}
}

impl Error {
	pub fn diagnostic(self) -> Diagnostic {
		self.0
	}

	/// The failure category, `None` for diagnostics raised outside the
	/// bulk pipeline (for example by a caller's cursor).
	pub fn kind(&self) -> Option<ErrorKind> {
		ErrorKind::from_code(&self.0.code)
	}

	pub fn is_cancelled(&self) -> bool {
		self.kind() == Some(ErrorKind::Cancelled)
	}

	pub fn step(&self) -> Option<Step> {
		self.0.step
	}
}

impl std::error::Error for Error {}

impl From<BulkError> for Error {
	fn from(err: BulkError) -> Self {
		Error(err.into_diagnostic())
	}
}

impl From<Diagnostic> for Error {
	fn from(diagnostic: Diagnostic) -> Self {
		Error(diagnostic)
	}
}

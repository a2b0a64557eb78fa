// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Build an [`Error`](crate::error::Error) from anything that converts into
/// a diagnostic.
#[macro_export]
macro_rules! error {
	($diagnostic:expr) => {
		$crate::error::Error($crate::error::IntoDiagnostic::into_diagnostic($diagnostic))
	};
}

/// Return early with an [`Error`](crate::error::Error).
#[macro_export]
macro_rules! return_error {
	($diagnostic:expr) => {
		return Err($crate::error!($diagnostic))
	};
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// The set operation a bulk request applies to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verb {
	Insert,
	Update,
	Delete,
	/// Insert unmatched rows, update matched rows.
	Merge,
	/// As `Merge`, and delete destination rows the source does not contain.
	MergeDelete,
}

impl Verb {
	/// Whether the verb joins staged rows against the destination.
	pub fn is_staged(&self) -> bool {
		!matches!(self, Verb::Insert)
	}

	/// Whether rows may be inserted into the destination.
	pub fn inserts(&self) -> bool {
		matches!(self, Verb::Insert | Verb::Merge | Verb::MergeDelete)
	}

	/// Lowercase tag used in staging names.
	pub fn tag(&self) -> &'static str {
		match self {
			Verb::Insert => "insert",
			Verb::Update => "update",
			Verb::Delete => "delete",
			Verb::Merge => "merge",
			Verb::MergeDelete => "mergedel",
		}
	}
}

impl Display for Verb {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Verb::Insert => f.write_str("INSERT"),
			Verb::Update => f.write_str("UPDATE"),
			Verb::Delete => f.write_str("DELETE"),
			Verb::Merge => f.write_str("MERGE"),
			Verb::MergeDelete => f.write_str("MERGE DELETE"),
		}
	}
}

/// Pipeline step a bulk operation is in, recorded on every diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
	Validate,
	ResolveMapping,
	AcquireStaging,
	Transfer,
	IndexStaging,
	Execute,
	ReleaseStaging,
}

impl Display for Step {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Step::Validate => f.write_str("validate inputs"),
			Step::ResolveMapping => f.write_str("resolve mapping"),
			Step::AcquireStaging => f.write_str("acquire staging"),
			Step::Transfer => f.write_str("transfer rows"),
			Step::IndexStaging => f.write_str("index staging"),
			Step::Execute => f.write_str("execute set operation"),
			Step::ReleaseStaging => f.write_str("release staging"),
		}
	}
}

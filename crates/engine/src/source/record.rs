// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sqlbulk_type::Row;

/// A typed record with a fixed field list.
pub trait Record {
	fn fields() -> &'static [&'static str];

	/// One value per entry of [`Record::fields`], in the same order.
	fn values(&self) -> Row;

	/// Table the record type maps to when a request names none.
	fn table() -> Option<&'static str> {
		None
	}
}

impl<R: Record> Record for &R {
	fn fields() -> &'static [&'static str] {
		R::fields()
	}

	fn values(&self) -> Row {
		(*self).values()
	}

	fn table() -> Option<&'static str> {
		R::table()
	}
}

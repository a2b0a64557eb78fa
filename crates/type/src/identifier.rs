// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Table identifiers and identifier quoting.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Quote an identifier for use in generated SQL.
pub fn quote_identifier(ident: &str) -> String {
	format!("\"{}\"", ident.replace('"', "\"\""))
}

/// A destination table, optionally qualified by an attached schema name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
	pub schema: Option<String>,
	pub name: String,
}

impl TableName {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			schema: None,
			name: name.into(),
		}
	}

	pub fn with_schema(schema: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			schema: Some(schema.into()),
			name: name.into(),
		}
	}

	/// Parse `table`, `schema.table` or their quoted forms (`"a"."b"`,
	/// `[a].[b]`, `` `a`.`b` ``).
	pub fn parse(input: &str) -> Self {
		let mut parts = split_unquoted_dots(input.trim());
		let name = parts.pop().map(|part| unquote(&part)).unwrap_or_default();
		let schema = if parts.is_empty() {
			None
		} else {
			Some(parts.iter().map(|part| unquote(part)).collect::<Vec<_>>().join("."))
		};

		Self {
			schema,
			name,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.name.trim().is_empty()
	}

	pub fn schema_or_main(&self) -> &str {
		self.schema.as_deref().unwrap_or("main")
	}

	/// The fully quoted form used in generated statements.
	pub fn quoted(&self) -> String {
		match &self.schema {
			Some(schema) => format!("{}.{}", quote_identifier(schema), quote_identifier(&self.name)),
			None => quote_identifier(&self.name),
		}
	}

	/// Case-insensitive key, SQLite treats identifiers case-insensitively.
	/// Unqualified names get their own key since they may resolve to `temp`.
	pub fn cache_key(&self) -> String {
		match &self.schema {
			Some(schema) => format!("{}.{}", schema.to_lowercase(), self.name.to_lowercase()),
			None => format!("*.{}", self.name.to_lowercase()),
		}
	}
}

impl Display for TableName {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match &self.schema {
			Some(schema) => write!(f, "{}.{}", schema, self.name),
			None => f.write_str(&self.name),
		}
	}
}

impl From<&str> for TableName {
	fn from(value: &str) -> Self {
		Self::parse(value)
	}
}

impl From<String> for TableName {
	fn from(value: String) -> Self {
		Self::parse(&value)
	}
}

fn split_unquoted_dots(input: &str) -> Vec<String> {
	let mut parts = Vec::new();
	let mut current = String::new();
	let mut closing: Option<char> = None;

	for ch in input.chars() {
		match closing {
			Some(close) => {
				current.push(ch);
				if ch == close {
					closing = None;
				}
			}
			None => match ch {
				'.' => parts.push(std::mem::take(&mut current)),
				'"' => {
					closing = Some('"');
					current.push(ch);
				}
				'`' => {
					closing = Some('`');
					current.push(ch);
				}
				'[' => {
					closing = Some(']');
					current.push(ch);
				}
				_ => current.push(ch),
			},
		}
	}
	parts.push(current);
	parts
}

fn unquote(part: &str) -> String {
	let part = part.trim();
	let bytes = part.as_bytes();
	if bytes.len() >= 2 {
		let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
		let inner = &part[1..part.len() - 1];
		match (first, last) {
			(b'"', b'"') => return inner.replace("\"\"", "\""),
			(b'`', b'`') => return inner.replace("``", "`"),
			(b'[', b']') => return inner.to_string(),
			_ => {}
		}
	}
	part.to_string()
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod error;
pub mod identifier;
pub mod operation;
pub mod value;

pub use error::{Diagnostic, Error, ErrorKind, IntoDiagnostic};
pub use identifier::{TableName, quote_identifier};
pub use operation::{Step, Verb};
pub use value::{Row, Value};

pub type Result<T> = std::result::Result<T, Error>;

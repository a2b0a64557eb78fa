// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod catalog;
mod reader;
pub mod table_def;

pub use catalog::Catalog;
pub use table_def::{ColumnDef, TableDef};

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod async_bulk;
mod config;
mod interrupt;
pub mod mapping;
mod operation;
mod request;
mod set_operation;
pub mod source;
pub mod staging;
mod transfer;

pub use async_bulk::{AsyncBulk, SharedConnection};
pub use config::{BulkConfig, DEFAULT_BATCH_SIZE, DEFAULT_STAGING_PREFIX, MAX_BOUND_PARAMETERS};
pub use mapping::{FieldMap, MappingPlan};
pub use operation::Bulk;
pub use request::BulkRequest;
pub use source::{Cursor, IterCursor, Record, RowSource, RowState, SourceSchema, Tabular};
pub use sqlbulk_catalog::Catalog;
pub use sqlbulk_type::{Error, ErrorKind, Result, Row, Step, TableName, Value, Verb};
pub use staging::StagingMode;
pub use tokio_util::sync::CancellationToken;

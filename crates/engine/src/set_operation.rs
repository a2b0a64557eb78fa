// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Set-based statements joining the destination with its staging table on
//! the qualifier columns. `NULL` never equals `NULL`, so a row with a null
//! qualifier matches nothing.

use rusqlite::Connection;
use sqlbulk_type::{Diagnostic, Result, Verb, error::BulkError, quote_identifier};
use tracing::{debug, instrument, warn};

use crate::{interrupt::Deadline, mapping::MappingPlan, staging::StagingDef};

const SAVEPOINT: &str = "sqlbulk_merge";

const DEST: &str = "d";
const STAGE: &str = "s";

/// The statements `verb` runs, in order.
pub(crate) fn statements(verb: Verb, plan: &MappingPlan, staging: &StagingDef, keep_identity: bool) -> Vec<String> {
	let destination = plan.table.table_name().quoted();
	let stage = staging.quoted();
	let matched = join_predicate(&plan.qualifiers);

	let delete_matched = || {
		format!(
			"DELETE FROM {dest} AS {d} WHERE EXISTS (SELECT 1 FROM {stage} AS {s} WHERE {matched})",
			dest = destination,
			d = DEST,
			stage = stage,
			s = STAGE,
			matched = matched
		)
	};
	let update_matched = || {
		let assignable = plan.assignable();
		if assignable.is_empty() {
			return None;
		}
		let set: Vec<String> = assignable
			.iter()
			.map(|column| format!("{col} = {s}.{col}", col = quote_identifier(column), s = STAGE))
			.collect();
		Some(format!(
			"UPDATE {dest} AS {d} SET {set} FROM {stage} AS {s} WHERE {matched}",
			dest = destination,
			d = DEST,
			set = set.join(", "),
			stage = stage,
			s = STAGE,
			matched = matched
		))
	};
	let insert_unmatched = || {
		let columns: Vec<String> = plan.insertable(keep_identity).iter().map(|c| quote_identifier(c)).collect();
		let selected: Vec<String> = columns.iter().map(|c| format!("{}.{}", STAGE, c)).collect();
		format!(
			"INSERT INTO {dest} ({columns}) SELECT {selected} FROM {stage} AS {s} WHERE NOT EXISTS (SELECT 1 FROM {dest} AS {d} WHERE {matched})",
			dest = destination,
			columns = columns.join(", "),
			selected = selected.join(", "),
			stage = stage,
			s = STAGE,
			d = DEST,
			matched = matched
		)
	};
	let delete_unmatched = || {
		format!(
			"DELETE FROM {dest} AS {d} WHERE NOT EXISTS (SELECT 1 FROM {stage} AS {s} WHERE {matched})",
			dest = destination,
			d = DEST,
			stage = stage,
			s = STAGE,
			matched = matched
		)
	};

	match verb {
		Verb::Insert => vec![],
		Verb::Delete => vec![delete_matched()],
		Verb::Update => update_matched().into_iter().collect(),
		Verb::Merge => update_matched().into_iter().chain([insert_unmatched()]).collect(),
		// delete before insert so freshly inserted rows are not judged unmatched
		Verb::MergeDelete => {
			update_matched().into_iter().chain([delete_unmatched(), insert_unmatched()]).collect()
		}
	}
}

fn join_predicate(qualifiers: &[String]) -> String {
	qualifiers
		.iter()
		.map(|q| {
			let q = quote_identifier(q);
			format!("{d}.{q} = {s}.{q}", d = DEST, s = STAGE, q = q)
		})
		.collect::<Vec<_>>()
		.join(" AND ")
}

/// Apply `verb` to the destination. Returns the number of affected rows.
/// Statements of a merge commit together or not at all.
#[instrument(name = "bulk::execute", level = "debug", skip_all, fields(verb = %verb, staging = %staging.name))]
pub(crate) fn execute(
	conn: &Connection,
	verb: Verb,
	plan: &MappingPlan,
	staging: &StagingDef,
	keep_identity: bool,
	deadline: &Deadline,
) -> Result<usize> {
	let destination = plan.destination();
	let statements = statements(verb, plan, staging, keep_identity);
	let failed = |cause: Diagnostic| BulkError::ExecutionFailed {
		destination: destination.clone(),
		verb,
		cause,
	};

	deadline.check()?;
	let atomic = statements.len() > 1;
	if atomic {
		conn.execute_batch(&format!("SAVEPOINT {}", SAVEPOINT)).map_err(|err| deadline.classify(&err, failed))?;
	}

	let result = {
		let _progress = deadline.install(conn);
		let mut affected = 0usize;
		let mut outcome = Ok(());
		for sql in &statements {
			if let Err(err) = deadline.check() {
				outcome = Err(err);
				break;
			}
			match conn.execute(sql, []) {
				Ok(changes) => affected += changes,
				Err(err) => {
					outcome = Err(deadline.classify(&err, failed));
					break;
				}
			}
		}
		outcome.map(|()| affected)
	};

	if atomic {
		let finish = match result {
			Ok(_) => format!("RELEASE {}", SAVEPOINT),
			Err(_) => format!("ROLLBACK TO {0}; RELEASE {0}", SAVEPOINT),
		};
		if let Err(err) = conn.execute_batch(&finish) {
			if result.is_ok() {
				return Err(deadline.classify(&err, failed));
			}
			warn!(error = %err, "failed to roll back set operation");
		}
	}

	let affected = result?;
	debug!(affected, statements = statements.len(), "set operation applied");
	Ok(affected)
}

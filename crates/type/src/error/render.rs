// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::Write;

use super::Diagnostic;

pub struct DefaultRenderer;

impl DefaultRenderer {
	pub fn render_string(diagnostic: &Diagnostic) -> String {
		let mut output = String::new();
		Self::render_into(&mut output, diagnostic, 0);
		output
	}

	fn render_into(output: &mut String, d: &Diagnostic, depth: usize) {
		let indent = "  ".repeat(depth);

		if depth == 0 {
			let _ = writeln!(output, "error[{}]: {}", d.code, d.message);
		} else {
			let _ = writeln!(output, "{}caused by: error[{}]: {}", indent, d.code, d.message);
		}

		match (&d.destination, &d.step) {
			(Some(destination), Some(step)) => {
				let _ = writeln!(output, "{}  --> {} ({})", indent, destination, step);
			}
			(Some(destination), None) => {
				let _ = writeln!(output, "{}  --> {}", indent, destination);
			}
			(None, Some(step)) => {
				let _ = writeln!(output, "{}  --> ({})", indent, step);
			}
			(None, None) => {}
		}

		if let Some(label) = &d.label {
			let _ = writeln!(output, "{}   = {}", indent, label);
		}

		if let Some(help) = &d.help {
			let _ = writeln!(output, "{}help: {}", indent, help);
		}

		for note in &d.notes {
			let _ = writeln!(output, "{}note: {}", indent, note);
		}

		if let Some(cause) = &d.cause {
			Self::render_into(output, cause, depth + 1);
		}
	}
}

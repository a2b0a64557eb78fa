// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub mod fixture;
pub mod tempdir;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a `fmt` subscriber once per test binary. `RUST_LOG` overrides the
/// default `info` filter.
pub fn init_tracing() {
	TRACING.call_once(|| {
		use tracing_subscriber::{EnvFilter, fmt};

		let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
		let _ = fmt().with_env_filter(filter).with_target(false).with_test_writer().try_init();
	});
}

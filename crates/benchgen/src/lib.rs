//! Shared entry point for the standalone fixture generators

use anyhow::{Context, Result};
use benchgen_core::fixtures::builtin_config;
use benchgen_core::FixtureSpec;
use log::debug;
use std::path::Path;

/// Logging for generator binaries: silent unless something goes wrong,
/// overridable through `RUST_LOG`.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

/// Generate one built-in fixture into the current working directory
pub fn run(fixture: FixtureSpec) -> Result<()> {
    init_logging();
    debug!("Generating fixture '{}'", fixture.name);

    let config = builtin_config(&fixture, Path::new("."))?;
    benchgen_core::generate(&config)
        .with_context(|| format!("failed to generate fixture '{}'", fixture.name))
}

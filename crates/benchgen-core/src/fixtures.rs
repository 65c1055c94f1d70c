//! Built-in benchmark fixtures
//!
//! | Name | Template | Output | Length | Helpers |
//! |---|---|---|---|---|
//! | `call-func-args` | `call_func_args.rs.tmpl` | `call_func_args_bench.rs` | 30 | Items, Sum |
//! | `new-and-init` | `new_and_init.rs.tmpl` | `new_and_init_bench.rs` | 60 | Items |

use crate::error::Result;
use crate::generator::GenerationConfig;
use crate::helpers::{ITEMS, SUM};
use crate::manifest::{FixtureSpec, Manifest};
use std::path::{Path, PathBuf};

/// Directory holding the built-in templates, fixed at build time
pub const TEMPLATE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

pub const CALL_FUNC_ARGS: &str = "call-func-args";
pub const NEW_AND_INIT: &str = "new-and-init";

pub fn template_dir() -> PathBuf {
    PathBuf::from(TEMPLATE_DIR)
}

/// Calls a 30-argument function and checks the total against `Sum(30)`
pub fn call_func_args() -> FixtureSpec {
    FixtureSpec {
        name: CALL_FUNC_ARGS.to_string(),
        template: PathBuf::from("call_func_args.rs.tmpl"),
        output: PathBuf::from("call_func_args_bench.rs"),
        length: 30,
        helpers: vec![ITEMS.to_string(), SUM.to_string()],
    }
}

/// Builds a 60-field struct by literal vs. by field-wise initialization
pub fn new_and_init() -> FixtureSpec {
    FixtureSpec {
        name: NEW_AND_INIT.to_string(),
        template: PathBuf::from("new_and_init.rs.tmpl"),
        output: PathBuf::from("new_and_init_bench.rs"),
        length: 60,
        helpers: vec![ITEMS.to_string()],
    }
}

/// Manifest of the built-in fixtures, templates from [`TEMPLATE_DIR`]
pub fn builtin_manifest() -> Result<Manifest> {
    Manifest::new(vec![call_func_args(), new_and_init()], template_dir())
}

/// Config for a built-in fixture, output relative to `out_dir`
pub fn builtin_config(fixture: &FixtureSpec, out_dir: &Path) -> Result<GenerationConfig> {
    fixture.to_config(&template_dir(), out_dir)
}

//! Template module - text substitution engine for fixture templates
//!
//! Templates are compiled once into a node tree and then rendered against a
//! TOML data context plus an explicit set of [`Helpers`](crate::helpers::Helpers).
//!
//! ## Syntax
//!
//! - Basic placeholders: `{{key}}` or `{{ key }}` (spaces optional)
//! - Nested access: `{{nested.key}}`
//! - Helper calls: `{{ Sum(Length) }}`; arguments are keys, integers or calls
//! - Iteration: `{{ each Items(Length) |i| }} ... {{ /each }}`, also over array keys
//! - Escape sequences: `\{{literal}}`; `\\` before `{{` collapses to one backslash
//! - A newline directly after `{{each ...}}` or `{{/each}}` is dropped

pub mod engine;
pub mod error;

pub use engine::{render, Template, TemplateContext, TemplateEngine, LENGTH_KEY};
pub use error::TemplateError;

// Core modules
pub mod error;
pub mod fixtures;
pub mod generator;
pub mod helpers;
pub mod manifest;
pub mod template;

// Re-export commonly used types
pub use error::{BenchgenError, Result};
pub use generator::{generate, render, GenerationConfig};
pub use helpers::{Helper, Helpers};
pub use manifest::{FixtureSpec, Manifest};

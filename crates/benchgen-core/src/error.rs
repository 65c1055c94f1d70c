use crate::template::TemplateError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchgenError {
    // Template errors
    #[error("TEMPLATE_NOT_FOUND: template '{}' does not exist", .path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("TEMPLATE_READ_ERROR: failed to read template '{}': {source}", .path.display())]
    TemplateRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TEMPLATE_PARSE_ERROR: {}: {source}", .path.display())]
    TemplateParse {
        path: PathBuf,
        source: TemplateError,
    },

    #[error("RENDER_ERROR: {}: {source}", .path.display())]
    Render {
        path: PathBuf,
        source: TemplateError,
    },

    // Output errors
    #[error("OUTPUT_WRITE_ERROR: failed to write '{}': {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // Manifest errors
    #[error("MANIFEST_READ_ERROR: failed to read manifest '{}': {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("MANIFEST_INVALID: {0}")]
    ManifestInvalid(String),

    #[error("UNKNOWN_FIXTURE: fixture '{name}' is not defined (available: {available})")]
    UnknownFixture { name: String, available: String },
}

impl BenchgenError {
    /// Stable code prefix of the message, e.g. `TEMPLATE_NOT_FOUND`
    pub fn code(&self) -> &'static str {
        match self {
            BenchgenError::TemplateNotFound { .. } => "TEMPLATE_NOT_FOUND",
            BenchgenError::TemplateRead { .. } => "TEMPLATE_READ_ERROR",
            BenchgenError::TemplateParse { .. } => "TEMPLATE_PARSE_ERROR",
            BenchgenError::Render { .. } => "RENDER_ERROR",
            BenchgenError::OutputWrite { .. } => "OUTPUT_WRITE_ERROR",
            BenchgenError::ManifestRead { .. } => "MANIFEST_READ_ERROR",
            BenchgenError::ManifestInvalid(_) => "MANIFEST_INVALID",
            BenchgenError::UnknownFixture { .. } => "UNKNOWN_FIXTURE",
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchgenError>;

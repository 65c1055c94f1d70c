//! Fixture generation: template file + length + helpers → output file

use crate::error::{BenchgenError, Result};
use crate::helpers::Helpers;
use crate::template::{Template, TemplateContext};
use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Everything one generator invocation needs
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// File to create or overwrite
    pub output_path: PathBuf,
    /// Template source file
    pub template_path: PathBuf,
    /// Value exposed to the template as `Length`
    pub length: u32,
    /// Helpers callable from the template
    pub helpers: Helpers,
}

impl GenerationConfig {
    /// Config with the standard helper set (`Items`, `Sum`)
    pub fn new(
        output_path: impl Into<PathBuf>,
        template_path: impl Into<PathBuf>,
        length: u32,
    ) -> Self {
        Self {
            output_path: output_path.into(),
            template_path: template_path.into(),
            length,
            helpers: Helpers::standard(),
        }
    }

    pub fn with_helpers(mut self, helpers: Helpers) -> Self {
        self.helpers = helpers;
        self
    }

    /// Same job, output placed under `dir` (relative outputs only)
    pub fn with_output_dir(mut self, dir: &Path) -> Self {
        if self.output_path.is_relative() {
            self.output_path = dir.join(&self.output_path);
        }
        self
    }
}

/// Read and parse the template named by `config`
pub fn load_template(config: &GenerationConfig) -> Result<Template> {
    let path = &config.template_path;
    let source = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BenchgenError::TemplateNotFound { path: path.clone() }
        } else {
            BenchgenError::TemplateRead {
                path: path.clone(),
                source: e,
            }
        }
    })?;

    Template::compile(&source, &config.helpers).map_err(|e| BenchgenError::TemplateParse {
        path: path.clone(),
        source: e,
    })
}

/// Render the fixture in memory without touching the output path
pub fn render(config: &GenerationConfig) -> Result<String> {
    let template = load_template(config)?;
    debug!(
        "Parsed template {} (helpers: {})",
        config.template_path.display(),
        config.helpers.names().collect::<Vec<_>>().join(", ")
    );

    let context = TemplateContext::with_length(config.length);
    template
        .render(&context, &config.helpers)
        .map_err(|e| BenchgenError::Render {
            path: config.template_path.clone(),
            source: e,
        })
}

/// Render the fixture and write it to `config.output_path`.
///
/// The output is only touched after rendering succeeded, and is replaced
/// atomically: a failed run leaves any previous file as it was.
pub fn generate(config: &GenerationConfig) -> Result<()> {
    let rendered = render(config)?;
    write_output(&config.output_path, &rendered)?;
    info!(
        "Generated {} ({} bytes, Length = {})",
        config.output_path.display(),
        rendered.len(),
        config.length
    );
    Ok(())
}

/// Write `content` through a temp file in the target directory, then persist it.
///
/// A fresh output gets the umask default mode of a plain create; an existing
/// output keeps its mode.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let write_err = |source: std::io::Error| BenchgenError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let existing_permissions = std::fs::metadata(path)
        .ok()
        .filter(|meta| meta.is_file())
        .map(|meta| meta.permissions());

    let mut temp_file = output_file_builder()
        .tempfile_in(parent)
        .map_err(write_err)?;
    temp_file.write_all(content.as_bytes()).map_err(write_err)?;
    if let Some(permissions) = existing_permissions {
        temp_file
            .as_file()
            .set_permissions(permissions)
            .map_err(write_err)?;
    }
    temp_file.as_file().sync_all().map_err(write_err)?;
    temp_file.persist(path).map_err(|e| write_err(e.error))?;

    debug!("Persisted {}", path.display());
    Ok(())
}

/// Temp files are owner-only by default; request 0666 so the umask applies
#[cfg(unix)]
fn output_file_builder() -> tempfile::Builder<'static, 'static> {
    use std::os::unix::fs::PermissionsExt;

    let mut builder = tempfile::Builder::new();
    builder.permissions(std::fs::Permissions::from_mode(0o666));
    builder
}

#[cfg(not(unix))]
fn output_file_builder() -> tempfile::Builder<'static, 'static> {
    tempfile::Builder::new()
}

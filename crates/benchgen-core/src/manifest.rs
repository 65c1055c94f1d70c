//! Fixture manifest: the list of generator jobs, built in or loaded from TOML
//!
//! ```toml
//! [[fixture]]
//! name = "call-func-args"
//! template = "call_func_args.rs.tmpl"
//! output = "call_func_args_bench.rs"
//! length = 30
//! helpers = ["Items", "Sum"]
//! ```

use crate::error::{BenchgenError, Result};
use crate::generator::GenerationConfig;
use crate::helpers::Helpers;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One generator job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSpec {
    pub name: String,
    /// Template path, relative to the manifest's template directory
    pub template: PathBuf,
    /// Output path, relative to the output directory
    pub output: PathBuf,
    pub length: u32,
    /// Names from the standard helper catalogue
    #[serde(default)]
    pub helpers: Vec<String>,
}

impl FixtureSpec {
    /// Build the generation config for this job
    pub fn to_config(&self, template_dir: &Path, out_dir: &Path) -> Result<GenerationConfig> {
        let helpers = Helpers::from_standard_names(self.helpers.as_slice()).map_err(|name| {
            BenchgenError::ManifestInvalid(format!(
                "fixture '{}': unknown helper '{}'",
                self.name, name
            ))
        })?;

        Ok(GenerationConfig {
            output_path: self.output.clone(),
            template_path: template_dir.join(&self.template),
            length: self.length,
            helpers,
        }
        .with_output_dir(out_dir))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "fixture", default)]
    pub fixtures: Vec<FixtureSpec>,

    /// Directory templates are resolved against
    #[serde(skip)]
    template_dir: PathBuf,
}

impl Manifest {
    pub fn new(fixtures: Vec<FixtureSpec>, template_dir: impl Into<PathBuf>) -> Result<Self> {
        let manifest = Self {
            fixtures,
            template_dir: template_dir.into(),
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a manifest file; templates resolve relative to its directory
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| BenchgenError::ManifestRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let template_dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::from_toml_str(&content, template_dir)
    }

    pub fn from_toml_str(content: &str, template_dir: impl Into<PathBuf>) -> Result<Self> {
        let parsed: Manifest = toml::from_str(content)
            .map_err(|e| BenchgenError::ManifestInvalid(format!("failed to parse TOML: {}", e)))?;
        Self::new(parsed.fixtures, template_dir)
    }

    fn validate(&self) -> Result<()> {
        if self.fixtures.is_empty() {
            return Err(BenchgenError::ManifestInvalid(
                "manifest defines no fixtures".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for fixture in &self.fixtures {
            if fixture.name.trim().is_empty() {
                return Err(BenchgenError::ManifestInvalid(
                    "fixture name must not be empty".to_string(),
                ));
            }
            if !seen.insert(fixture.name.as_str()) {
                return Err(BenchgenError::ManifestInvalid(format!(
                    "duplicate fixture name '{}'",
                    fixture.name
                )));
            }
            if let Err(name) = Helpers::from_standard_names(fixture.helpers.as_slice()) {
                return Err(BenchgenError::ManifestInvalid(format!(
                    "fixture '{}': unknown helper '{}'",
                    fixture.name, name
                )));
            }
        }
        Ok(())
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fixtures.iter().map(|f| f.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&FixtureSpec> {
        self.fixtures.iter().find(|f| f.name == name)
    }

    /// Fixtures named in `names`, in the given order; all fixtures when empty
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&FixtureSpec>> {
        if names.is_empty() {
            return Ok(self.fixtures.iter().collect());
        }
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name).ok_or_else(|| BenchgenError::UnknownFixture {
                    name: name.to_string(),
                    available: self.names().collect::<Vec<_>>().join(", "),
                })
            })
            .collect()
    }

    /// Generation config for `fixture` with outputs placed under `out_dir`
    pub fn config_for(&self, fixture: &FixtureSpec, out_dir: &Path) -> Result<GenerationConfig> {
        fixture.to_config(&self.template_dir, out_dir)
    }
}

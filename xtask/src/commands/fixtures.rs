use crate::commands::fixtures_verify::{VerifyOptions, run_verify};
use anyhow::{Context, Result};
use benchgen_core::Manifest;
use benchgen_core::fixtures::builtin_manifest;
use log::info;
use std::path::{Path, PathBuf};

pub enum FixturesAction {
    Generate { only: Vec<String>, out_dir: PathBuf },
    Verify { only: Vec<String>, out_dir: PathBuf },
    List,
}

pub struct FixturesCommand {
    pub manifest: Option<PathBuf>,
    pub action: FixturesAction,
}

impl crate::commands::Command for FixturesCommand {
    fn run(&self) -> Result<()> {
        let manifest = self.load_manifest()?;

        match self.action {
            FixturesAction::Generate {
                ref only,
                ref out_dir,
            } => {
                let written = generate_fixtures(&manifest, only, out_dir)?;
                info!("Generated {} fixture(s)", written.len());
                Ok(())
            }
            FixturesAction::Verify {
                ref only,
                ref out_dir,
            } => {
                let opts = VerifyOptions {
                    only: only.clone(),
                    out_dir: out_dir.clone(),
                };
                run_verify(&manifest, &opts)
            }
            FixturesAction::List => {
                for line in describe_fixtures(&manifest) {
                    println!("{line}");
                }
                Ok(())
            }
        }
    }
}

impl FixturesCommand {
    pub fn new(manifest: Option<PathBuf>, action: FixturesAction) -> Self {
        Self { manifest, action }
    }

    fn load_manifest(&self) -> Result<Manifest> {
        match &self.manifest {
            Some(path) => Manifest::load(path)
                .with_context(|| format!("Failed to load manifest {}", path.display())),
            None => Ok(builtin_manifest()?),
        }
    }
}

/// Generate the selected fixtures (all when `only` is empty) into `out_dir`
pub fn generate_fixtures(
    manifest: &Manifest,
    only: &[String],
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for fixture in manifest.select(only)? {
        let config = manifest.config_for(fixture, out_dir)?;
        info!(
            "Generating {} from {}",
            config.output_path.display(),
            config.template_path.display()
        );
        benchgen_core::generate(&config)
            .with_context(|| format!("Failed to generate fixture '{}'", fixture.name))?;
        written.push(config.output_path);
    }
    Ok(written)
}

/// One line per fixture: name, output, length and helpers
pub fn describe_fixtures(manifest: &Manifest) -> Vec<String> {
    manifest
        .fixtures
        .iter()
        .map(|f| {
            format!(
                "{}\t{}\tLength={}\thelpers=[{}]",
                f.name,
                f.output.display(),
                f.length,
                f.helpers.join(", ")
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchgen_testkit::{temp_dir_in_workspace, write_file};
    use std::fs;

    const MANIFEST: &str = r#"
[[fixture]]
name = "counted"
template = "counted.tmpl"
output = "counted.rs"
length = 4
helpers = ["Items", "Sum"]

[[fixture]]
name = "plain"
template = "plain.tmpl"
output = "plain.rs"
length = 2
helpers = ["Items"]
"#;

    fn setup_manifest(dir: &Path) -> Manifest {
        write_file(
            dir,
            "counted.tmpl",
            "{{each Items(Length) |i|}}{{i}};{{/each}} total={{Sum(Length)}}\n",
        );
        write_file(dir, "plain.tmpl", "len={{Length}}\n");
        let path = write_file(dir, "fixtures.toml", MANIFEST);
        Manifest::load(path).unwrap()
    }

    #[test]
    fn test_generate_all_fixtures() {
        let temp = temp_dir_in_workspace();
        let manifest = setup_manifest(temp.path());
        let out = temp.path().join("out");
        fs::create_dir(&out).unwrap();

        let written = generate_fixtures(&manifest, &[], &out).unwrap();

        assert_eq!(written, vec![out.join("counted.rs"), out.join("plain.rs")]);
        assert_eq!(
            fs::read_to_string(out.join("counted.rs")).unwrap(),
            "1;2;3;4; total=10\n"
        );
        assert_eq!(fs::read_to_string(out.join("plain.rs")).unwrap(), "len=2\n");
    }

    #[test]
    fn test_generate_only_selected() {
        let temp = temp_dir_in_workspace();
        let manifest = setup_manifest(temp.path());

        let written =
            generate_fixtures(&manifest, &["plain".to_string()], temp.path()).unwrap();

        assert_eq!(written, vec![temp.path().join("plain.rs")]);
        assert!(!temp.path().join("counted.rs").exists());
    }

    #[test]
    fn test_generate_unknown_fixture_fails() {
        let temp = temp_dir_in_workspace();
        let manifest = setup_manifest(temp.path());

        let err = generate_fixtures(&manifest, &["nope".to_string()], temp.path()).unwrap_err();

        assert!(err.to_string().contains("UNKNOWN_FIXTURE"));
    }

    #[test]
    fn test_generate_stops_at_first_failure() {
        let temp = temp_dir_in_workspace();
        let manifest = setup_manifest(temp.path());
        fs::remove_file(temp.path().join("counted.tmpl")).unwrap();

        let err = generate_fixtures(&manifest, &[], temp.path()).unwrap_err();

        assert!(format!("{err:#}").contains("TEMPLATE_NOT_FOUND"));
        assert!(!temp.path().join("plain.rs").exists());
    }

    #[test]
    fn test_describe_fixtures() {
        let temp = temp_dir_in_workspace();
        let manifest = setup_manifest(temp.path());

        let lines = describe_fixtures(&manifest);

        assert_eq!(
            lines,
            vec![
                "counted\tcounted.rs\tLength=4\thelpers=[Items, Sum]".to_string(),
                "plain\tplain.rs\tLength=2\thelpers=[Items]".to_string(),
            ]
        );
    }

    #[test]
    fn test_builtin_manifest_is_default() {
        let cmd = FixturesCommand::new(None, FixturesAction::List);
        let manifest = cmd.load_manifest().unwrap();
        assert_eq!(
            manifest.names().collect::<Vec<_>>(),
            vec!["call-func-args", "new-and-init"]
        );
    }
}

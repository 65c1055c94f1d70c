use anyhow::{Context, Result};
use benchgen_core::Manifest;
use log::info;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct VerifyOptions {
    pub only: Vec<String>,
    pub out_dir: PathBuf,
}

/// Re-render the selected fixtures in memory and compare them with disk
pub fn run_verify(manifest: &Manifest, opts: &VerifyOptions) -> Result<()> {
    let fixtures = manifest.select(&opts.only)?;
    info!(
        "Checking freshness of {} fixture(s) in {}",
        fixtures.len(),
        opts.out_dir.display()
    );

    let mut dirty_paths = Vec::new();
    for fixture in &fixtures {
        let config = manifest.config_for(fixture, &opts.out_dir)?;
        let expected = benchgen_core::render(&config)
            .with_context(|| format!("Failed to render fixture '{}'", fixture.name))?;

        match fs::read(&config.output_path) {
            Ok(on_disk) if on_disk == expected.as_bytes() => {}
            Ok(_) => dirty_paths.push(config.output_path),
            Err(e) if e.kind() == ErrorKind::NotFound => dirty_paths.push(config.output_path),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read {}", config.output_path.display())
                });
            }
        }
    }

    if !dirty_paths.is_empty() {
        anyhow::bail!(
            "Fixtures not fresh: generated output differs from disk.\n\
             Files changed: {:?}\n\
             Please run 'cargo xtask fixtures generate' and commit the changes.",
            dirty_paths
        );
    }

    info!("Verify ok: {} fixture(s) are fresh", fixtures.len());
    Ok(())
}

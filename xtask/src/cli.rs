use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Benchgen automation tasks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Benchmark fixture tasks
    Fixtures(FixturesArgs),
}

#[derive(Parser)]
pub struct FixturesArgs {
    /// Fixture manifest (TOML); the built-in fixtures are used when omitted
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: FixturesCommands,
}

#[derive(Subcommand)]
pub enum FixturesCommands {
    /// Generate benchmark fixtures
    Generate(SelectArgs),
    /// Verify generated fixtures are up to date
    Verify(SelectArgs),
    /// List known fixtures
    List,
}

#[derive(Args)]
pub struct SelectArgs {
    /// Only process the named fixture (repeatable)
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,

    /// Directory generated files are written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

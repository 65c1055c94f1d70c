mod cli;
mod commands;

use crate::cli::{Cli, Commands, FixturesCommands};
use crate::commands::fixtures::{FixturesAction, FixturesCommand};
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Fixtures(args) => {
            let action = match args.command {
                FixturesCommands::Generate(select) => FixturesAction::Generate {
                    only: select.only,
                    out_dir: select.out_dir,
                },
                FixturesCommands::Verify(select) => FixturesAction::Verify {
                    only: select.only,
                    out_dir: select.out_dir,
                },
                FixturesCommands::List => FixturesAction::List,
            };
            let cmd = FixturesCommand::new(args.manifest, action);
            use crate::commands::Command as _;
            cmd.run()?;
        }
    }

    Ok(())
}

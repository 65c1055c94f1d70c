use anyhow::Result;

pub mod fixtures;
pub mod fixtures_verify;

pub trait Command {
    fn run(&self) -> Result<()>;
}

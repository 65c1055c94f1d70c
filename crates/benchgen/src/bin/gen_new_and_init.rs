use anyhow::Result;
use benchgen_core::fixtures::new_and_init;

fn main() -> Result<()> {
    benchgen::run(new_and_init())
}

use anyhow::Result;
use benchgen_core::fixtures::call_func_args;

fn main() -> Result<()> {
    benchgen::run(call_func_args())
}

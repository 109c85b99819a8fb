mod clean;
mod duplicates;
mod validate;

use clean::run_clean;
use duplicates::run_duplicates;
use validate::run_validate;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Clean(args) => run_clean(args, ctx),
        Command::Validate(args) => run_validate(args, ctx),
        Command::Duplicates(args) => run_duplicates(args, ctx),
    }
}

/// Install the global rayon pool with the requested thread count; zero keeps
/// the library default (all logical CPUs).
pub fn configure_threads(threads: usize) -> Result<()> {
    if threads == 0 {
        return Ok(());
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| anyhow::anyhow!("Failed to configure thread pool: {e}"))
}

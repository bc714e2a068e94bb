//! `fit track` command implementation.
//!
//! Adds a path to the tracking list. The file is read on the next save.

use camino::Utf8Path;
use fit_core::error::FitResult;

use super::CommandContext;

/// Execute the `fit track` command
pub fn execute(store: &Utf8Path, path: &str, ctx: &CommandContext) -> FitResult<()> {
    let mut engine = ctx.open_engine(store)?;
    let path = engine.track(path)?;

    ctx.output.line(&format!(
        "The file [{}] is now being tracked by the store [{}]",
        path,
        engine.store_path()
    ));
    Ok(())
}

//! `fit untrack` command implementation.

use camino::Utf8Path;
use fit_core::error::FitResult;

use super::CommandContext;

/// Execute the `fit untrack` command
pub fn execute(store: &Utf8Path, path: &str, ctx: &CommandContext) -> FitResult<()> {
    let mut engine = ctx.open_engine(store)?;
    let path = engine.untrack(path)?;

    ctx.output
        .line(&format!("Removing [{}] from the tracking list.", path));
    Ok(())
}

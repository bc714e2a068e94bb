//! `fit tracklist` command implementation.
//!
//! A file that has not been saved yet shows an empty digest.

use camino::Utf8Path;
use fit_core::error::FitResult;

use super::CommandContext;

/// Execute the `fit tracklist` command
pub fn execute(store: &Utf8Path, ctx: &CommandContext) -> FitResult<()> {
    let engine = ctx.open_engine(store)?;
    let tracked = engine.list_tracking();

    if tracked.is_empty() {
        ctx.output.info("No files are being tracked by this store.");
        return Ok(());
    }

    for (index, record) in tracked.iter().enumerate() {
        ctx.output
            .line(&format!("[{}] {} [{}]", index, record.path, record.digest));
    }
    Ok(())
}

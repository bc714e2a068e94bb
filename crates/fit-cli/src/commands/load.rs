//! `fit load` command implementation.
//!
//! Writes the files of a snapshot back into the store directory.

use camino::Utf8Path;
use fit_core::error::FitResult;
use fit_store::SnapshotSelector;

use super::CommandContext;

/// Execute the `fit load` command
pub fn execute(store: &Utf8Path, index: Option<usize>, ctx: &CommandContext) -> FitResult<()> {
    let engine = ctx.open_engine(store)?;
    let report = engine.load(SnapshotSelector::from(index))?;

    match index {
        None => ctx.output.success("Successfully loaded the latest snapshot"),
        Some(_) => ctx.output.success(&format!(
            "Successfully loaded snapshot {}",
            report.snapshot_index
        )),
    }
    Ok(())
}

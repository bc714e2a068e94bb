//! `fit snaps` command implementation.

use camino::Utf8Path;
use fit_core::error::FitResult;

use super::CommandContext;

/// Execute the `fit snaps` command
pub fn execute(store: &Utf8Path, ctx: &CommandContext) -> FitResult<()> {
    let engine = ctx.open_engine(store)?;
    let snapshots = engine.list_snapshots();

    if snapshots.is_empty() {
        ctx.output.info("There are no saved snapshots to look at.");
        return Ok(());
    }

    for snapshot in snapshots {
        let marker = if snapshot.latest { " [LATEST]" } else { "" };
        ctx.output.line(&format!(
            "------ {} | Snapshot [{}]{} ------",
            store, snapshot.index, marker
        ));
        for record in snapshot.records {
            ctx.output
                .line(&format!(" - [{}] [{}]", record.path, record.digest));
        }
        ctx.output.line("");
    }
    Ok(())
}

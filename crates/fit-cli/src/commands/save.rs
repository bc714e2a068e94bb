//! `fit save` command implementation.
//!
//! Prints one line per new, changed or deleted file, then the snapshot index.

use camino::Utf8Path;
use fit_core::error::FitResult;
use fit_store::{ChangeKind, SaveOutcome, SaveReport};

use super::CommandContext;
use crate::output::OutputHandler;

/// Execute the `fit save` command
pub fn execute(store: &Utf8Path, ctx: &CommandContext) -> FitResult<()> {
    let mut engine = ctx.open_engine(store)?;

    match engine.save()? {
        SaveOutcome::NothingTracked => {
            ctx.output.warn(&format!(
                "There are no currently tracked files that can be saved into this file store [{}]",
                engine.store_path()
            ));
        },
        SaveOutcome::Saved(report) => print_report(&report, &ctx.output),
    }
    Ok(())
}

fn print_report(report: &SaveReport, output: &OutputHandler) {
    for change in &report.changes {
        let line = match change.kind {
            ChangeKind::New => {
                format!(" - A new file [*{}] has been added to the store.", change.path)
            },
            ChangeKind::Changed => format!(
                " - A file [*{}] has changed since the last snapshot. Its new contents will be added to the store.",
                change.path
            ),
            ChangeKind::Deleted => format!(
                " - It appears that file [{}] has been renamed or deleted since the last snapshot.",
                change.path
            ),
            ChangeKind::Unchanged => continue,
        };
        output.line(&line);
    }

    if !report.has_changes() {
        output.info("No files have changes since the last snapshot.");
    }
    output.success(&format!(
        "Saved snapshot [{}] to the file store.",
        report.snapshot_index
    ));
}

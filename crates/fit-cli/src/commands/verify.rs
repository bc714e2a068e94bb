//! `fit verify` command implementation.
//!
//! Re-hashes the stored bytes of every snapshot record. Any mismatch makes
//! the command fail with a format error.

use camino::Utf8Path;
use fit_core::error::{FitError, FitResult};

use super::CommandContext;

/// Execute the `fit verify` command
pub fn execute(store: &Utf8Path, ctx: &CommandContext) -> FitResult<()> {
    let engine = ctx.open_engine(store)?;
    let report = engine.verify();

    for issue in &report.issues {
        ctx.output.error(&issue.to_string());
    }

    if !report.is_clean() {
        return Err(FitError::format(format!(
            "{} of {} record(s) failed verification",
            report.issues.len(),
            report.records_checked
        )));
    }

    ctx.output.success(&format!(
        "Verified {} record(s) across {} snapshot(s).",
        report.records_checked, report.snapshots_checked
    ));
    Ok(())
}

//! `fit create` command implementation.

use camino::Utf8Path;
use fit_core::error::FitResult;
use fit_core::utils::with_store_extension;
use fit_store::SnapshotEngine;

use super::CommandContext;

/// Execute the `fit create` command
pub fn execute(name: &Utf8Path, ctx: &CommandContext) -> FitResult<()> {
    let file_name = with_store_extension(name, &ctx.config.extension);
    SnapshotEngine::create(ctx.resolve(&file_name), ctx.store_options())?;

    ctx.output
        .success(&format!("Successfully created the {} file store.", file_name));
    Ok(())
}

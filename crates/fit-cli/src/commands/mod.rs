//! Command implementations and dispatch logic.
//!
//! Each command is a function that takes its arguments and a shared
//! [`CommandContext`]. Store paths given on the command line are resolved
//! against the working directory; tracked paths are resolved by the engine
//! against the directory holding the store.

use camino::{Utf8Path, Utf8PathBuf};
use fit_config::FitConfig;
use fit_core::error::FitResult;
use fit_store::{DecodeLimits, SnapshotEngine, StoreOptions};
use tracing::info;

pub mod create;
pub mod load;
pub mod save;
pub mod snaps;
pub mod track;
pub mod tracklist;
pub mod untrack;
pub mod verify;

#[cfg(test)]
mod tests;

use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
    pub config: FitConfig,
}

impl CommandContext {
    /// Create a command context that prints to the terminal
    pub fn new(cwd: Utf8PathBuf, config: FitConfig) -> Self {
        Self {
            cwd,
            output: OutputHandler::new(),
            config,
        }
    }

    /// Resolve a command-line path against the working directory
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Store options derived from configuration
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            limits: DecodeLimits {
                max_blob_bytes: self.config.max_blob_bytes,
            },
            atomic_writes: self.config.atomic_writes,
        }
    }

    /// Open the store named on the command line
    pub fn open_engine(&self, store: &Utf8Path) -> FitResult<SnapshotEngine> {
        SnapshotEngine::open(self.resolve(store), self.store_options())
    }
}

/// Dispatch a command to its handler
pub fn dispatch_command(command: Commands, ctx: &CommandContext) -> FitResult<()> {
    match command {
        Commands::Create { name, .. } => {
            info!("Creating store: {}", name);
            create::execute(&name, ctx)
        },
        Commands::Track { store, path } => {
            info!("Tracking {} in {}", path, store);
            track::execute(&store, &path, ctx)
        },
        Commands::Untrack { store, path } => {
            info!("Untracking {} from {}", path, store);
            untrack::execute(&store, &path, ctx)
        },
        Commands::Save { store } => {
            info!("Saving snapshot to {}", store);
            save::execute(&store, ctx)
        },
        Commands::Load { store, index } => {
            info!("Loading snapshot {:?} from {}", index, store);
            load::execute(&store, index, ctx)
        },
        Commands::Snaps { store } => {
            info!("Listing snapshots in {}", store);
            snaps::execute(&store, ctx)
        },
        Commands::Tracklist { store } => {
            info!("Listing tracked files in {}", store);
            tracklist::execute(&store, ctx)
        },
        Commands::Verify { store } => {
            info!("Verifying {}", store);
            verify::execute(&store, ctx)
        },
    }
}

pub mod config;
pub mod free_time;
pub mod progress;
pub mod recommend;
pub mod task;

use std::path::Path;

use freeslot_core::{Config, CoreError, Snapshot};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Config from `--config` if given, else the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, CoreError> {
    let config = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    config.map_err(|e| {
        tracing::warn!(error = %e, "config rejected");
        e.into()
    })
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, CoreError> {
    Snapshot::load(path).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "snapshot rejected");
        e
    })
}

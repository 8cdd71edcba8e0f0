pub mod auth;
pub mod config;
pub mod run;
pub mod status;

use crate::args::StageArgs;
use liftoff_config::StageConfig;
use std::path::PathBuf;

/// Resolve the stage configuration: flags and environment over the config file
/// over built-in defaults.
///
/// Returns the config file that was used, if any.
pub fn load_stage(args: &StageArgs) -> anyhow::Result<(Option<PathBuf>, StageConfig)> {
    let (path, file_layer) = liftoff_config::load_file_layer()?;
    let config = StageConfig::resolve(args.to_overrides().over(file_layer))?;

    for (key, value) in config.entries() {
        tracing::debug!("{} = {}", key, value);
    }

    Ok((path, config))
}

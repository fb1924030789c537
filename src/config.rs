//! Command-line and environment configuration for the offline host.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "configurator", about = "Rehydrate a saved configurator scene and export it normalized")]
pub struct HostConfig {
    /// Saved scene document (JSON).
    #[arg(long, env = "CONFIGURATOR_SCENE")]
    pub scene: PathBuf,

    /// Engine tunables (JSON); every field is optional.
    #[arg(long, env = "CONFIGURATOR_ENGINE_CONFIG")]
    pub engine_config: Option<PathBuf>,

    /// Directory that relative mask, font and image references resolve against.
    #[arg(long, env = "CONFIGURATOR_ASSET_ROOT", default_value = ".")]
    pub asset_root: PathBuf,

    /// Where to write the exported scene; stdout when absent.
    #[arg(long, env = "CONFIGURATOR_OUT")]
    pub out: Option<PathBuf>,
}

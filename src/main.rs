mod config;
mod loader;
mod run;

use std::process::ExitCode;

use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config = config::HostConfig::parse();
    tracing::info!(scene = %config.scene.display(), root = %config.asset_root.display(), "configurator starting");

    match run::run(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "configurator failed");
            ExitCode::FAILURE
        }
    }
}

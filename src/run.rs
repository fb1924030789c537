//! One host pass: read the scene, rehydrate it into a fresh engine, export.

#[cfg(test)]
#[path = "run_test.rs"]
mod run_test;

use std::path::{Path, PathBuf};

use canvas::config::EngineConfig;
use canvas::engine::{EngineCore, Signal};
use canvas::error::CanvasError;
use canvas::fonts::FontCache;
use canvas::rehydrate::{RehydrateReport, rehydrate};
use canvas::scene::SavedScene;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::HostConfig;
use crate::loader::FsHttpLoader;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to write {target}: {source}")]
    Write { target: String, source: std::io::Error },
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

/// Result of a host pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub report: RehydrateReport,
    /// Objects announced as created while the scene was replayed.
    pub created: usize,
    pub exported: SavedScene,
}

async fn read(path: &Path) -> Result<String, HostError> {
    tokio::fs::read_to_string(path).await.map_err(|source| HostError::Read { path: path.to_path_buf(), source })
}

async fn engine_config(path: Option<&Path>) -> Result<EngineConfig, HostError> {
    match path {
        Some(path) => Ok(EngineConfig::from_json(&read(path).await?)?),
        None => Ok(EngineConfig::default()),
    }
}

/// Rehydrate `config.scene` and return what came out of it. Nothing is written.
pub async fn rehydrate_file(config: &HostConfig) -> Result<RunSummary, HostError> {
    let engine_config = engine_config(config.engine_config.as_deref()).await?;
    let scene = SavedScene::from_json(&read(&config.scene).await?)?;

    let mut core = EngineCore::new(engine_config);
    let loader = FsHttpLoader::new(&config.asset_root);
    let mut fonts = FontCache::new();
    let report = rehydrate(&mut core, &loader, &mut fonts, &scene).await;

    let created = core.drain_signals().iter().filter(|s| matches!(s, Signal::Created(_))).count();
    debug!(created, "host: signals drained");
    Ok(RunSummary { report, created, exported: core.export_scene() })
}

/// Rehydrate, then write the exported scene to `config.out` or stdout.
pub async fn run(config: &HostConfig) -> Result<RunSummary, HostError> {
    let summary = rehydrate_file(config).await?;
    let json = summary.exported.to_json()?;
    match &config.out {
        Some(path) => tokio::fs::write(path, json.as_bytes())
            .await
            .map_err(|source| HostError::Write { target: path.display().to_string(), source })?,
        None => {
            let mut stdout = tokio::io::stdout();
            let written = async {
                stdout.write_all(json.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await
            };
            written.await.map_err(|source| HostError::Write { target: "stdout".into(), source })?;
        }
    }
    info!(
        texts = summary.report.texts,
        images = summary.report.images,
        skipped = summary.report.skipped,
        created = summary.created,
        "host: scene exported"
    );
    Ok(summary)
}

//! Resource loader for the native host.
//!
//! `http://` and `https://` references go through `reqwest`; anything else is
//! a path under the asset root. Absolute paths are re-rooted there too, and
//! parent components are refused so a scene cannot read outside the root.

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use canvas::error::LoadError;
use canvas::loader::ResourceLoader;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FsHttpLoader {
    client: reqwest::Client,
    root: PathBuf,
}

impl FsHttpLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { client: reqwest::Client::new(), root: root.into() }
    }

    /// Map a non-URL reference onto a path inside the asset root.
    fn resolve(&self, reference: &str) -> Result<PathBuf, LoadError> {
        let mut path = self.root.clone();
        for component in Path::new(reference).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
                Component::ParentDir => return Err(LoadError::new(reference, "parent components are not allowed")),
            }
        }
        Ok(path)
    }
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

async fn fetch_remote(client: reqwest::Client, url: String) -> Result<Arc<[u8]>, LoadError> {
    let response = client
        .get(&url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| LoadError::new(&url, e.to_string()))?;
    let body = response.bytes().await.map_err(|e| LoadError::new(&url, e.to_string()))?;
    Ok(Arc::from(body.as_ref()))
}

async fn fetch_local(reference: String, path: PathBuf) -> Result<Arc<[u8]>, LoadError> {
    let body = tokio::fs::read(&path).await.map_err(|e| LoadError::new(&reference, e.to_string()))?;
    Ok(Arc::from(body))
}

impl ResourceLoader for FsHttpLoader {
    fn fetch_text(&self, reference: &str) -> LocalBoxFuture<'static, Result<String, LoadError>> {
        let bytes = self.fetch_bytes(reference);
        let reference = reference.to_string();
        async move {
            let bytes = bytes.await?;
            String::from_utf8(bytes.to_vec()).map_err(|e| LoadError::new(reference, e.to_string()))
        }
        .boxed_local()
    }

    fn fetch_bytes(&self, reference: &str) -> LocalBoxFuture<'static, Result<Arc<[u8]>, LoadError>> {
        debug!(%reference, "loader: fetch");
        if is_remote(reference) {
            return fetch_remote(self.client.clone(), reference.to_string()).boxed_local();
        }
        match self.resolve(reference) {
            Ok(path) => fetch_local(reference.to_string(), path).boxed_local(),
            Err(e) => futures::future::ready(Err(e)).boxed_local(),
        }
    }
}

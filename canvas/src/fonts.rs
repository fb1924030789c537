//! Per-family font loading, memoized.
//!
//! Every request for a family returns the same shared future, so concurrent
//! callers wait on one fetch and resolve together. A failed load is not
//! cached: the next request for that family fetches again.

#[cfg(test)]
#[path = "fonts_test.rs"]
mod fonts_test;

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture, Shared};
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::loader::ResourceLoader;

/// A loaded font family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    pub family: String,
    /// Font file contents; `None` for families provided by the platform.
    pub data: Option<Arc<[u8]>>,
}

/// Shared in-flight or completed load of one family.
pub type FontLoad = Shared<LocalBoxFuture<'static, Result<Arc<FontFace>, LoadError>>>;

/// Font sources and their memoized loads.
#[derive(Default)]
pub struct FontCache {
    sources: HashMap<String, String>,
    entries: HashMap<String, FontLoad>,
}

impl FontCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare where a family's font file lives.
    pub fn register(&mut self, family: &str, reference: &str) {
        self.sources.insert(family.to_string(), reference.to_string());
    }

    /// Load `family`, sharing any load already in flight or finished.
    ///
    /// Families with no registered source resolve immediately as platform
    /// fonts.
    pub fn ensure_loaded(&mut self, family: &str, loader: &dyn ResourceLoader) -> FontLoad {
        if let Some(existing) = self.entries.get(family)
            && !matches!(existing.peek(), Some(Err(_)))
        {
            return existing.clone();
        }

        let name = family.to_string();
        let load = match self.sources.get(family) {
            Some(reference) => {
                debug!(%family, %reference, "fonts: fetching");
                loader
                    .fetch_bytes(reference)
                    .map(move |result| match result {
                        Ok(data) => Ok(Arc::new(FontFace { family: name, data: Some(data) })),
                        Err(e) => {
                            warn!(family = %name, error = %e, "fonts: load failed");
                            Err(e)
                        }
                    })
                    .boxed_local()
            }
            None => future::ready(Ok(Arc::new(FontFace { family: name, data: None }))).boxed_local(),
        }
        .shared();
        self.entries.insert(family.to_string(), load.clone());
        load
    }

    /// Whether `family` has finished loading successfully.
    #[must_use]
    pub fn is_loaded(&self, family: &str) -> bool {
        self.entries.get(family).is_some_and(|f| matches!(f.peek(), Some(Ok(_))))
    }
}

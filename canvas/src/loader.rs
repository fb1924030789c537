//! Resource loading seam.
//!
//! The engine never touches the network or the filesystem itself. Hosts
//! implement [`ResourceLoader`]; the returned futures own everything they
//! need, so callers may hold several in flight at once.

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};

use crate::error::LoadError;

/// Fetches vector markup, fonts and other resources by reference.
pub trait ResourceLoader {
    /// Fetch a UTF-8 resource such as SVG markup.
    fn fetch_text(&self, reference: &str) -> LocalBoxFuture<'static, Result<String, LoadError>>;

    /// Fetch a binary resource such as a font file.
    fn fetch_bytes(&self, reference: &str) -> LocalBoxFuture<'static, Result<Arc<[u8]>, LoadError>>;
}

/// In-memory loader. Counts fetches so callers can observe memoization.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    entries: HashMap<String, Arc<[u8]>>,
    fetches: Rc<Cell<usize>>,
}

impl StaticLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource under `reference`.
    #[must_use]
    pub fn with(mut self, reference: &str, body: impl AsRef<[u8]>) -> Self {
        self.entries.insert(reference.to_string(), Arc::from(body.as_ref()));
        self
    }

    /// Number of fetches issued so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }

    fn lookup(&self, reference: &str) -> Result<Arc<[u8]>, LoadError> {
        self.fetches.set(self.fetches.get() + 1);
        self.entries.get(reference).cloned().ok_or_else(|| LoadError::new(reference, "not found"))
    }
}

impl ResourceLoader for StaticLoader {
    fn fetch_text(&self, reference: &str) -> LocalBoxFuture<'static, Result<String, LoadError>> {
        let result = self.lookup(reference).and_then(|bytes| {
            String::from_utf8(bytes.to_vec()).map_err(|e| LoadError::new(reference, e.to_string()))
        });
        future::ready(result).boxed_local()
    }

    fn fetch_bytes(&self, reference: &str) -> LocalBoxFuture<'static, Result<Arc<[u8]>, LoadError>> {
        future::ready(self.lookup(reference)).boxed_local()
    }
}

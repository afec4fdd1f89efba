use super::matcher::{split_request_path, RouteMatch};
use super::registry::{RouteRegistry, RouteTag};
use crate::spec::{SpecDocument, SpecError};
use arc_swap::ArcSwap;
use http::Method;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// Shared route table.
///
/// Readers load the current [`RouteRegistry`] snapshot without locking.
/// Writers serialize on an internal mutex, mutate a private copy of the
/// snapshot and publish it with a single store, so a lookup in flight keeps
/// seeing the table it started with.
#[derive(Debug)]
pub struct RouteTable {
    current: ArcSwap<RouteRegistry>,
    writer: Mutex<()>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(RouteRegistry::new()),
            writer: Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // guards no data, so a poisoned lock is still usable
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RouteRegistry> {
        self.current.load_full()
    }

    /// Register a template and publish the new table.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::register`]. The published table is unchanged on
    /// error.
    pub fn register(
        &self,
        docs: &[SpecDocument],
        template: &str,
    ) -> Result<Option<RouteTag>, SpecError> {
        let _guard = self.lock();
        let mut next = RouteRegistry::clone(&self.current.load());
        let tag = next.register(docs, template)?;
        if tag.is_some() {
            self.current.store(Arc::new(next));
        }
        Ok(tag)
    }

    /// Remove a tag and publish the new table. Unknown tags are ignored.
    pub fn unregister(&self, tag: RouteTag) {
        let _guard = self.lock();
        let mut next = RouteRegistry::clone(&self.current.load());
        if next.unregister(tag) {
            self.current.store(Arc::new(next));
        }
    }

    /// Rebuild every route from `docs`, keeping each route's tag.
    ///
    /// Templates that no longer resolve are dropped with a warning. Returns the
    /// number of routes in the published table.
    ///
    /// # Errors
    ///
    /// Any [`SpecError`] raised while re-registering; the previous table stays
    /// published.
    pub fn rebuild(&self, docs: &[SpecDocument]) -> Result<usize, SpecError> {
        let _guard = self.lock();
        let previous = self.current.load_full();
        let mut next = previous.cleared();

        for route in previous.routes() {
            if next.register_as(docs, &route.template, route.tag)?.is_none() {
                warn!(
                    tag = %route.tag,
                    template = %route.template,
                    "Route no longer present after rebuild"
                );
            }
        }

        let count = next.len();
        self.current.store(Arc::new(next));
        info!(routes = count, "Route table rebuilt");
        Ok(count)
    }

    /// Match a raw request path such as `/jobs/42?detail=1`.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let segments = split_request_path(path);
        self.current.load().find(&segments, method)
    }

    /// Match pre-split segments.
    #[must_use]
    pub fn find_segments<S: AsRef<str>>(
        &self,
        segments: &[S],
        method: &Method,
    ) -> Option<RouteMatch> {
        self.current.load().find(segments, method)
    }
}

//! # OpenAPI Context
//!
//! [`OpenApi`] owns everything built at load time: the selected plugins, their
//! documents, and the route table. There is no global state; the daemon
//! creates one context and shares it by reference.
//!
//! ## Lifecycle
//!
//! 1. [`OpenApi::init`] selects plugins from the catalog, fetches each
//!    document, runs schema specifiers over documents flagged
//!    `APPLY_EXTERNAL_SCHEMA` and prunes their `{data_parser}` paths, then
//!    calls every plugin's `init`.
//! 2. Plugins register their URL templates with [`OpenApi::register_path`]
//!    and bind handlers to the returned tags.
//! 3. [`OpenApi::reconfigure`] re-fetches documents and rebuilds the route
//!    table in one swap; tags survive.
//! 4. [`OpenApi::shutdown`] (or drop) calls every plugin's `fini` once.

use crate::config::GatewayConfig;
use crate::merge::{merge, prune_template_paths, MergeOptions};
use crate::plugin::{PluginCatalog, SchemaSpecifier, Selection, SharedPlugin, SpecifyError};
use crate::router::{RouteMatch, RouteRegistry, RouteTable, RouteTag};
use crate::spec::{canonical_paths, SpecDocument, SpecError, SpecFlags};
use arc_swap::ArcSwap;
use http::Method;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

/// Result of [`OpenApi::init`].
#[derive(Debug)]
pub enum InitOutcome {
    /// Listing mode: the available plugin types. Nothing was loaded.
    Listed(Vec<String>),
    Ready(OpenApi),
}

/// Owned gateway context.
pub struct OpenApi {
    plugins: Vec<SharedPlugin>,
    documents: ArcSwap<Vec<SpecDocument>>,
    routes: RouteTable,
    merge_options: MergeOptions,
    config_lock: Mutex<()>,
    shut_down: AtomicBool,
}

impl std::fmt::Debug for OpenApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenApi")
            .field("plugins", &self.plugin_types())
            .field("routes", &self.routes.snapshot().len())
            .finish()
    }
}

fn load_documents(
    plugins: &[SharedPlugin],
    specifiers: &[Arc<dyn SchemaSpecifier>],
) -> Result<Vec<SpecDocument>, SpecError> {
    let mut documents = Vec::with_capacity(plugins.len());

    for plugin in plugins {
        let plugin_type = plugin.plugin_type();
        let mut flags = SpecFlags::empty();
        let Some(mut document) = plugin.specification(&mut flags) else {
            error!(plugin = %plugin_type, "Unable to load OpenAPI specification");
            return Err(SpecError::PluginIncomplete {
                plugin: plugin_type.to_string(),
            });
        };

        debug!(plugin = %plugin_type, flags = ?flags, "Loaded plugin specification");

        if flags.contains(SpecFlags::APPLY_EXTERNAL_SCHEMA) {
            for specifier in specifiers {
                match specifier.specify(&mut document) {
                    Ok(()) | Err(SpecifyError::NotSupported) => {}
                    Err(SpecifyError::Failed(reason)) => {
                        error!(
                            plugin = %plugin_type,
                            specifier = %specifier.name(),
                            reason = %reason,
                            "Schema specification failed"
                        );
                        return Err(SpecError::Specifier {
                            specifier: specifier.name().to_string(),
                            plugin: plugin_type.to_string(),
                            reason,
                        });
                    }
                }
            }
            let pruned = prune_template_paths(&mut document);
            debug!(plugin = %plugin_type, pruned, "Pruned template paths");
        }

        documents.push(SpecDocument::new(plugin_type, document, flags));
    }

    Ok(documents)
}

impl OpenApi {
    /// Select, load and initialize plugins.
    ///
    /// # Errors
    ///
    /// Any [`SpecError`] from plugin selection, document loading or plugin
    /// initialization. Plugins initialized before a failing one are
    /// finalized again.
    pub fn init(
        catalog: &PluginCatalog,
        config: &GatewayConfig,
        specifiers: &[Arc<dyn SchemaSpecifier>],
    ) -> Result<InitOutcome, SpecError> {
        let plugins = match catalog.select(config.plugins.as_deref())? {
            Selection::List(types) => return Ok(InitOutcome::Listed(types)),
            Selection::Plugins(plugins) => plugins,
        };

        let documents = load_documents(&plugins, specifiers)?;

        for (i, plugin) in plugins.iter().enumerate() {
            if let Err(e) = plugin.init() {
                for done in plugins[..i].iter().rev() {
                    done.fini();
                }
                return Err(SpecError::PluginInit {
                    plugin: plugin.plugin_type().to_string(),
                    reason: format!("{e:#}"),
                });
            }
        }

        info!(
            plugins = plugins.len(),
            types = ?plugins.iter().map(|p| p.plugin_type()).collect::<Vec<_>>(),
            "OpenAPI plugins initialized"
        );

        Ok(InitOutcome::Ready(Self {
            plugins,
            documents: ArcSwap::from_pointee(documents),
            routes: RouteTable::new(),
            merge_options: config.merge_options(),
            config_lock: Mutex::new(()),
            shut_down: AtomicBool::new(false),
        }))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.config_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[must_use]
    pub fn plugin_types(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.plugin_type()).collect()
    }

    /// Current plugin documents, in plugin order.
    #[must_use]
    pub fn documents(&self) -> Arc<Vec<SpecDocument>> {
        self.documents.load_full()
    }

    /// Current route table snapshot.
    #[must_use]
    pub fn routes(&self) -> Arc<RouteRegistry> {
        self.routes.snapshot()
    }

    /// Register one URL template, e.g. `/slurm/v0.0.40/job/{job_id}`.
    ///
    /// # Errors
    ///
    /// See [`RouteRegistry::register`].
    pub fn register_path(&self, template: &str) -> Result<Option<RouteTag>, SpecError> {
        let _guard = self.lock();
        let documents = self.documents.load();
        self.routes.register(&documents, template)
    }

    /// Register every path of every document, skipping templates an earlier
    /// document already claimed.
    ///
    /// # Errors
    ///
    /// The first [`SpecError`] raised; routes registered before it stay.
    pub fn register_all_paths(&self) -> Result<Vec<(String, RouteTag)>, SpecError> {
        let _guard = self.lock();
        let documents = self.documents.load();
        let mut registered: Vec<(String, RouteTag)> = Vec::new();

        for doc in documents.iter() {
            for template in canonical_paths(&doc.document)? {
                if registered.iter().any(|(t, _)| *t == template) {
                    debug!(template = %template, plugin = %doc.plugin_type, "Template already registered");
                    continue;
                }
                match self.routes.register(&documents, &template)? {
                    Some(tag) => registered.push((template, tag)),
                    None => warn!(template = %template, plugin = %doc.plugin_type, "Path is not a route"),
                }
            }
        }

        info!(routes = registered.len(), "Registered all paths");
        Ok(registered)
    }

    pub fn unregister_path(&self, tag: RouteTag) {
        let _guard = self.lock();
        self.routes.unregister(tag);
    }

    /// Match a request. `None` is the not-found outcome.
    #[must_use]
    pub fn find_path_tag(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        self.routes.find(method, path)
    }

    pub fn log_path_tag_methods(&self, tag: RouteTag) {
        self.routes.snapshot().log_path_tag_methods(tag);
    }

    /// The merged specification served to clients.
    ///
    /// # Errors
    ///
    /// See [`merge`].
    pub fn specification(&self) -> Result<Value, SpecError> {
        merge(&self.documents.load(), &self.merge_options)
    }

    /// Re-fetch every plugin's document and rebuild the route table.
    ///
    /// Returns the number of routes after the rebuild. On error the previous
    /// documents and routes stay in place.
    ///
    /// # Errors
    ///
    /// Any [`SpecError`] from loading documents or re-registering templates.
    pub fn reconfigure(&self, specifiers: &[Arc<dyn SchemaSpecifier>]) -> Result<usize, SpecError> {
        let _guard = self.lock();
        let documents = load_documents(&self.plugins, specifiers)?;
        let previous = self.documents.swap(Arc::new(documents));

        match self.routes.rebuild(&self.documents.load()) {
            Ok(count) => {
                info!(routes = count, "Reconfigured OpenAPI context");
                Ok(count)
            }
            Err(e) => {
                self.documents.store(previous);
                error!(error = %e, "Reconfiguration failed, keeping previous specification");
                Err(e)
            }
        }
    }

    /// Finalize every plugin. Later calls do nothing.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        for plugin in &self.plugins {
            plugin.fini();
        }
        info!(plugins = self.plugins.len(), "OpenAPI plugins finalized");
    }
}

impl Drop for OpenApi {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! # Plugin Module
//!
//! The boundary between the gateway core and the service modules that
//! implement endpoints.
//!
//! - [`OpenApiPlugin`] - a service module publishing a partial OpenAPI
//!   document, with `init` / `fini` hooks
//! - [`PluginCatalog`] - the set of plugins available to a build, and
//!   selection from a comma-separated list
//! - [`SchemaSpecifier`] - an external step specialising
//!   `{data_parser}` template paths before they are pruned
//! - [`DocumentPlugin`] - a plugin backed by a fixed document

mod catalog;
mod document;

pub use catalog::{PluginCatalog, Selection, PLUGIN_TYPE_PREFIX};
pub use document::DocumentPlugin;

use crate::spec::SpecFlags;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// A service module contributing endpoints.
pub trait OpenApiPlugin: Send + Sync {
    /// Type name, e.g. `openapi/jobs`.
    fn plugin_type(&self) -> &str;

    /// Called once after every selected plugin's document has loaded.
    fn init(&self) -> anyhow::Result<()>;

    /// Called once on shutdown.
    fn fini(&self);

    /// The plugin's partial document. Merge behaviour is reported through
    /// `flags`. `None` marks the plugin as incomplete.
    fn specification(&self, flags: &mut SpecFlags) -> Option<Value>;
}

pub type SharedPlugin = Arc<dyn OpenApiPlugin>;

/// Failure of a [`SchemaSpecifier`].
#[derive(Debug, Error)]
pub enum SpecifyError {
    /// The specifier has nothing to contribute to this document. Ignored.
    #[error("not supported")]
    NotSupported,
    #[error("{0}")]
    Failed(String),
}

/// Specialises template paths and schemas of a plugin document in place.
pub trait SchemaSpecifier: Send + Sync {
    fn name(&self) -> &str;

    fn specify(&self, document: &mut Value) -> Result<(), SpecifyError>;
}

//! # oasmux
//!
//! **oasmux** is the routing and specification core of an OpenAPI-driven REST
//! gateway. Each plugin ships an OpenAPI document describing its endpoints;
//! oasmux turns those documents into a route table that matches incoming
//! requests to plugin handlers with typed path parameters, and merges them into
//! the single specification served to clients.
//!
//! ## Architecture
//!
//! - **[`spec`]** - document loading, `$ref` resolution and URL path handling
//! - **[`router`]** - compiled path templates, the route registry and the
//!   lock-free route table
//! - **[`merge`]** - multi-document merge and operation-id mangling
//! - **[`plugin`]** - the plugin contract and plugin selection
//! - **[`context`]** - per-request context, error codes and the response envelope
//! - **[`dispatcher`]** - binds route tags to handlers
//! - **[`openapi`]** - the owned gateway context tying the above together
//! - **[`config`]** / **[`logging`]** - settings and structured logging
//! - **[`cli`]** - the `oasmux` command-line tool
//!
//! ## Request Flow
//!
//! ```text
//! path "/slurm/v0.0.40/job/7"
//!   -> split into segments
//!   -> RouteTable snapshot (ArcSwap, no lock)
//!   -> first route whose literals and typed parameters match
//!   -> RouteMatch { tag, params: { job_id: 7 } }
//!   -> Dispatcher -> wrap_callback -> handler
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use oasmux::{GatewayConfig, InitOutcome, OpenApi, PluginCatalog, DocumentPlugin, SpecFlags};
//! use std::sync::Arc;
//!
//! let catalog = PluginCatalog::new()
//!     .with(Arc::new(DocumentPlugin::from_file("jobs.yaml", SpecFlags::empty())?));
//! let InitOutcome::Ready(openapi) = OpenApi::init(&catalog, &GatewayConfig::from_env(), &[])? else {
//!     return Ok(());
//! };
//! let tag = openapi.register_path("/slurm/v0.0.40/job/{job_id}")?;
//! let matched = openapi.find_path_tag(&http::Method::GET, "/slurm/v0.0.40/job/7");
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod ids;
pub mod logging;
pub mod merge;
pub mod openapi;
pub mod plugin;
pub mod router;
pub mod spec;

pub use config::GatewayConfig;
pub use context::{wrap_callback, CallOutcome, ErrorCode, RequestContext};
pub use dispatcher::{DispatchRequest, Dispatcher};
pub use openapi::{InitOutcome, OpenApi};
pub use plugin::{DocumentPlugin, OpenApiPlugin, PluginCatalog};
pub use router::{RouteMatch, RouteTable, RouteTag};
pub use spec::{SpecDocument, SpecError, SpecFlags};

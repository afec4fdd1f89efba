//! # Router Module
//!
//! Maps an incoming `(method, path)` pair to the [`RouteTag`] a plugin was
//! handed when it registered the matching URL template, and extracts typed
//! path parameters along the way.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling URL templates (`/jobs/{job_id}`) into segment matchers
//! - Locating the owning path item across plugin documents, honoring
//!   `servers` base paths and per-path overrides
//! - Typing parameter segments from the operation's `parameters`
//! - Matching request paths in registration order
//!
//! ## Architecture
//!
//! 1. **Compilation** ([`PathTemplate::compile`]): a template becomes an
//!    ordered list of literal and parameter [`PathEntry`] values.
//!
//! 2. **Registration** ([`RouteRegistry::register`]): the compiled entries are
//!    cloned once per HTTP method of the path item and annotated with that
//!    method's parameter types.
//!
//! 3. **Matching** ([`match_route`]): routes are tried in registration order;
//!    segment counts must agree, literals compare exactly, `integer` and
//!    `number` parameters must parse.
//!
//! [`RouteTable`] wraps the registry in an `ArcSwap` so lookups never block
//! on registration.
//!
//! ## Example
//!
//! ```rust,ignore
//! use oasmux::router::RouteTable;
//! use oasmux::spec::{SpecDocument, SpecFlags};
//!
//! let docs = vec![SpecDocument::new("openapi/jobs", doc, SpecFlags::empty())];
//! let table = RouteTable::new();
//! let tag = table.register(&docs, "/slurm/v0.0.40/job/{job_id}")?.unwrap();
//!
//! let m = table.find(&http::Method::GET, "/slurm/v0.0.40/job/42").unwrap();
//! assert_eq!(m.tag, tag);
//! assert_eq!(m.params.get("job_id").and_then(|v| v.as_i64()), Some(42));
//! ```

mod matcher;
mod registry;
mod table;
mod template;

pub use matcher::{match_route, split_request_path, ParamValue, PathParams, RouteMatch};
pub use registry::{MethodRoute, Route, RouteRegistry, RouteTag};
pub use table::RouteTable;
pub use template::{EntryKind, ParamType, PathEntry, PathTemplate, MAX_TEMPLATE_SEGMENTS};

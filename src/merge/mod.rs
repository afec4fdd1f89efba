//! # Merge Module
//!
//! Combines the partial OpenAPI documents published by each plugin into the
//! single specification clients see.
//!
//! ## Rules
//!
//! - `openapi`, `info`, `security` and `components.securitySchemes` come from
//!   the first document that defines them
//! - `info.version` is the configured label followed by `&<plugin type>` for
//!   every merged document
//! - `servers` is always `[{"url": "/"}]`; every path is instead prefixed with
//!   its document's (or its own override) server base path
//! - tags are deduplicated by name, first seen wins
//! - path and schema collisions overwrite and are logged at debug level
//!
//! Documents flagged [`SpecFlags::MANGLE_OPID`](crate::spec::SpecFlags) get
//! their `operationId`s prefixed with the server path so ids stay unique
//! across plugins; [`SpecFlags::SET_OPID`](crate::spec::SpecFlags) fills in
//! ids the plugin left out.

mod core;
pub mod operation_id;

pub use core::{merge, prune_template_paths, MergeOptions};

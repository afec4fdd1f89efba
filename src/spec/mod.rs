//! # Spec Module
//!
//! OpenAPI document model shared by the router, the merger and the plugin
//! context. Documents are kept as [`serde_json::Value`] trees so that plugin
//! authors may use any OpenAPI 3.0.x construct without this crate modelling
//! it.
//!
//! - [`types`] - [`SpecDocument`], [`SpecFlags`] and the HTTP method set
//! - [`error`] - [`SpecError`], the load-time failure class
//! - [`url`] - segment-wise path decomposition
//! - [`resolve`] - server-relative path resolution and `$ref` lookup
//! - [`load`] - reading documents from JSON/YAML text or files

pub mod error;
pub mod load;
pub mod resolve;
pub mod types;
pub mod url;

pub use error::{value_kind, SpecError};
pub use load::{load_document, parse_document, plugin_type_for_path};
pub use resolve::{canonical_paths, resolve_ref, resolve_template, server_url, ResolvedPath};
pub use types::{
    is_path_item_field, parse_method, OpenApiType, SpecDocument, SpecFlags, DATA_PARSER_TEMPLATE,
    SUPPORTED_METHODS,
};
pub use url::{decode_segment, join_path, server_path, split_path, Segments};

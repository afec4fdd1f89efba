//! # Context Module
//!
//! Per-call request context and response envelope assembly.
//!
//! A handler receives a [`RequestContext`] carrying the matched route, typed
//! path parameters, query parameters and the acquired resource handle. It
//! writes its payload into the response object and reports problems through
//! [`RequestContext::record_error`] and [`RequestContext::record_warning`].
//! [`wrap_callback`] then completes the envelope:
//!
//! ```json
//! {
//!   "<handler data>": "...",
//!   "meta": {"plugin": {...}, "client": {"source": "<request id>"}},
//!   "errors": [{"error_number": 3001, "error": "...", "description": "...", "source": "..."}],
//!   "warnings": [{"description": "...", "source": "..."}]
//! }
//! ```
//!
//! Request-time problems are never Rust errors: they are [`ErrorCode`]s
//! collected into the envelope, and the call's result code.

mod core;
mod error;
mod response;
mod serializer;

pub use core::{CallRequest, NoResource, RequestContext, ResourceError, ResourceProvider};
pub use error::{ErrorCode, ResponseError, ResponseWarning};
pub use response::{wrap_callback, CallOutcome, ERRORS_FIELD, META_FIELD, WARNINGS_FIELD};
pub use serializer::{
    JsonSerializer, MetaClient, MetaPlugin, ResponseMeta, ResponseSerializer, SerializeError,
};

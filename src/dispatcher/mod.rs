//! # Dispatcher Module
//!
//! Binds route tags to endpoint handlers and runs each matched request
//! through the request context.
//!
//! ## Request Flow
//!
//! 1. [`OpenApi::find_path_tag`](crate::openapi::OpenApi::find_path_tag)
//!    matches the request to a tag and typed path parameters
//! 2. The dispatcher looks up the handler bound to that tag
//! 3. [`wrap_callback`](crate::context::wrap_callback) acquires the resource,
//!    runs the handler and assembles the `meta` / `errors` / `warnings`
//!    envelope
//!
//! A handler panic is caught and reported as an error entry in the
//! envelope instead of unwinding into the transport.
//!
//! ```rust,ignore
//! let mut dispatcher = Dispatcher::new(NoResource);
//! let tag = openapi.register_path("/slurm/v0.0.40/job/{job_id}")?.unwrap();
//! dispatcher.bind(tag, ResponseMeta::for_plugin("openapi/jobs", "Jobs"), |ctx| {
//!     let id = ctx.param(true, "job_id", "get_job");
//!     ctx.response_mut().insert("job".into(), json!({"id": id}));
//!     Ok(())
//! });
//! let outcome = dispatcher.dispatch(&openapi, DispatchRequest::new(Method::GET, "/slurm/v0.0.40/job/7"));
//! ```

mod core;

pub use core::{DispatchRequest, Dispatcher, Handler};

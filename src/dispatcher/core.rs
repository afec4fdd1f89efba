use crate::context::{
    wrap_callback, CallOutcome, CallRequest, ErrorCode, JsonSerializer, RequestContext,
    ResourceProvider, ResponseMeta, ResponseSerializer,
};
use crate::ids::RequestId;
use crate::openapi::OpenApi;
use crate::router::RouteTag;
use http::Method;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Endpoint callback run through a [`RequestContext`].
pub type Handler<H> =
    Arc<dyn Fn(&mut RequestContext<'_, H>) -> Result<(), ErrorCode> + Send + Sync>;

struct Binding<H> {
    handler: Handler<H>,
    meta: ResponseMeta,
}

/// Raw request as handed over by the transport.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub method: Method,
    pub path: String,
    pub query: Map<String, Value>,
    /// Transport-supplied id, reused when it is a valid ULID.
    pub context_id: Option<String>,
}

impl DispatchRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Map::new(),
            context_id: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.query = query;
        self
    }
}

/// Maps route tags to handlers and runs matched requests through
/// [`wrap_callback`].
pub struct Dispatcher<P: ResourceProvider> {
    handlers: HashMap<RouteTag, Binding<P::Handle>>,
    provider: P,
    serializer: Arc<dyn ResponseSerializer>,
}

impl<P: ResourceProvider> Dispatcher<P> {
    /// Dispatcher using the JSON serializer.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self::with_serializer(provider, Arc::new(JsonSerializer))
    }

    #[must_use]
    pub fn with_serializer(provider: P, serializer: Arc<dyn ResponseSerializer>) -> Self {
        Self {
            handlers: HashMap::new(),
            provider,
            serializer,
        }
    }

    /// Bind `handler` to `tag`, replacing any previous binding.
    pub fn bind<F>(&mut self, tag: RouteTag, meta: ResponseMeta, handler: F)
    where
        F: Fn(&mut RequestContext<'_, P::Handle>) -> Result<(), ErrorCode> + Send + Sync + 'static,
    {
        let binding = Binding {
            handler: Arc::new(handler),
            meta,
        };
        if self.handlers.insert(tag, binding).is_some() {
            warn!(tag = %tag, total_handlers = self.handlers.len(), "Replaced existing handler");
        } else {
            info!(tag = %tag, total_handlers = self.handlers.len(), "Handler bound");
        }
    }

    /// Remove the binding for `tag`. Returns whether one existed.
    pub fn unbind(&mut self, tag: RouteTag) -> bool {
        let removed = self.handlers.remove(&tag).is_some();
        if removed {
            info!(tag = %tag, total_handlers = self.handlers.len(), "Handler unbound");
        }
        removed
    }

    #[must_use]
    pub fn is_bound(&self, tag: RouteTag) -> bool {
        self.handlers.contains_key(&tag)
    }

    /// Route and run one request.
    ///
    /// `None` is the not-found outcome: no route matches, or the matched tag
    /// has no handler bound.
    pub fn dispatch(&self, openapi: &OpenApi, request: DispatchRequest) -> Option<CallOutcome> {
        let Some(matched) = openapi.find_path_tag(&request.method, &request.path) else {
            debug!(method = %request.method, path = %request.path, "No route for request");
            return None;
        };

        let Some(binding) = self.handlers.get(&matched.tag) else {
            warn!(tag = %matched.tag, path = %request.path, "No handler bound for route");
            return None;
        };

        let call = CallRequest::new(request.method, request.path, matched.tag, matched.params)
            .with_query(request.query)
            .with_request_id(RequestId::from_context_or_new(request.context_id.as_deref()));

        let handler = Handler::clone(&binding.handler);
        Some(wrap_callback(
            call,
            &self.provider,
            self.serializer.as_ref(),
            &binding.meta,
            move |ctx| match catch_unwind(AssertUnwindSafe(|| handler(ctx))) {
                Ok(result) => result,
                Err(panic) => {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| (*s).to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    error!(tag = %ctx.tag(), panic = %message, "Handler panicked");
                    Err(ctx.record_error(
                        ErrorCode::UNSPECIFIED,
                        "dispatch",
                        format!("handler panicked: {message}"),
                    ))
                }
            },
        ))
    }
}

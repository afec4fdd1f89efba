use super::core::{CallRequest, RequestContext, ResourceProvider};
use super::error::{ErrorCode, ResponseError};
use super::serializer::{ResponseMeta, ResponseSerializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const META_FIELD: &str = "meta";
pub const ERRORS_FIELD: &str = "errors";
pub const WARNINGS_FIELD: &str = "warnings";

/// Result of one wrapped call: its code plus the assembled envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub code: ErrorCode,
    pub response: Value,
}

impl CallOutcome {
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

/// Run `handler` for one call and assemble the response envelope.
///
/// The resource is acquired first; if that fails the handler is skipped and
/// [`ErrorCode::DB_CONNECTION`] is recorded. Handlers may pre-populate
/// `meta`, `errors` or `warnings` themselves; only absent sections are
/// filled in. The outcome's code is the handler's error, else the first
/// recorded error, else success.
pub fn wrap_callback<P, F>(
    request: CallRequest,
    provider: &P,
    serializer: &dyn ResponseSerializer,
    plugin_meta: &ResponseMeta,
    handler: F,
) -> CallOutcome
where
    P: ResourceProvider + ?Sized,
    F: FnOnce(&mut RequestContext<'_, P::Handle>) -> Result<(), ErrorCode>,
{
    let mut meta = plugin_meta.clone();
    meta.plugin.data_parser = serializer.name().to_string();
    meta.client.source = request.request_id.to_string();

    debug!(
        request_id = %request.request_id,
        method = %request.method,
        path = %request.path,
        tag = %request.tag,
        serializer = %serializer.name(),
        "Dispatching call"
    );

    let mut ctx = RequestContext::new(request, serializer);

    let handler_result = match provider.acquire() {
        Ok(handle) => {
            ctx.set_handle(handle);
            handler(&mut ctx)
        }
        Err(e) => Err(ctx.record_error(
            ErrorCode::DB_CONNECTION,
            "wrap_callback",
            format!("failed to acquire resource: {e}"),
        )),
    };

    let RequestContext {
        request,
        mut response,
        errors,
        warnings,
        first_error,
        ..
    } = ctx;

    if !response.contains_key(META_FIELD) {
        let dumped = serializer.dump_meta(&meta).unwrap_or_else(|e| {
            warn!(request_id = %request.request_id, error = %e, "Unable to dump response meta");
            Value::Object(Map::new())
        });
        response.insert(META_FIELD.to_string(), dumped);
    }

    if !response.contains_key(ERRORS_FIELD) {
        let dumped = serializer.dump_errors(&errors).unwrap_or_else(|e| {
            warn!(request_id = %request.request_id, error = %e, "Unable to dump response errors");
            unsupported_errors()
        });
        response.insert(ERRORS_FIELD.to_string(), dumped);
    }

    if !response.contains_key(WARNINGS_FIELD) {
        let dumped = serializer.dump_warnings(&warnings).unwrap_or_else(|e| {
            warn!(request_id = %request.request_id, error = %e, "Unable to dump response warnings");
            Value::Array(Vec::new())
        });
        response.insert(WARNINGS_FIELD.to_string(), dumped);
    }

    let code = match handler_result {
        Err(code) => code,
        Ok(()) => first_error.unwrap_or(ErrorCode::SUCCESS),
    };

    debug!(
        request_id = %request.request_id,
        code = code.0,
        errors = errors.len(),
        warnings = warnings.len(),
        "Call complete"
    );

    CallOutcome {
        code,
        response: Value::Object(response),
    }
}

fn unsupported_errors() -> Value {
    let e = ResponseError::new(
        ErrorCode::NOT_SUPPORTED,
        None,
        Some("Requested data_parser plugin does not support OpenAPI plugin".to_string()),
    );
    let mut entry = Map::new();
    if let Some(desc) = e.description {
        entry.insert("description".to_string(), Value::String(desc));
    }
    entry.insert("error_number".to_string(), Value::from(e.error_number.0));
    entry.insert("error".to_string(), Value::String(e.error));
    Value::Array(vec![Value::Object(entry)])
}

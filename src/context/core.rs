use super::error::{ErrorCode, ResponseError, ResponseWarning};
use super::serializer::ResponseSerializer;
use crate::ids::RequestId;
use crate::router::{PathParams, RouteTag};
use crate::spec::value_kind;
use chrono::{DateTime, TimeZone, Utc};
use http::Method;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error};

/// Failure to obtain the per-call resource handle.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("resource unavailable: {0}")]
    Unavailable(String),
}

/// Source of the resource a handler works against (a database connection in
/// the daemon). Acquired once per call before the handler runs.
pub trait ResourceProvider: Send + Sync {
    type Handle;

    fn acquire(&self) -> Result<Self::Handle, ResourceError>;
}

/// Provider for handlers that need no resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResource;

impl ResourceProvider for NoResource {
    type Handle = ();

    fn acquire(&self) -> Result<(), ResourceError> {
        Ok(())
    }
}

/// Everything the router and transport know about one call.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub request_id: RequestId,
    pub method: Method,
    /// Request path as received.
    pub path: String,
    pub tag: RouteTag,
    /// Typed path parameters from the route match.
    pub path_params: PathParams,
    /// Parsed query parameters.
    pub query: Map<String, Value>,
}

impl CallRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, tag: RouteTag, path_params: PathParams) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            tag,
            path_params,
            query: Map::new(),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }
}

/// Per-call state threaded through a handler.
///
/// Collects errors and warnings, holds the response object under
/// construction, and carries the acquired resource handle. Single-threaded
/// and dropped once the envelope has been assembled.
pub struct RequestContext<'a, H> {
    pub(super) request: CallRequest,
    pub(super) serializer: &'a dyn ResponseSerializer,
    pub(super) handle: Option<H>,
    pub(super) response: Map<String, Value>,
    pub(super) errors: Vec<ResponseError>,
    pub(super) warnings: Vec<ResponseWarning>,
    pub(super) first_error: Option<ErrorCode>,
}

impl<'a, H> RequestContext<'a, H> {
    pub(crate) fn new(request: CallRequest, serializer: &'a dyn ResponseSerializer) -> Self {
        Self {
            request,
            serializer,
            handle: None,
            response: Map::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            first_error: None,
        }
    }

    pub(crate) fn set_handle(&mut self, handle: H) {
        self.handle = Some(handle);
    }

    #[inline]
    #[must_use]
    pub fn request(&self) -> &CallRequest {
        &self.request
    }

    #[inline]
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request.request_id
    }

    #[inline]
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.request.method
    }

    #[inline]
    #[must_use]
    pub fn tag(&self) -> RouteTag {
        self.request.tag
    }

    #[inline]
    #[must_use]
    pub fn serializer(&self) -> &dyn ResponseSerializer {
        self.serializer
    }

    /// Resource acquired for this call. Always present inside a handler.
    #[must_use]
    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    pub fn handle_mut(&mut self) -> Option<&mut H> {
        self.handle.as_mut()
    }

    /// Response object the handler fills in.
    pub fn response_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.response
    }

    #[must_use]
    pub fn response(&self) -> &Map<String, Value> {
        &self.response
    }

    #[must_use]
    pub fn errors(&self) -> &[ResponseError] {
        &self.errors
    }

    #[must_use]
    pub fn warnings(&self) -> &[ResponseWarning] {
        &self.warnings
    }

    /// First non-success code recorded, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<ErrorCode> {
        self.first_error
    }

    /// Append an error to the response. Returns `code` so handlers can write
    /// `return Err(ctx.record_error(...))`.
    pub fn record_error(
        &mut self,
        code: ErrorCode,
        source: &str,
        description: impl Into<String>,
    ) -> ErrorCode {
        let description = description.into();
        error!(
            request_id = %self.request.request_id,
            source = %source,
            serializer = %self.serializer.name(),
            code = code.0,
            error = %code.description(),
            "{description}"
        );

        if !code.is_success() && self.first_error.is_none() {
            self.first_error = Some(code);
        }
        self.errors
            .push(ResponseError::new(code, Some(source), Some(description)));
        code
    }

    /// Append a warning to the response.
    pub fn record_warning(&mut self, source: &str, description: impl Into<String>) {
        let description = description.into();
        debug!(
            request_id = %self.request.request_id,
            source = %source,
            serializer = %self.serializer.name(),
            "WARNING: {description}"
        );
        self.warnings.push(ResponseWarning {
            description: Some(description),
            source: Some(source.to_string()),
        });
    }

    /// Look up a parameter, path parameters first, then the query.
    ///
    /// A missing required parameter records
    /// [`ErrorCode::DATA_PATH_NOT_FOUND`].
    pub fn param(&mut self, required: bool, name: &str, caller: &str) -> Option<Value> {
        let found = self
            .request
            .path_params
            .get(name)
            .map(|v| v.to_value())
            .or_else(|| self.request.query.get(name).cloned());

        if found.is_none() && required {
            self.record_error(
                ErrorCode::DATA_PATH_NOT_FOUND,
                caller,
                format!("Required parameter \"{name}\" not found"),
            );
        }
        found
    }

    /// Look up a parameter as a non-empty string.
    ///
    /// Values that cannot be rendered as text, and empty strings, are
    /// rejected with an error when `required` and ignored with a warning
    /// otherwise.
    pub fn str_param(&mut self, required: bool, name: &str, caller: &str) -> Option<String> {
        let value = self.param(required, name, caller)?;

        let text = match &value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        };

        match text {
            None => {
                let kind = value_kind(&value);
                if required {
                    self.record_error(
                        ErrorCode::DATA_CONV_FAILED,
                        caller,
                        format!("Rejecting required parameter \"{name}\" provided with format {kind} which was unable to be converted to string."),
                    );
                } else {
                    self.record_warning(
                        caller,
                        format!("Ignoring parameter \"{name}\" provided with format {kind} which was unable to be converted to string."),
                    );
                }
                None
            }
            Some(s) if s.is_empty() => {
                if required {
                    self.record_error(
                        ErrorCode::DATA_PARSE_NOTHING,
                        caller,
                        format!("Rejecting empty required parameter \"{name}\""),
                    );
                } else {
                    self.record_warning(caller, format!("Ignoring empty parameter \"{name}\""));
                }
                None
            }
            Some(s) => Some(s),
        }
    }

    /// Look up a parameter as a timestamp: integer epoch seconds or RFC 3339.
    ///
    /// # Errors
    ///
    /// - [`ErrorCode::REST_EMPTY_RESULT`] when the parameter is absent
    /// - [`ErrorCode::DATA_CONV_FAILED`] when it is not a valid timestamp
    ///   (recorded as an error when `required`, as a warning otherwise)
    pub fn timestamp_param(
        &mut self,
        required: bool,
        name: &str,
        caller: &str,
    ) -> Result<DateTime<Utc>, ErrorCode> {
        let Some(value) = self.param(required, name, caller) else {
            return Err(ErrorCode::REST_EMPTY_RESULT);
        };

        match parse_timestamp(&value) {
            Some(t) => Ok(t),
            None => {
                if required {
                    self.record_error(
                        ErrorCode::DATA_CONV_FAILED,
                        caller,
                        format!("Rejecting invalid required timestamp parameter \"{name}\""),
                    );
                } else {
                    self.record_warning(
                        caller,
                        format!("Ignoring invalid timestamp parameter \"{name}\""),
                    );
                }
                Err(ErrorCode::DATA_CONV_FAILED)
            }
        }
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let from_epoch = |secs: i64| Utc.timestamp_opt(secs, 0).single();
    match value {
        Value::Number(n) => n.as_i64().and_then(from_epoch),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(secs) => from_epoch(secs),
                Err(_) => DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|t| t.with_timezone(&Utc)),
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::JsonSerializer;
    use crate::router::{split_request_path, RouteRegistry};
    use crate::spec::{SpecDocument, SpecFlags};
    use serde_json::json;

    fn request_with_path_param() -> CallRequest {
        let docs = vec![SpecDocument::new(
            "openapi/test",
            json!({
                "servers": [{"url": "/"}],
                "paths": {"/job/{job_id}": {"get": {"parameters": [
                    {"name": "job_id", "in": "path", "schema": {"type": "integer"}}
                ]}}}
            }),
            SpecFlags::empty(),
        )];
        let mut reg = RouteRegistry::new();
        reg.register(&docs, "/job/{job_id}").unwrap().unwrap();
        let m = reg
            .find(&split_request_path("/job/12"), &Method::GET)
            .unwrap();

        let mut query = Map::new();
        query.insert("name".into(), json!("alpha"));
        query.insert("empty".into(), json!(""));
        query.insert("list".into(), json!([1, 2]));
        query.insert("since".into(), json!("2024-03-01T00:00:00Z"));
        query.insert("epoch".into(), json!(86400));
        query.insert("bad_time".into(), json!("yesterday"));
        CallRequest::new(Method::GET, "/job/12", m.tag, m.params).with_query(query)
    }

    fn ctx(serializer: &JsonSerializer) -> RequestContext<'_, ()> {
        RequestContext::new(request_with_path_param(), serializer)
    }

    #[test]
    fn test_param_path_then_query() {
        let s = JsonSerializer;
        let mut c = ctx(&s);
        assert_eq!(c.param(true, "job_id", "test"), Some(json!(12)));
        assert_eq!(c.param(true, "name", "test"), Some(json!("alpha")));
        assert!(c.errors().is_empty());
    }

    #[test]
    fn test_missing_required_param_records_error() {
        let s = JsonSerializer;
        let mut c = ctx(&s);
        assert!(c.param(false, "nope", "test").is_none());
        assert!(c.errors().is_empty());

        assert!(c.param(true, "nope", "test").is_none());
        assert_eq!(c.errors()[0].error_number, ErrorCode::DATA_PATH_NOT_FOUND);
        assert_eq!(c.first_error(), Some(ErrorCode::DATA_PATH_NOT_FOUND));
    }

    #[test]
    fn test_str_param_conversions() {
        let s = JsonSerializer;
        let mut c = ctx(&s);
        assert_eq!(c.str_param(true, "job_id", "test").as_deref(), Some("12"));

        assert!(c.str_param(false, "list", "test").is_none());
        assert_eq!(c.warnings().len(), 1);
        assert!(c.errors().is_empty());

        assert!(c.str_param(true, "list", "test").is_none());
        assert_eq!(c.errors()[0].error_number, ErrorCode::DATA_CONV_FAILED);

        assert!(c.str_param(false, "empty", "test").is_none());
        assert_eq!(c.warnings().len(), 2);
        assert!(c.str_param(true, "empty", "test").is_none());
        assert_eq!(c.errors()[1].error_number, ErrorCode::DATA_PARSE_NOTHING);

        // first recorded error sticks
        assert_eq!(c.first_error(), Some(ErrorCode::DATA_CONV_FAILED));
    }

    #[test]
    fn test_timestamp_param() {
        let s = JsonSerializer;
        let mut c = ctx(&s);
        let t = c.timestamp_param(true, "since", "test").unwrap();
        assert_eq!(t.timestamp(), 1_709_251_200);
        assert_eq!(c.timestamp_param(true, "epoch", "test").unwrap().timestamp(), 86400);

        assert_eq!(
            c.timestamp_param(false, "absent", "test"),
            Err(ErrorCode::REST_EMPTY_RESULT)
        );
        assert!(c.errors().is_empty());

        assert_eq!(
            c.timestamp_param(false, "bad_time", "test"),
            Err(ErrorCode::DATA_CONV_FAILED)
        );
        assert_eq!(c.warnings().len(), 1);
        assert_eq!(
            c.timestamp_param(true, "bad_time", "test"),
            Err(ErrorCode::DATA_CONV_FAILED)
        );
        assert_eq!(c.errors().len(), 1);
    }

    #[test]
    fn test_success_code_does_not_set_first_error() {
        let s = JsonSerializer;
        let mut c = ctx(&s);
        c.record_error(ErrorCode::SUCCESS, "test", "informational");
        assert_eq!(c.errors().len(), 1);
        assert!(c.first_error().is_none());
    }
}

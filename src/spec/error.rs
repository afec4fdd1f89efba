use thiserror::Error;

/// Load-time specification defects.
///
/// Plugin documents are built into the gateway, so every variant here is a
/// build defect rather than a transient condition. Callers in the load phase
/// must treat any `SpecError` as fatal; request-time code never produces one.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Template contains a `.` or `..` segment.
    #[error("invalid segment `{segment}` in path template {template}")]
    InvalidTemplate { template: String, segment: String },

    /// Template has more `/`-separated components than the compiler accepts.
    #[error("path template {template} has {count} components (max {max})")]
    TemplateTooLong {
        template: String,
        count: usize,
        max: usize,
    },

    /// OAS 3.0.3 §4.7.5 requires `url` on every server object.
    #[error("server {server} lacks url field required per OASv3.0.3 section 4.7.5")]
    MissingServerUrl { server: String },

    #[error("path {path} parameter has invalid name")]
    InvalidParameterName { path: String },

    #[error("path {path} parameter {name} is missing schema type")]
    MissingParameterType { path: String, name: String },

    #[error("path {path} parameter {name} has invalid type {found}")]
    InvalidParameterType {
        path: String,
        name: String,
        found: String,
    },

    /// A `$ref` did not resolve inside its own document.
    #[error("unresolvable reference {reference} at {location}")]
    UnresolvedRef { location: String, reference: String },

    /// A document node has the wrong shape (e.g. a path item that is a list).
    #[error("{location}: expected {expected} but found {found}")]
    UnexpectedType {
        location: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid tag entry in {plugin}: {reason}")]
    InvalidTag { plugin: String, reason: String },

    #[error("[{method} {path}] unexpected type for operationId: {found}")]
    InvalidOperationId {
        method: String,
        path: String,
        found: &'static str,
    },

    #[error("unable to find plugin: {name}")]
    UnknownPlugin { name: String },

    #[error("no OpenAPI plugins to load")]
    NoPlugins,

    #[error("plugin {plugin} did not provide an OpenAPI specification")]
    PluginIncomplete { plugin: String },

    #[error("plugin {plugin} failed to initialize: {reason}")]
    PluginInit { plugin: String, reason: String },

    #[error("schema specifier {specifier} failed on {plugin}: {reason}")]
    Specifier {
        specifier: String,
        plugin: String,
        reason: String,
    },
}

/// Name of a JSON value's variant, for diagnostics.
#[must_use]
pub fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(n) if n.is_f64() => "float",
        serde_json::Value::Number(_) => "integer",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "dictionary",
    }
}

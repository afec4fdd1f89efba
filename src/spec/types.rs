use bitflags::bitflags;
use http::Method;
use serde_json::Value;

/// HTTP methods a path item may declare operations for.
pub const SUPPORTED_METHODS: [Method; 8] = [
    Method::GET,
    Method::PUT,
    Method::POST,
    Method::DELETE,
    Method::OPTIONS,
    Method::HEAD,
    Method::PATCH,
    Method::TRACE,
];

/// Marker carried by template paths that only exist to be specialised by a
/// schema specifier. Such paths never reach clients.
pub const DATA_PARSER_TEMPLATE: &str = "{data_parser}";

bitflags! {
    /// Per-document merge behaviour, reported by the plugin alongside its
    /// specification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpecFlags: u32 {
        /// Prefix every existing `operationId` with the server base path.
        const MANGLE_OPID = 1 << 0;
        /// Synthesize `operationId` where the plugin did not define one.
        const SET_OPID = 1 << 1;
        /// Run the registered schema specifiers over the document at load.
        const APPLY_EXTERNAL_SCHEMA = 1 << 2;
    }
}

/// One plugin's raw OpenAPI document plus how it should be merged.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    /// Plugin type name, e.g. `openapi/jobs`.
    pub plugin_type: String,
    pub document: Value,
    pub flags: SpecFlags,
}

impl SpecDocument {
    pub fn new(plugin_type: impl Into<String>, document: Value, flags: SpecFlags) -> Self {
        Self {
            plugin_type: plugin_type.into(),
            document,
            flags,
        }
    }
}

/// OpenAPI data types a parameter schema may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenApiType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl OpenApiType {
    /// Parse a `schema.type` value. Unknown names yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Some(OpenApiType::String),
            "integer" => Some(OpenApiType::Integer),
            "number" => Some(OpenApiType::Number),
            "boolean" => Some(OpenApiType::Boolean),
            "array" => Some(OpenApiType::Array),
            "object" => Some(OpenApiType::Object),
            _ => None,
        }
    }
}

impl std::fmt::Display for OpenApiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OpenApiType::String => "string",
            OpenApiType::Integer => "integer",
            OpenApiType::Number => "number",
            OpenApiType::Boolean => "boolean",
            OpenApiType::Array => "array",
            OpenApiType::Object => "object",
        };
        write!(f, "{s}")
    }
}

/// Map a path-item key to a supported HTTP method (case-insensitive).
#[must_use]
pub fn parse_method(key: &str) -> Option<Method> {
    SUPPORTED_METHODS
        .iter()
        .find(|m| m.as_str().eq_ignore_ascii_case(key))
        .cloned()
}

/// Path-item keys that describe the item rather than an operation.
#[must_use]
pub fn is_path_item_field(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "summary" | "description" | "servers" | "parameters" | "$ref"
    ) || key.starts_with("x-")
}

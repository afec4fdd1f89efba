use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric result code of a dispatched call.
///
/// Codes are grouped by origin: `1xxx` request handling, `2xxx` resources,
/// `3xxx` data conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    pub const SUCCESS: ErrorCode = ErrorCode(0);
    pub const UNSPECIFIED: ErrorCode = ErrorCode(1000);
    pub const NOT_SUPPORTED: ErrorCode = ErrorCode(1001);
    pub const REST_EMPTY_RESULT: ErrorCode = ErrorCode(1002);
    pub const REST_INVALID_QUERY: ErrorCode = ErrorCode(1003);
    pub const DB_CONNECTION: ErrorCode = ErrorCode(2000);
    pub const DATA_PATH_NOT_FOUND: ErrorCode = ErrorCode(3000);
    pub const DATA_CONV_FAILED: ErrorCode = ErrorCode(3001);
    pub const DATA_PARSE_NOTHING: ErrorCode = ErrorCode(3002);

    #[inline]
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// Human-readable meaning of the code.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::SUCCESS => "No error",
            Self::UNSPECIFIED => "Unspecified error",
            Self::NOT_SUPPORTED => "Requested operation not supported",
            Self::REST_EMPTY_RESULT => "Nothing found with query",
            Self::REST_INVALID_QUERY => "Query empty or not RFC7320 compliant",
            Self::DB_CONNECTION => "Unable to connect to database",
            Self::DATA_PATH_NOT_FOUND => "Unable to resolve path",
            Self::DATA_CONV_FAILED => "Unable to convert data",
            Self::DATA_PARSE_NOTHING => "Data parsing found nothing",
            _ => "Unknown error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.description(), self.0)
    }
}

/// One entry of a response's `errors` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub error_number: ErrorCode,
    /// Text form of `error_number`.
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ResponseError {
    #[must_use]
    pub fn new(code: ErrorCode, source: Option<&str>, description: Option<String>) -> Self {
        Self {
            description,
            error_number: code,
            error: code.description().to_string(),
            source: source.map(str::to_string),
        }
    }
}

/// One entry of a response's `warnings` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

use super::error::{ResponseError, ResponseWarning};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failure to represent a response section.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// The serializer has no representation for this section.
    #[error("{serializer} does not support {section}")]
    Unsupported {
        serializer: String,
        section: &'static str,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Plugin block of [`ResponseMeta`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaPlugin {
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub name: String,
    /// Serializer used for this response; filled in per call.
    pub data_parser: String,
}

/// Client block of [`ResponseMeta`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaClient {
    /// Request id of the call.
    pub source: String,
}

/// The `meta` section of a response envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub plugin: MetaPlugin,
    pub client: MetaClient,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
}

impl ResponseMeta {
    #[must_use]
    pub fn for_plugin(plugin_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            plugin: MetaPlugin {
                plugin_type: plugin_type.into(),
                name: name.into(),
                data_parser: String::new(),
            },
            ..Self::default()
        }
    }
}

/// Adapter turning response sections into document values.
pub trait ResponseSerializer: Send + Sync {
    /// Serializer name reported in `meta.plugin.data_parser`.
    fn name(&self) -> &str;

    fn dump_meta(&self, meta: &ResponseMeta) -> Result<Value, SerializeError>;

    fn dump_errors(&self, errors: &[ResponseError]) -> Result<Value, SerializeError>;

    fn dump_warnings(&self, warnings: &[ResponseWarning]) -> Result<Value, SerializeError>;
}

/// Default adapter backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl ResponseSerializer for JsonSerializer {
    fn name(&self) -> &str {
        "data_parser/json"
    }

    fn dump_meta(&self, meta: &ResponseMeta) -> Result<Value, SerializeError> {
        Ok(serde_json::to_value(meta)?)
    }

    fn dump_errors(&self, errors: &[ResponseError]) -> Result<Value, SerializeError> {
        Ok(serde_json::to_value(errors)?)
    }

    fn dump_warnings(&self, warnings: &[ResponseWarning]) -> Result<Value, SerializeError> {
        Ok(serde_json::to_value(warnings)?)
    }
}

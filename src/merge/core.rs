use super::operation_id;
use crate::spec::{
    join_path, server_path, server_url, split_path, value_kind, SpecDocument, SpecError,
    SpecFlags, DATA_PARSER_TEMPLATE,
};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

/// Inputs to [`merge`] that do not come from the documents themselves.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Leading part of the synthesized `info.version`.
    pub version_label: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            version_label: concat!("oasmux-", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Copy `src[key]` into `dst[key]` unless `dst` already has it.
fn copy_first(dst: &mut Map<String, Value>, src: &Value, key: &str) {
    if dst.contains_key(key) {
        return;
    }
    if let Some(v) = src.get(key) {
        dst.insert(key.to_string(), v.clone());
    }
}

fn merge_tags(
    tags: &mut Vec<Value>,
    doc: &SpecDocument,
) -> Result<(), SpecError> {
    let Some(src) = doc.document.get("tags") else {
        return Ok(());
    };
    let Some(src) = src.as_array() else {
        return Err(SpecError::InvalidTag {
            plugin: doc.plugin_type.clone(),
            reason: format!("tags must be a list, found {}", value_kind(src)),
        });
    };

    for tag in src {
        let Some(obj) = tag.as_object() else {
            return Err(SpecError::InvalidTag {
                plugin: doc.plugin_type.clone(),
                reason: format!("tag must be a dictionary, found {}", value_kind(tag)),
            });
        };
        let Some(name) = obj.get("name").and_then(Value::as_str) else {
            return Err(SpecError::InvalidTag {
                plugin: doc.plugin_type.clone(),
                reason: "tag name must be a string".to_string(),
            });
        };

        if tags.iter().any(|t| t.get("name").and_then(Value::as_str) == Some(name)) {
            continue;
        }

        let mut entry = Map::new();
        entry.insert("name".to_string(), Value::String(name.to_string()));
        if let Some(desc) = obj.get("description") {
            entry.insert("description".to_string(), desc.clone());
        }
        tags.push(Value::Object(entry));
    }
    Ok(())
}

fn first_override_server(
    path_key: &str,
    servers: &Value,
) -> Result<Option<Vec<String>>, SpecError> {
    let Some(list) = servers.as_array() else {
        return Err(SpecError::UnexpectedType {
            location: format!("paths.{path_key}.servers"),
            expected: "list",
            found: value_kind(servers),
        });
    };
    if list.len() > 1 {
        warn!(
            path = %path_key,
            servers = list.len(),
            "Only the first path server override is merged"
        );
    }
    match list.first() {
        Some(server) => Ok(Some(server_path(server_url(server)?).into_vec())),
        None => Ok(None),
    }
}

fn merge_path_items(
    paths: &mut Map<String, Value>,
    src: &Map<String, Value>,
    server: &[String],
    flags: SpecFlags,
) -> Result<(), SpecError> {
    for (key, item) in src {
        if !item.is_object() {
            return Err(SpecError::UnexpectedType {
                location: format!("paths.{key}"),
                expected: "dictionary",
                found: value_kind(item),
            });
        }

        let prefix = match item.get("servers") {
            Some(servers) => {
                first_override_server(key, servers)?.unwrap_or_else(|| server.to_vec())
            }
            None => server.to_vec(),
        };

        let mut segments = prefix.clone();
        segments.extend(split_path(key));
        let merged_path = join_path(&segments);

        if paths.contains_key(&merged_path) {
            debug!(path = %merged_path, "Overwriting path");
        }

        let mut copy = item.clone();
        if flags.intersects(SpecFlags::MANGLE_OPID | SpecFlags::SET_OPID) {
            operation_id::apply(&mut copy, flags, &prefix, key, &merged_path)?;
        }
        paths.insert(merged_path, copy);
    }
    Ok(())
}

fn merge_schemas(
    schemas: &mut Map<String, Value>,
    doc: &SpecDocument,
) -> Result<(), SpecError> {
    let Some(src) = doc
        .document
        .get("components")
        .and_then(|c| c.get("schemas"))
    else {
        return Ok(());
    };
    let Some(src) = src.as_object() else {
        return Err(SpecError::UnexpectedType {
            location: format!("{} components.schemas", doc.plugin_type),
            expected: "dictionary",
            found: value_kind(src),
        });
    };

    for (name, schema) in src {
        if !schema.is_object() {
            return Err(SpecError::UnexpectedType {
                location: format!("components.schemas.{name}"),
                expected: "dictionary",
                found: value_kind(schema),
            });
        }
        if schemas.contains_key(name) {
            debug!(schema = %name, plugin = %doc.plugin_type, "Overwriting component schema");
        }
        schemas.insert(name.clone(), schema.clone());
    }
    Ok(())
}

/// Combine plugin documents into the single specification served to clients.
///
/// Deterministic for a given document order. Source documents are only read.
///
/// # Errors
///
/// [`SpecError`] when a document is malformed: a server without `url`, a
/// path item or schema that is not a dictionary, an invalid tag, or an
/// `operationId` that cannot be mangled.
pub fn merge(docs: &[SpecDocument], options: &MergeOptions) -> Result<Value, SpecError> {
    let mut root = Map::new();
    let mut tags: Vec<Value> = Vec::new();
    let mut paths = Map::new();
    let mut schemas = Map::new();
    let mut security_schemes: Option<Value> = None;

    for doc in docs {
        let src = &doc.document;
        copy_first(&mut root, src, "openapi");
        copy_first(&mut root, src, "info");
        copy_first(&mut root, src, "security");
        if security_schemes.is_none() {
            security_schemes = src
                .get("components")
                .and_then(|c| c.get("securitySchemes"))
                .cloned();
        }

        merge_tags(&mut tags, doc)?;

        if let Some(src_paths) = src.get("paths") {
            let Some(src_paths) = src_paths.as_object() else {
                return Err(SpecError::UnexpectedType {
                    location: format!("{} paths", doc.plugin_type),
                    expected: "dictionary",
                    found: value_kind(src_paths),
                });
            };

            match src.get("servers").and_then(Value::as_array) {
                Some(servers) => {
                    for server in servers {
                        let base = server_path(server_url(server)?);
                        merge_path_items(&mut paths, src_paths, &base, doc.flags)?;
                    }
                }
                None => merge_path_items(&mut paths, src_paths, &[], doc.flags)?,
            }
        }

        merge_schemas(&mut schemas, doc)?;

        debug!(
            plugin = %doc.plugin_type,
            paths = paths.len(),
            schemas = schemas.len(),
            "Merged plugin specification"
        );
    }

    let mut version = options.version_label.clone();
    for doc in docs {
        version.push('&');
        version.push_str(&doc.plugin_type);
    }
    let info = root
        .entry("info")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(info) = info.as_object_mut() {
        info.insert("version".to_string(), Value::String(version));
    }

    root.insert("servers".to_string(), json!([{"url": "/"}]));
    root.insert("tags".to_string(), Value::Array(tags));
    info!(
        documents = docs.len(),
        paths = paths.len(),
        schemas = schemas.len(),
        "Merged OpenAPI specification"
    );
    root.insert("paths".to_string(), Value::Object(paths));

    let mut components = Map::new();
    components.insert("schemas".to_string(), Value::Object(schemas));
    if let Some(schemes) = security_schemes {
        components.insert("securitySchemes".to_string(), schemes);
    }
    root.insert("components".to_string(), Value::Object(components));

    Ok(Value::Object(root))
}

/// Drop every path whose key carries the `{data_parser}` template marker.
/// Returns the number of paths removed.
pub fn prune_template_paths(doc: &mut Value) -> usize {
    let Some(paths) = doc.get_mut("paths").and_then(Value::as_object_mut) else {
        return 0;
    };
    let before = paths.len();
    paths.retain(|key, _| {
        let keep = !key.contains(DATA_PARSER_TEMPLATE);
        if !keep {
            debug!(path = %key, "Pruning template path");
        }
        keep
    });
    before - paths.len()
}

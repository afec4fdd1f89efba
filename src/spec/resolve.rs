//! Server-relative path resolution.
//!
//! A route template such as `/slurm/v0.0.40/job/{job_id}` is matched against
//! each document's `servers` base paths joined with its `paths` keys. A path
//! item carrying its own `servers` list uses those servers instead of the
//! document-level ones (OAS 3.0.3 §4.7.9.1).

use super::error::{value_kind, SpecError};
use super::types::SpecDocument;
use super::url::{join_path, server_path, split_path, Segments};
use serde_json::Value;
use tracing::debug;

/// A document path item located for a template.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPath<'a> {
    /// Index of the owning document in the searched slice.
    pub document_index: usize,
    /// The `paths` key as written in the document.
    pub path_key: &'a str,
    pub item: &'a Value,
}

/// Read the mandatory `url` of a server object.
pub fn server_url(server: &Value) -> Result<&str, SpecError> {
    server
        .get("url")
        .and_then(Value::as_str)
        .ok_or_else(|| SpecError::MissingServerUrl {
            server: server.to_string(),
        })
}

/// Resolve a local `$ref` (`#/components/parameters/Id`) inside `doc`.
#[must_use]
pub fn resolve_ref<'a>(doc: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#').unwrap_or(reference);
    if pointer.is_empty() {
        return Some(doc);
    }
    doc.pointer(pointer)
}

fn joined_matches(server: &[String], key: &[String], target: &[String]) -> bool {
    server.len() + key.len() == target.len()
        && server.iter().chain(key.iter()).zip(target).all(|(a, b)| a == b)
}

fn servers_and_paths(doc: &Value) -> Option<(&Vec<Value>, &serde_json::Map<String, Value>)> {
    let servers = doc.get("servers").and_then(Value::as_array)?;
    let paths = doc.get("paths").and_then(Value::as_object)?;
    Some((servers, paths))
}

/// Find the path item that `template` refers to.
///
/// Documents are searched in order and the first match wins. Documents
/// without both `servers` and `paths` are skipped.
///
/// # Errors
///
/// [`SpecError::MissingServerUrl`] when a server object lacks `url`, and
/// [`SpecError::UnexpectedType`] when a path item's `servers` is not a list.
pub fn resolve_template<'a>(
    docs: &'a [SpecDocument],
    template: &str,
) -> Result<Option<ResolvedPath<'a>>, SpecError> {
    let target = split_path(template);

    for (document_index, doc) in docs.iter().enumerate() {
        let Some((servers, paths)) = servers_and_paths(&doc.document) else {
            debug!(
                plugin = %doc.plugin_type,
                "Skipping document without servers or paths"
            );
            continue;
        };

        for server in servers {
            let base = server_path(server_url(server)?);

            for (path_key, item) in paths {
                let key = split_path(path_key);

                let found = match item.get("servers") {
                    Some(Value::Array(overrides)) => {
                        let mut found = false;
                        for o in overrides {
                            if joined_matches(&server_path(server_url(o)?), &key, &target) {
                                found = true;
                                break;
                            }
                        }
                        found
                    }
                    Some(other) => {
                        return Err(SpecError::UnexpectedType {
                            location: format!("paths.{path_key}.servers"),
                            expected: "list",
                            found: value_kind(other),
                        })
                    }
                    None => joined_matches(&base, &key, &target),
                };

                debug!(
                    template = %template,
                    plugin = %doc.plugin_type,
                    server_path = %join_path(&base),
                    path_key = %path_key,
                    matched = found,
                    "Server path match attempt"
                );

                if found {
                    return Ok(Some(ResolvedPath {
                        document_index,
                        path_key: path_key.as_str(),
                        item,
                    }));
                }
            }
        }
    }

    Ok(None)
}

/// Every routable template of a document: each server (or per-path override
/// server) joined with each path key, in document order without duplicates.
///
/// # Errors
///
/// [`SpecError::MissingServerUrl`] when a server object lacks `url`, and
/// [`SpecError::UnexpectedType`] when `servers` is not a list.
pub fn canonical_paths(doc: &Value) -> Result<Vec<String>, SpecError> {
    let mut out: Vec<String> = Vec::new();
    let Some((servers, paths)) = servers_and_paths(doc) else {
        return Ok(out);
    };

    let mut push = |segments: Segments| {
        let p = join_path(&segments);
        if !out.contains(&p) {
            out.push(p);
        }
    };

    for server in servers {
        let base = server_path(server_url(server)?);
        for (path_key, item) in paths {
            let key = split_path(path_key);
            match item.get("servers") {
                Some(Value::Array(overrides)) => {
                    for o in overrides {
                        let mut joined = server_path(server_url(o)?);
                        joined.extend(key.iter().cloned());
                        push(joined);
                    }
                }
                Some(other) => {
                    return Err(SpecError::UnexpectedType {
                        location: format!("paths.{path_key}.servers"),
                        expected: "list",
                        found: value_kind(other),
                    })
                }
                None => {
                    let mut joined = base.clone();
                    joined.extend(key.iter().cloned());
                    push(joined);
                }
            }
        }
    }

    Ok(out)
}

use crate::spec::{split_path, value_kind, SpecError, SpecFlags};
use http::Method;
use serde_json::Value;
use tracing::debug;

/// Make an id component usable as a generated-code identifier.
#[must_use]
pub fn slug(part: &str) -> String {
    part.replace(['.', '{', '}'], "_")
}

fn join_slugged<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(slug)
        .collect::<Vec<_>>()
        .join("_")
}

/// Prefix an existing id with the server base path: `/a` + `getX` → `a_getX`.
///
/// # Errors
///
/// [`SpecError::InvalidOperationId`] when the id is neither a string nor a
/// number.
pub fn mangle(
    prefix: &[String],
    existing: &Value,
    method: &Method,
    path: &str,
) -> Result<String, SpecError> {
    let id = match existing {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(SpecError::InvalidOperationId {
                method: method.to_string(),
                path: path.to_string(),
                found: value_kind(other),
            })
        }
    };

    // split only: no query stripping or decoding
    Ok(join_slugged(
        prefix
            .iter()
            .map(String::as_str)
            .chain(id.split('/').filter(|s| !s.is_empty())),
    ))
}

/// Synthesize an id from the method, server base path and path key:
/// `GET` + `/a` + `/x/{id}` → `get_a_x__id_`.
#[must_use]
pub fn synthesize(method: &Method, prefix: &[String], path_key: &str) -> String {
    let method = method.as_str().to_ascii_lowercase();
    let key = split_path(path_key);
    join_slugged(
        std::iter::once(method.as_str())
            .chain(prefix.iter().map(String::as_str))
            .chain(key.iter().map(String::as_str)),
    )
}

/// Rewrite or fill `operationId` on every operation of a merged path item.
pub(crate) fn apply(
    item: &mut Value,
    flags: SpecFlags,
    prefix: &[String],
    path_key: &str,
    merged_path: &str,
) -> Result<(), SpecError> {
    let Some(item) = item.as_object_mut() else {
        return Ok(());
    };

    for (key, operation) in item.iter_mut() {
        let Some(method) = crate::spec::parse_method(key) else {
            continue;
        };
        let Some(op) = operation.as_object_mut() else {
            continue;
        };

        if flags.contains(SpecFlags::MANGLE_OPID) {
            let Some(existing) = op.get("operationId") else {
                debug!(
                    method = %method,
                    path = %merged_path,
                    "Operation has no operationId to mangle"
                );
                continue;
            };
            let id = mangle(prefix, existing, &method, merged_path)?;
            debug!(method = %method, path = %merged_path, operation_id = %id, "Mangled operationId");
            op.insert("operationId".to_string(), Value::String(id));
        } else if flags.contains(SpecFlags::SET_OPID) && !op.contains_key("operationId") {
            let id = synthesize(&method, prefix, path_key);
            debug!(method = %method, path = %merged_path, operation_id = %id, "Set operationId");
            op.insert("operationId".to_string(), Value::String(id));
        }
    }

    Ok(())
}

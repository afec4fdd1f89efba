//! Request matching.
//!
//! Routes are tried in registration order; within a route only the entry
//! lists for the requested method are considered. The first candidate whose
//! every segment matches wins and its typed parameters are returned.

use super::registry::{Route, RouteTag};
use super::template::{EntryKind, ParamType, PathEntry};
use crate::spec::{split_path, OpenApiType, Segments};
use http::Method;
use serde_json::{Map, Number, Value};
use smallvec::SmallVec;
use std::fmt;
use tracing::debug;

/// A path parameter value coerced to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Number(f64),
}

impl ParamValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Integer(i) => Some(*i as f64),
            ParamValue::String(_) => None,
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::Integer(i) => Value::Number((*i).into()),
            ParamValue::Number(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::String(s) => write!(f, "{s}"),
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Extracted path parameters in template order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathParams(SmallVec<[(String, ParamValue); 4]>);

impl PathParams {
    /// Last value recorded for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.iter().rev().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, name: &str, value: ParamValue) {
        self.0.push((name.to_string(), value));
    }

    /// Parameters as a JSON object keyed by name.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.0.len());
        for (k, v) in &self.0 {
            map.insert(k.clone(), v.to_value());
        }
        Value::Object(map)
    }
}

/// A successful lookup: the route's tag plus its typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    pub tag: RouteTag,
    pub params: PathParams,
}

/// Decompose a raw request path into matchable segments.
///
/// The query string is dropped, empty segments are discarded and
/// percent-escapes are decoded.
#[inline]
#[must_use]
pub fn split_request_path(path: &str) -> Segments {
    split_path(path)
}

fn coerce(entry: &PathEntry, name: &str, segment: &str) -> Option<ParamValue> {
    match entry.param_type {
        ParamType::Declared(OpenApiType::Number) => match segment.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(ParamValue::Number(n)),
            _ => {
                debug!(name = %name, segment = %segment, "Segment is not a finite number");
                None
            }
        },
        ParamType::Declared(OpenApiType::Integer) => match segment.parse::<i64>() {
            Ok(i) => Some(ParamValue::Integer(i)),
            Err(_) => {
                debug!(name = %name, segment = %segment, "Segment is not an integer");
                None
            }
        },
        ParamType::Declared(OpenApiType::String) | ParamType::Unresolved => {
            Some(ParamValue::String(segment.to_string()))
        }
        ParamType::Declared(other) => {
            debug!(
                name = %name,
                param_type = %other,
                "Unsupported path parameter type, passing as string"
            );
            Some(ParamValue::String(segment.to_string()))
        }
    }
}

fn match_entries<S: AsRef<str>>(entries: &[PathEntry], segments: &[S]) -> Option<PathParams> {
    if entries.len() != segments.len() {
        return None;
    }

    let mut params = PathParams::default();
    for (entry, segment) in entries.iter().zip(segments) {
        let segment = segment.as_ref();
        match &entry.kind {
            EntryKind::Literal { text } => {
                if text != segment {
                    return None;
                }
            }
            EntryKind::Parameter { name } => {
                let value = coerce(entry, name, segment)?;
                params.push(name, value);
            }
        }
    }
    Some(params)
}

/// Find the first route whose `method` entries match `segments`.
#[must_use]
pub fn match_route<S: AsRef<str>>(
    routes: &[Route],
    segments: &[S],
    method: &Method,
) -> Option<RouteMatch> {
    for route in routes {
        for m in route.methods.iter().filter(|m| m.method == *method) {
            if let Some(params) = match_entries(&m.entries, segments) {
                debug!(
                    tag = %route.tag,
                    method = %method,
                    route = %route.template,
                    params = params.len(),
                    "Route matched"
                );
                return Some(RouteMatch {
                    tag: route.tag,
                    params,
                });
            }
        }
    }

    debug!(method = %method, segments = segments.len(), "No route matched");
    None
}

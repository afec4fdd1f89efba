//! Route registration.
//!
//! A registered route pairs a [`RouteTag`] with one compiled entry list per
//! HTTP method declared on the owning path item. Parameter entries are typed
//! from that method's `parameters` so the matcher can coerce values.

use super::matcher::{match_route, RouteMatch};
use super::template::{ParamType, PathEntry, PathTemplate};
use crate::spec::{
    is_path_item_field, parse_method, resolve_ref, resolve_template, value_kind, OpenApiType,
    SpecDocument, SpecError,
};
use http::Method;
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Opaque identifier handed back to plugins for a registered template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteTag(pub u64);

impl fmt::Display for RouteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Compiled entries for one HTTP method of a route.
#[derive(Debug, Clone)]
pub struct MethodRoute {
    pub method: Method,
    pub entries: Vec<PathEntry>,
}

/// A registered template with its per-method entry lists.
#[derive(Debug, Clone)]
pub struct Route {
    pub tag: RouteTag,
    /// Template as registered.
    pub template: String,
    pub compiled: PathTemplate,
    pub methods: Vec<MethodRoute>,
}

impl Route {
    /// Path rendered from the compiled template, e.g. `/jobs/{job_id}`.
    #[must_use]
    pub fn path(&self) -> String {
        self.compiled.to_string()
    }
}

/// Ordered set of routes. Iteration order is registration order, which is
/// also match priority.
#[derive(Debug, Clone)]
pub struct RouteRegistry {
    routes: Vec<Route>,
    next_tag: u64,
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            next_tag: 1,
        }
    }

    /// Empty registry continuing this one's tag sequence.
    #[must_use]
    pub(crate) fn cleared(&self) -> Self {
        Self {
            routes: Vec::new(),
            next_tag: self.next_tag,
        }
    }

    #[inline]
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Register `template` against the first document that serves it.
    ///
    /// Returns `Ok(None)` when the template is not a route: no document path
    /// matches, the path item is not an object, or the item holds a key that
    /// is neither an HTTP method nor a known path-item field.
    ///
    /// # Errors
    ///
    /// Any [`SpecError`] from compiling the template, resolving servers, or
    /// annotating parameters.
    pub fn register(
        &mut self,
        docs: &[SpecDocument],
        template: &str,
    ) -> Result<Option<RouteTag>, SpecError> {
        let tag = RouteTag(self.next_tag);
        self.register_as(docs, template, tag)
    }

    /// Register `template` under a caller-supplied tag. Used when a table is
    /// rebuilt so existing handler bindings stay valid.
    pub(crate) fn register_as(
        &mut self,
        docs: &[SpecDocument],
        template: &str,
        tag: RouteTag,
    ) -> Result<Option<RouteTag>, SpecError> {
        let Some(route) = build_route(docs, template, tag)? else {
            return Ok(None);
        };

        info!(
            tag = %tag,
            template = %template,
            methods = route.methods.len(),
            "Registered route"
        );
        self.routes.push(route);
        self.next_tag = self.next_tag.max(tag.0 + 1);
        Ok(Some(tag))
    }

    /// Remove every route carrying `tag`. Returns whether anything was removed.
    pub fn unregister(&mut self, tag: RouteTag) -> bool {
        let before = self.routes.len();
        self.routes.retain(|r| r.tag != tag);
        let removed = before != self.routes.len();
        if removed {
            info!(tag = %tag, "Unregistered route");
        } else {
            debug!(tag = %tag, "Unregister of unknown tag ignored");
        }
        removed
    }

    /// Match decomposed request segments. `None` when nothing matches.
    #[must_use]
    pub fn find<S: AsRef<str>>(&self, segments: &[S], method: &Method) -> Option<RouteMatch> {
        match_route(&self.routes, segments, method)
    }

    /// Template originally registered under `tag`.
    #[must_use]
    pub fn template_of(&self, tag: RouteTag) -> Option<&str> {
        self.routes
            .iter()
            .find(|r| r.tag == tag)
            .map(|r| r.template.as_str())
    }

    /// One `METHOD /path` line per method registered under `tag`.
    #[must_use]
    pub fn describe(&self, tag: RouteTag) -> Option<Vec<String>> {
        let mut lines = Vec::new();
        let mut found = false;
        for route in self.routes.iter().filter(|r| r.tag == tag) {
            found = true;
            let path = route.path();
            for m in &route.methods {
                lines.push(format!("{} {path}", m.method));
            }
        }
        found.then_some(lines)
    }

    /// Log every method registered under `tag` at debug level.
    pub fn log_path_tag_methods(&self, tag: RouteTag) {
        match self.describe(tag) {
            Some(lines) => {
                for line in lines {
                    debug!(tag = %tag, route = %line, "Route method");
                }
            }
            None => error!(tag = %tag, "Unable to find path tag"),
        }
    }
}

fn build_route(
    docs: &[SpecDocument],
    template: &str,
    tag: RouteTag,
) -> Result<Option<Route>, SpecError> {
    let compiled = PathTemplate::compile(template)?;
    debug!(
        template = %template,
        entries = %compiled.to_debug_json(),
        "Compiled path template"
    );

    let Some(found) = resolve_template(docs, template)? else {
        debug!(template = %template, "No document path matches template");
        return Ok(None);
    };
    let owner = &docs[found.document_index].document;

    let Some(item) = found.item.as_object() else {
        debug!(
            template = %template,
            found = value_kind(found.item),
            "Path item is not an object"
        );
        return Ok(None);
    };

    let mut methods = Vec::new();
    for (key, operation) in item {
        let Some(method) = parse_method(key) else {
            if is_path_item_field(key) {
                continue;
            }
            debug!(template = %template, key = %key, "Path item key is not an HTTP method");
            return Ok(None);
        };

        if !operation.is_object() {
            return Err(SpecError::UnexpectedType {
                location: format!("paths.{}.{key}", found.path_key),
                expected: "dictionary",
                found: value_kind(operation),
            });
        }

        let mut entries = compiled.entries().to_vec();
        annotate(owner, template, &mut entries, item.get("parameters"))?;
        annotate(owner, template, &mut entries, operation.get("parameters"))?;

        debug!(
            template = %template,
            method = %method,
            path_key = %found.path_key,
            "Added route method"
        );
        methods.push(MethodRoute { method, entries });
    }

    if methods.is_empty() {
        warn!(template = %template, "Path item declares no operations");
    }

    Ok(Some(Route {
        tag,
        template: template.to_string(),
        compiled,
        methods,
    }))
}

/// Type template parameters from an OpenAPI `parameters` list.
fn annotate(
    doc: &Value,
    path: &str,
    entries: &mut [PathEntry],
    parameters: Option<&Value>,
) -> Result<(), SpecError> {
    let params = match parameters {
        None => return Ok(()),
        Some(Value::Array(params)) => params,
        Some(Value::Object(obj)) if obj.contains_key("$ref") => {
            debug!(path = %path, "Skipping parameters given by reference");
            return Ok(());
        }
        Some(other) => {
            return Err(SpecError::UnexpectedType {
                location: format!("{path} parameters"),
                expected: "list",
                found: value_kind(other),
            })
        }
    };

    for param in params {
        let param = match param.get("$ref").and_then(Value::as_str) {
            Some(reference) => {
                resolve_ref(doc, reference).ok_or_else(|| SpecError::UnresolvedRef {
                    location: format!("{path} parameters"),
                    reference: reference.to_string(),
                })?
            }
            None => param,
        };

        let name = param
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| SpecError::InvalidParameterName {
                path: path.to_string(),
            })?;

        for entry in entries.iter_mut() {
            let matches = entry
                .param_name()
                .is_some_and(|n| n.eq_ignore_ascii_case(name));
            if !matches {
                continue;
            }

            let type_name = param
                .get("schema")
                .and_then(|s| s.get("type"))
                .and_then(Value::as_str)
                .ok_or_else(|| SpecError::MissingParameterType {
                    path: path.to_string(),
                    name: name.to_string(),
                })?;

            let parsed =
                OpenApiType::parse(type_name).ok_or_else(|| SpecError::InvalidParameterType {
                    path: path.to_string(),
                    name: name.to_string(),
                    found: type_name.to_string(),
                })?;

            debug!(path = %path, name = %name, param_type = %parsed, "Typed path parameter");
            entry.param_type = ParamType::Declared(parsed);
        }
    }

    Ok(())
}

//! Path template compilation.
//!
//! `/jobs/{job_id}` compiles to a literal entry `jobs` followed by a parameter
//! entry named `job_id`. Parameter entries start out [`ParamType::Unresolved`]
//! and are annotated per HTTP method by the registry from the operation's
//! `parameters` list.

use crate::spec::{decode_segment, OpenApiType, SpecError};
use std::fmt;
use tracing::debug;

/// Upper bound on `/`-separated components in one template.
pub const MAX_TEMPLATE_SEGMENTS: usize = 1024;

/// What a compiled segment matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Exact text, percent-decoded the same way request segments are.
    Literal { text: String },
    /// `{name}` placeholder.
    Parameter { name: String },
}

/// Declared type of a parameter entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamType {
    /// No type annotation has been applied.
    #[default]
    Unresolved,
    Declared(OpenApiType),
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Unresolved => write!(f, "unresolved"),
            ParamType::Declared(t) => write!(f, "{t}"),
        }
    }
}

/// One segment of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Segment text as written, braces included for parameters.
    pub raw: String,
    pub kind: EntryKind,
    pub param_type: ParamType,
}

impl PathEntry {
    #[must_use]
    pub fn literal(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            kind: EntryKind::Literal {
                text: decode_segment(&raw),
            },
            raw,
            param_type: ParamType::Unresolved,
        }
    }

    #[must_use]
    pub fn parameter(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            raw: format!("{{{name}}}"),
            kind: EntryKind::Parameter { name },
            param_type: ParamType::Unresolved,
        }
    }

    /// Parameter name, `None` for literals.
    #[inline]
    #[must_use]
    pub fn param_name(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Parameter { name } => Some(name),
            EntryKind::Literal { .. } => None,
        }
    }

    #[must_use]
    pub fn kind_str(&self) -> &'static str {
        match self.kind {
            EntryKind::Literal { .. } => "string",
            EntryKind::Parameter { .. } => "parameter",
        }
    }
}

/// A compiled URL template: ordered segment matchers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathTemplate {
    entries: Vec<PathEntry>,
}

impl PathTemplate {
    /// Compile a template string.
    ///
    /// Empty segments are dropped, so leading, trailing and doubled slashes
    /// are tolerated. A segment longer than three characters wrapped in
    /// braces becomes a parameter; anything else is a literal.
    ///
    /// # Errors
    ///
    /// - [`SpecError::TemplateTooLong`] when the template holds more than
    ///   [`MAX_TEMPLATE_SEGMENTS`] `/` characters
    /// - [`SpecError::InvalidTemplate`] for `.` or `..` segments
    pub fn compile(template: &str) -> Result<Self, SpecError> {
        let count = template.bytes().filter(|b| *b == b'/').count();
        if count > MAX_TEMPLATE_SEGMENTS {
            return Err(SpecError::TemplateTooLong {
                template: template.chars().take(64).collect(),
                count,
                max: MAX_TEMPLATE_SEGMENTS,
            });
        }

        let mut entries = Vec::with_capacity(count + 1);
        for token in template.split('/').filter(|s| !s.is_empty()) {
            if token == "." || token == ".." {
                return Err(SpecError::InvalidTemplate {
                    template: template.to_string(),
                    segment: token.to_string(),
                });
            }

            if token.len() > 3 && token.starts_with('{') && token.ends_with('}') {
                let name = &token[1..token.len() - 1];
                debug!(template = %template, name = %name, "Template parameter entry");
                entries.push(PathEntry::parameter(name));
            } else {
                debug!(template = %template, entry = %token, "Template literal entry");
                entries.push(PathEntry::literal(token));
            }
        }

        Ok(Self { entries })
    }

    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    #[inline]
    pub fn entries_mut(&mut self) -> &mut [PathEntry] {
        &mut self.entries
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw segment texts, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.raw.as_str())
    }

    /// Compact JSON list of the segments, e.g. `["jobs","{job_id}"]`.
    #[must_use]
    pub fn to_debug_json(&self) -> String {
        let segs: Vec<&str> = self.segments().collect();
        serde_json::to_string(&segs).unwrap_or_default()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "/");
        }
        for e in &self.entries {
            write!(f, "/{}", e.raw)?;
        }
        Ok(())
    }
}

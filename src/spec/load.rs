use anyhow::Context;
use serde_json::Value;
use std::path::Path;

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parse an OpenAPI document from text, trying JSON first and YAML second.
///
/// # Errors
///
/// Returns an error when the text is neither valid JSON nor valid YAML.
pub fn parse_document(content: &str) -> anyhow::Result<Value> {
    match serde_json::from_str(content) {
        Ok(v) => Ok(v),
        Err(json_err) => serde_yaml::from_str(content)
            .with_context(|| format!("document is neither JSON ({json_err}) nor YAML")),
    }
}

/// Load an OpenAPI document from a `.json`, `.yaml` or `.yml` file.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_document(path: impl AsRef<Path>) -> anyhow::Result<Value> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let value = if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON {}", path.display()))?
    };
    Ok(value)
}

/// Plugin type name derived from a document file name: `jobs.yaml` →
/// `openapi/jobs`.
#[must_use]
pub fn plugin_type_for_path(path: impl AsRef<Path>) -> String {
    let stem = path
        .as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_lowercase()
        .replace(|c: char| !c.is_ascii_alphanumeric(), "_");
    format!("openapi/{}", stem.trim_matches('_'))
}

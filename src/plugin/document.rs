use super::OpenApiPlugin;
use crate::spec::{load_document, plugin_type_for_path, SpecFlags};
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// A plugin that serves a fixed document and implements no handlers of its
/// own. Used to inspect documents from files and in tests.
#[derive(Debug)]
pub struct DocumentPlugin {
    plugin_type: String,
    document: Value,
    flags: SpecFlags,
    initialized: AtomicBool,
}

impl DocumentPlugin {
    pub fn new(plugin_type: impl Into<String>, document: Value, flags: SpecFlags) -> Self {
        Self {
            plugin_type: plugin_type.into(),
            document,
            flags,
            initialized: AtomicBool::new(false),
        }
    }

    /// Load a `.json`/`.yaml` document; the plugin type is derived from the
    /// file name (`jobs.yaml` → `openapi/jobs`).
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>, flags: SpecFlags) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let document = load_document(path)?;
        Ok(Self::new(plugin_type_for_path(path), document, flags))
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }
}

impl OpenApiPlugin for DocumentPlugin {
    fn plugin_type(&self) -> &str {
        &self.plugin_type
    }

    fn init(&self) -> anyhow::Result<()> {
        self.initialized.store(true, Ordering::Release);
        debug!(plugin = %self.plugin_type, "Document plugin initialized");
        Ok(())
    }

    fn fini(&self) {
        self.initialized.store(false, Ordering::Release);
        debug!(plugin = %self.plugin_type, "Document plugin finalized");
    }

    fn specification(&self, flags: &mut SpecFlags) -> Option<Value> {
        *flags = self.flags;
        Some(self.document.clone())
    }
}

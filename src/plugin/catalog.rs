use super::SharedPlugin;
use crate::spec::SpecError;
use tracing::{debug, error};

/// Namespace every plugin type name lives under.
pub const PLUGIN_TYPE_PREFIX: &str = "openapi/";

/// Outcome of [`PluginCatalog::select`].
pub enum Selection {
    /// `"list"` was requested: the available type names, nothing loaded.
    List(Vec<String>),
    /// Plugins to load, in selection order.
    Plugins(Vec<SharedPlugin>),
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::List(names) => f.debug_tuple("List").field(names).finish(),
            Selection::Plugins(p) => f
                .debug_tuple("Plugins")
                .field(&p.iter().map(|p| p.plugin_type()).collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Plugins compiled into this build, in registration order.
#[derive(Default, Clone)]
pub struct PluginCatalog {
    plugins: Vec<SharedPlugin>,
}

impl std::fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginCatalog")
            .field("plugins", &self.types())
            .finish()
    }
}

fn qualified(name: &str) -> String {
    let bare = name.strip_prefix(PLUGIN_TYPE_PREFIX).unwrap_or(name);
    format!("{PLUGIN_TYPE_PREFIX}{}", bare.trim())
}

impl PluginCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: SharedPlugin) {
        debug!(plugin = %plugin.plugin_type(), "Plugin available");
        self.plugins.push(plugin);
    }

    #[must_use]
    pub fn with(mut self, plugin: SharedPlugin) -> Self {
        self.register(plugin);
        self
    }

    #[must_use]
    pub fn types(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.plugin_type()).collect()
    }

    #[must_use]
    pub fn get(&self, plugin_type: &str) -> Option<&SharedPlugin> {
        let wanted = qualified(plugin_type);
        self.plugins.iter().find(|p| p.plugin_type() == wanted)
    }

    /// Choose the plugins to load.
    ///
    /// - `None`: every plugin in the catalog
    /// - `"list"` (any case): listing mode, nothing is loaded
    /// - otherwise a comma-separated list of names, each with or without the
    ///   `openapi/` prefix; repeated names are loaded once
    ///
    /// # Errors
    ///
    /// [`SpecError::UnknownPlugin`] for a name not in the catalog, and
    /// [`SpecError::NoPlugins`] when the selection is empty.
    pub fn select(&self, list: Option<&str>) -> Result<Selection, SpecError> {
        let selected: Vec<SharedPlugin> = match list {
            Some(l) if l.trim().eq_ignore_ascii_case("list") => {
                return Ok(Selection::List(
                    self.types().into_iter().map(str::to_string).collect(),
                ));
            }
            Some(l) => {
                let mut out: Vec<SharedPlugin> = Vec::new();
                for name in l.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                    let Some(plugin) = self.get(name) else {
                        return Err(SpecError::UnknownPlugin {
                            name: qualified(name),
                        });
                    };
                    if out.iter().any(|p| p.plugin_type() == plugin.plugin_type()) {
                        debug!(plugin = %name, "Plugin selected more than once");
                        continue;
                    }
                    out.push(SharedPlugin::clone(plugin));
                }
                out
            }
            None => self.plugins.clone(),
        };

        if selected.is_empty() {
            error!("No OpenAPI plugins to load. Nothing to do.");
            return Err(SpecError::NoPlugins);
        }
        Ok(Selection::Plugins(selected))
    }
}

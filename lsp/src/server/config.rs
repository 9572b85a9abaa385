use serde::Deserialize;
use tower_lsp::lsp_types::ConfigurationItem;
use tracing::{debug, info};

use super::client::LspClient;
use super::state::LunarLanguageServer;
use crate::analyzer::LuaPath;

pub(crate) const CONFIG_SECTION: &str = "lunar";

/// Effective settings. Command-line flags give the defaults, the editor's `lunar` section
/// overrides them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub hover_enabled: bool,
    pub lua_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hover_enabled: true,
            lua_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LunarConfigSection {
    #[serde(default)]
    lua_path: Option<String>,
    #[serde(default)]
    hover: HoverConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct HoverConfig {
    #[serde(default)]
    enabled: Option<bool>,
}

impl ServerConfig {
    /// Applies the settings present in `section`. Returns true when the search path changed.
    pub(crate) fn apply(&mut self, section: LunarConfigSection) -> bool {
        if let Some(enabled) = section.hover.enabled {
            self.hover_enabled = enabled;
        }
        match section.lua_path.filter(|p| !p.trim().is_empty()) {
            Some(path) if self.lua_path.as_deref() != Some(path.as_str()) => {
                self.lua_path = Some(path);
                true
            }
            _ => false,
        }
    }
}

impl<C: LspClient> LunarLanguageServer<C> {
    pub(crate) async fn load_config(&self) {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some(CONFIG_SECTION.to_string()),
        }];
        let Some(value) = self.client.configuration(items).await.and_then(|v| v.into_iter().next()) else {
            debug!("no workspace configuration");
            return;
        };
        let section = match serde_json::from_value::<LunarConfigSection>(value) {
            Ok(section) => section,
            Err(err) => {
                debug!(error = %err, "ignoring unreadable configuration section");
                return;
            }
        };

        let changed_path = {
            let Ok(mut config) = self.config.lock() else {
                return;
            };
            if config.apply(section) { config.lua_path.clone() } else { None }
        };
        if let Some(path) = changed_path {
            info!(lua_path = %path, "using configured module search path");
            self.with_analyzer(|analyzer| analyzer.set_lua_path(LuaPath::parse(&path)));
        }
    }
}

use super::defaults::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServersConfig {
    #[serde(default)]
    pub app: AppServerConfig,
    #[serde(default)]
    pub cdn: CdnServerConfig,
}

/// The application server. stoke does not run it; the port is only
/// advertised in the startup banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppServerConfig {
    #[serde(default = "default_app_port")]
    pub port: u16,
}

impl Default for AppServerConfig {
    fn default() -> Self {
        Self {
            port: default_app_port(),
        }
    }
}

/// The asset server: statics, the live-reload channel and the client script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdnServerConfig {
    #[serde(default = "default_cdn_port")]
    pub port: u16,
    #[serde(default)]
    pub ssl: bool,
}

impl Default for CdnServerConfig {
    fn default() -> Self {
        Self {
            port: default_cdn_port(),
            ssl: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    /// argv of an external build. Sources are copied as-is when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypecheckConfig {
    #[serde(default = "default_typecheck_command")]
    pub command: Vec<String>,
}

impl Default for TypecheckConfig {
    fn default() -> Self {
        Self {
            command: default_typecheck_command(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchConfig {
    /// Path fragments and `*.ext` patterns that never trigger a rebuild.
    #[serde(default = "default_watch_ignore")]
    pub ignore: Vec<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            ignore: default_watch_ignore(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

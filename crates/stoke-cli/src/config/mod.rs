//! Project configuration with multi-source loading.
//!
//! Priority: CLI flags > `STOKE_*` environment > `stoke.config.json` > defaults.

mod defaults;
mod loading;
mod types;
mod validation;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stoke_core::{Entry, Rule};

pub use defaults::*;
pub use loading::{ConfigOverrides, CONFIG_FILE, ENV_PREFIX};
pub use types::*;

/// Settings for one project, as read from `stoke.config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub servers: ServersConfig,

    /// Interface both dev servers bind to.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_public_path")]
    pub public_path: String,

    /// Watched sources, relative to the project root.
    #[serde(default = "default_src_dir")]
    pub src_dir: PathBuf,

    /// Bundler output served by the dev server.
    #[serde(default = "default_statics_dir")]
    pub statics_dir: PathBuf,

    #[serde(default)]
    pub entry: Entry,

    /// Modules prepended to every entry in dev mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hot_entries: Vec<String>,

    /// Module rules handed to the build command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,

    /// Run the type checker. Unset means "when tsconfig.json exists".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typescript: Option<bool>,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub typecheck: TypecheckConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            servers: ServersConfig::default(),
            host: default_host(),
            public_path: default_public_path(),
            src_dir: default_src_dir(),
            statics_dir: default_statics_dir(),
            entry: Entry::default(),
            hot_entries: Vec::new(),
            rules: Vec::new(),
            typescript: None,
            build: BuildConfig::default(),
            typecheck: TypecheckConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl ProjectConfig {
    pub fn src_path(&self, root: &Path) -> PathBuf {
        root.join(&self.src_dir)
    }

    pub fn statics_path(&self, root: &Path) -> PathBuf {
        root.join(&self.statics_dir)
    }

    /// Whether the type-check pass runs for this project.
    pub fn is_typed(&self, root: &Path) -> bool {
        self.typescript
            .unwrap_or_else(|| root.join("tsconfig.json").is_file())
    }

    pub fn cdn_protocol(&self) -> &'static str {
        if self.servers.cdn.ssl {
            "https"
        } else {
            "http"
        }
    }
}

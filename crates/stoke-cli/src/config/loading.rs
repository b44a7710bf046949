use crate::config::ProjectConfig;
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "stoke.config.json";

/// Nested keys use a double underscore: `STOKE_SERVERS__CDN__PORT=3300`.
pub const ENV_PREFIX: &str = "STOKE_";

/// Values given on the command line. Only the ones that are set override
/// the other sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub app_port: Option<u16>,
    pub cdn_port: Option<u16>,
    pub host: Option<String>,
    pub https: bool,
    pub typescript: Option<bool>,
}

impl ConfigOverrides {
    fn to_value(&self) -> Value {
        let mut root = Map::new();
        let mut servers = Map::new();

        if let Some(port) = self.app_port {
            servers.insert("app".into(), json!({ "port": port }));
        }
        let mut cdn = Map::new();
        if let Some(port) = self.cdn_port {
            cdn.insert("port".into(), json!(port));
        }
        if self.https {
            cdn.insert("ssl".into(), json!(true));
        }
        if !cdn.is_empty() {
            servers.insert("cdn".into(), Value::Object(cdn));
        }
        if !servers.is_empty() {
            root.insert("servers".into(), Value::Object(servers));
        }
        if let Some(host) = &self.host {
            root.insert("host".into(), json!(host));
        }
        if let Some(typescript) = self.typescript {
            root.insert("typescript".into(), json!(typescript));
        }

        Value::Object(root)
    }
}

impl ProjectConfig {
    /// Load and validate the configuration of the project at `root`.
    ///
    /// `config_path` must exist when given; otherwise `stoke.config.json`
    /// is read when present.
    pub fn load(root: &Path, config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let config: Self = Self::figment(root, config_path, overrides)?
            .extract()
            .map_err(ConfigError::from)?;

        config.validate()?;
        config.validate_paths(root)?;
        tracing::debug!(root = %root.display(), ?config, "configuration loaded");
        Ok(config)
    }

    pub fn figment(root: &Path, config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = Self::config_file(root, config_path)? {
            tracing::debug!(path = %path.display(), "reading config file");
            figment = figment.merge(Json::file(path));
        }

        Ok(figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(overrides.to_value())))
    }

    fn config_file(root: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        match explicit {
            Some(path) => {
                let path = root.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Ok(Some(path))
            }
            None => {
                let path = root.join(CONFIG_FILE);
                Ok(path.is_file().then_some(path))
            }
        }
    }
}

//! Configuration for Cadence
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `CADENCE__*` environment variables, then explicit builder overrides.
//!
//! ```toml
//! [bridge]
//! max_attempts = 1000
//! poll_interval_ms = 1
//!
//! [vfs]
//! root = "/"
//!
//! [engine]
//! max_call_depth = 64
//! runtime_threads = 2
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming a config file to load
pub const CONFIG_PATH_ENV: &str = "CADENCE_CONFIG_PATH";

/// Prefix for per-setting environment overrides, e.g. `CADENCE__BRIDGE__MAX_ATTEMPTS`
pub const ENV_PREFIX: &str = "CADENCE";

/* ===================== Settings ===================== */

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bridge: BridgeSettings,
    pub vfs: VfsSettings,
    pub engine: EngineSettings,
}

/// Polling budget for blocking host calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Maximum number of waits before a call times out
    pub max_attempts: u32,
    /// Length of each wait in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            max_attempts: 1000,
            poll_interval_ms: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VfsSettings {
    /// Directory listed by `list_files()`
    pub root: String,
}

impl Default for VfsSettings {
    fn default() -> Self {
        Self {
            root: "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Guest call depth at which `RecursionError` is raised
    pub max_call_depth: usize,
    /// Worker threads of the runtime the engine owns when none is supplied
    pub runtime_threads: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_call_depth: 64,
            runtime_threads: 2,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load from the default sources (file named by `CADENCE_CONFIG_PATH`, env)
    pub fn load() -> Result<Self> {
        Self::builder().build()
    }

    pub fn validate(&self) -> Result<()> {
        if self.bridge.max_attempts == 0 {
            bail!("bridge.max_attempts must be at least 1");
        }
        if self.bridge.poll_interval_ms == 0 {
            bail!("bridge.poll_interval_ms must be at least 1");
        }
        if !self.vfs.root.starts_with('/') {
            bail!("vfs.root must be an absolute path, got '{}'", self.vfs.root);
        }
        if self.engine.max_call_depth == 0 {
            bail!("engine.max_call_depth must be at least 1");
        }
        if self.engine.runtime_threads == 0 {
            bail!("engine.runtime_threads must be at least 1");
        }
        Ok(())
    }
}

/* ===================== Builder ===================== */

/// Builder for loading a [`Config`]
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    use_env: bool,
    max_attempts: Option<u32>,
    poll_interval_ms: Option<u64>,
    root: Option<String>,
    max_call_depth: Option<usize>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            config_path: None,
            use_env: true,
            max_attempts: None,
            poll_interval_ms: None,
            root: None,
            max_call_depth: None,
        }
    }
}

impl ConfigBuilder {
    /// Config file to load (overrides `CADENCE_CONFIG_PATH`)
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Whether `.env` and `CADENCE__*` variables are consulted
    pub fn use_env(mut self, use_env: bool) -> Self {
        self.use_env = use_env;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn poll_interval_ms(mut self, interval: u64) -> Self {
        self.poll_interval_ms = Some(interval);
        self
    }

    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = Some(depth);
        self
    }

    pub fn build(self) -> Result<Config> {
        if self.use_env {
            dotenvy::dotenv().ok();
        }

        let mut builder = ::config::Config::builder();

        let path = self.config_path.or_else(|| {
            if self.use_env {
                std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from)
            } else {
                None
            }
        });
        if let Some(path) = &path {
            builder = builder.add_source(
                ::config::File::from(path.as_path())
                    .format(::config::FileFormat::Toml)
                    .required(true),
            );
        }

        if self.use_env {
            builder = builder.add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            );
        }

        if let Some(attempts) = self.max_attempts {
            builder = builder.set_override("bridge.max_attempts", i64::from(attempts))?;
        }
        if let Some(interval) = self.poll_interval_ms {
            let interval = i64::try_from(interval).context("poll_interval_ms is too large")?;
            builder = builder.set_override("bridge.poll_interval_ms", interval)?;
        }
        if let Some(root) = self.root {
            builder = builder.set_override("vfs.root", root)?;
        }
        if let Some(depth) = self.max_call_depth {
            let depth = i64::try_from(depth).context("max_call_depth is too large")?;
            builder = builder.set_override("engine.max_call_depth", depth)?;
        }

        let config: Config = builder
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::builder().use_env(false).build().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bridge.max_attempts, 1000);
        assert_eq!(config.bridge.poll_interval_ms, 1);
        assert_eq!(config.vfs.root, "/");
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[bridge]\nmax_attempts = 50\npoll_interval_ms = 5\n\n[vfs]\nroot = \"/home\""
        )
        .unwrap();

        let config = Config::builder()
            .use_env(false)
            .config_path(Some(file.path().to_path_buf()))
            .build()
            .unwrap();

        assert_eq!(config.bridge.max_attempts, 50);
        assert_eq!(config.bridge.poll_interval_ms, 5);
        assert_eq!(config.vfs.root, "/home");
        assert_eq!(config.engine, EngineSettings::default());
    }

    #[test]
    fn test_builder_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[bridge]\nmax_attempts = 50").unwrap();

        let config = Config::builder()
            .use_env(false)
            .config_path(Some(file.path().to_path_buf()))
            .max_attempts(3)
            .max_call_depth(10)
            .build()
            .unwrap();

        assert_eq!(config.bridge.max_attempts, 3);
        assert_eq!(config.engine.max_call_depth, 10);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Config::builder()
            .use_env(false)
            .config_path(Some(PathBuf::from("/definitely/not/here.toml")))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_zero_attempts() {
        let result = Config::builder().use_env(false).max_attempts(0).build();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_validation_rejects_relative_root() {
        let result = Config::builder().use_env(false).root("files").build();
        assert!(result.unwrap_err().to_string().contains("vfs.root"));
    }
}

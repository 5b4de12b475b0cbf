//! # BPOPlay configuration
//!
//! Loads the application configuration from YAML:
//! - an embedded default configuration is always present,
//! - an optional user file (`$BPOPLAY_CONFIG/bpoplay.yaml`, falling back to
//!   `~/.bpoplay/bpoplay.yaml`) is deep-merged over it,
//! - `BPOPLAY_CONFIG__SECTION__KEY` environment variables override single
//!   values last.
//!
//! The result is an explicit [`Config`] object constructed once at startup
//! and passed to every component; there is no process-global configuration.
//!
//! ## Usage
//!
//! ```no_run
//! let config = bpoconfig::Config::load()?;
//! let channel = config.channel.number;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Context, Result};
use bpoutils::FrameRate;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::{env, fs, path::PathBuf};
use tracing::info;

const DEFAULT_CONFIG: &str = include_str!("bpoplay.yaml");

const ENV_CONFIG_DIR: &str = "BPOPLAY_CONFIG";
const ENV_PREFIX: &str = "BPOPLAY_CONFIG__";
const CONFIG_FILE_NAME: &str = "bpoplay.yaml";

/// Playout channel settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Device channel number, 1-based.
    pub number: u8,
    pub frame_rate: FrameRate,
    /// Input routed to Live events; `None` plays black instead.
    pub live_input: Option<String>,
    /// Whether the channel starts in the narrow (4:3 on 16:9) aspect mode.
    pub narrow_aspect: bool,
    pub master_volume: f64,
}

/// Device backend connection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackendConfig {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub console: bool,
}

/// Complete BPOPlay configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub channel: ChannelConfig,
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads the configuration from the default location, merging the user
    /// file and environment overrides over the embedded defaults.
    pub fn load() -> Result<Self> {
        let mut root: Value =
            serde_yaml::from_str(DEFAULT_CONFIG).context("embedded default config is invalid")?;

        if let Some(path) = user_config_path() {
            if path.exists() {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("cannot read {}", path.display()))?;
                let user: Value = serde_yaml::from_str(&text)
                    .with_context(|| format!("cannot parse {}", path.display()))?;
                merge_value(&mut root, user);
                info!("Loaded configuration from {}", path.display());
            }
        }

        apply_env_overrides(&mut root, env::vars());
        let config: Config = serde_yaml::from_value(root)?;
        Ok(config)
    }

    /// Parses a configuration from a YAML string merged over the embedded
    /// defaults. Missing sections keep their default values.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let mut root: Value =
            serde_yaml::from_str(DEFAULT_CONFIG).context("embedded default config is invalid")?;
        let user: Value = serde_yaml::from_str(text)?;
        merge_value(&mut root, user);
        Ok(serde_yaml::from_value(root)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        serde_yaml::from_str(DEFAULT_CONFIG).expect("embedded default config is invalid")
    }
}

fn user_config_path() -> Option<PathBuf> {
    if let Ok(dir) = env::var(ENV_CONFIG_DIR) {
        return Some(PathBuf::from(dir).join(CONFIG_FILE_NAME));
    }
    dirs::home_dir().map(|home| home.join(".bpoplay").join(CONFIG_FILE_NAME))
}

/// Deep-merges `overlay` into `base`; mappings are merged key by key, any
/// other value replaces the base value wholesale.
fn merge_value(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Applies `BPOPLAY_CONFIG__SECTION__KEY=value` overrides. The value is
/// parsed as a YAML scalar so numbers and booleans keep their type.
fn apply_env_overrides(root: &mut Value, vars: impl Iterator<Item = (String, String)>) {
    for (name, raw) in vars {
        let Some(path) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let keys: Vec<String> = path.split("__").map(|k| k.to_lowercase()).collect();
        if keys.iter().any(|k| k.is_empty()) {
            continue;
        }
        let value: Value = serde_yaml::from_str(&raw).unwrap_or(Value::String(raw.clone()));
        if set_path(root, &keys, value).is_err() {
            tracing::warn!("Ignoring unusable override {}", name);
        }
    }
}

fn set_path(root: &mut Value, keys: &[String], value: Value) -> Result<()> {
    let (first, rest) = keys
        .split_first()
        .ok_or_else(|| anyhow!("empty override path"))?;
    let map = root
        .as_mapping_mut()
        .ok_or_else(|| anyhow!("override path crosses a scalar"))?;
    let key = Value::String(first.clone());
    if rest.is_empty() {
        map.insert(key, value);
        return Ok(());
    }
    let slot = map
        .entry(key)
        .or_insert_with(|| Value::Mapping(Default::default()));
    set_path(slot, rest, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.channel.number, 1);
        assert_eq!(config.channel.frame_rate, FrameRate::Pal);
        assert!(config.channel.live_input.is_none());
        assert_eq!(config.backend.port, 5250);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_yaml_str(
            "channel:\n  number: 3\n  frame_rate: hd50\n  live_input: DECKLINK 2\n",
        )
        .unwrap();
        assert_eq!(config.channel.number, 3);
        assert_eq!(config.channel.frame_rate, FrameRate::Hd50);
        assert_eq!(config.channel.live_input.as_deref(), Some("DECKLINK 2"));
        // untouched sections come from the embedded defaults
        assert_eq!(config.backend.host, "127.0.0.1");
        assert!(config.logging.console);
    }

    #[test]
    fn test_env_overrides_typed() {
        let mut root: Value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        let vars = vec![
            ("BPOPLAY_CONFIG__BACKEND__PORT".to_string(), "6250".to_string()),
            ("BPOPLAY_CONFIG__LOGGING__CONSOLE".to_string(), "false".to_string()),
            ("BPOPLAY_CONFIG__CHANNEL__LIVE_INPUT".to_string(), "DECKLINK 1".to_string()),
            ("UNRELATED".to_string(), "x".to_string()),
        ];
        apply_env_overrides(&mut root, vars.into_iter());
        let config: Config = serde_yaml::from_value(root).unwrap();
        assert_eq!(config.backend.port, 6250);
        assert!(!config.logging.console);
        assert_eq!(config.channel.live_input.as_deref(), Some("DECKLINK 1"));
    }
}

//! Settings loader: defaults, then `stamp.json`, then `STAMP_*` variables

use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use stamp_core::constants::{CONFIG_FILE_NAME, ENV_PREFIX};
use stamp_core::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where a settings layer came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Built-in defaults
    Default,
    /// A `stamp.json` file
    ConfigFile(PathBuf),
    /// A `STAMP_*` environment variable
    EnvironmentVariable(String),
    /// Values set through [`SettingsLoader::overrides`]
    Programmatic,
}

/// One layer of settings; unset fields leave the lower layer untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialSettings {
    pub internal_dir_name: Option<String>,
    pub ignore_file_name: Option<String>,
    pub hash_concurrency: Option<usize>,
    pub network_timeout_secs: Option<u64>,
    pub max_output_bytes: Option<usize>,
    pub sources_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
}

impl PartialSettings {
    pub fn is_empty(&self) -> bool {
        self == &PartialSettings::default()
    }

    fn apply_to(self, settings: &mut Settings) {
        if let Some(value) = self.internal_dir_name {
            settings.internal_dir_name = value;
        }
        if let Some(value) = self.ignore_file_name {
            settings.ignore_file_name = value;
        }
        if let Some(value) = self.hash_concurrency {
            settings.hash_concurrency = value;
        }
        if let Some(value) = self.network_timeout_secs {
            settings.network_timeout_secs = value;
        }
        if let Some(value) = self.max_output_bytes {
            settings.max_output_bytes = value;
        }
        if let Some(value) = self.sources_dir {
            settings.sources_dir = Some(value);
        }
        if let Some(value) = self.cache_dir {
            settings.cache_dir = Some(value);
        }
    }
}

/// Settings together with the layers that produced them
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub sources: Vec<ConfigSource>,
}

/// Builder-style loader for [`Settings`]
#[derive(Debug, Default)]
pub struct SettingsLoader {
    directory: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
    overrides: PartialSettings,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory searched for `stamp.json`
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = Some(dir.into());
        self
    }

    /// Use these variables instead of the process environment
    pub fn env(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Values applied last, above every other layer
    pub fn overrides(mut self, overrides: PartialSettings) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn load(self) -> Result<LoadedSettings> {
        let mut settings = Settings::default();
        let mut sources = vec![ConfigSource::Default];

        if let Some(dir) = &self.directory {
            let path = dir.join(CONFIG_FILE_NAME);
            if let Some(layer) = read_config_file(&path)? {
                tracing::debug!(path = %path.display(), "loaded settings file");
                layer.apply_to(&mut settings);
                sources.push(ConfigSource::ConfigFile(path));
            }
        }

        let env = self
            .env
            .unwrap_or_else(|| std::env::vars().collect::<HashMap<_, _>>());
        let (layer, names) = env_layer(&env)?;
        layer.apply_to(&mut settings);
        sources.extend(names.into_iter().map(ConfigSource::EnvironmentVariable));

        if !self.overrides.is_empty() {
            self.overrides.apply_to(&mut settings);
            sources.push(ConfigSource::Programmatic);
        }

        settings.validate()?;
        Ok(LoadedSettings { settings, sources })
    }
}

fn read_config_file(path: &Path) -> Result<Option<PartialSettings>> {
    let Some(bytes) = stamp_utils::atomic_file::read_optional(path)? else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes).map(Some).map_err(|e| {
        Error::configuration(format!("invalid settings file {}: {e}", path.display()))
    })
}

fn env_layer(env: &HashMap<String, String>) -> Result<(PartialSettings, Vec<String>)> {
    let mut layer = PartialSettings::default();
    let mut names = Vec::new();

    let mut keys: Vec<&String> = env.keys().filter(|k| k.starts_with(ENV_PREFIX)).collect();
    keys.sort();

    for key in keys {
        let value = &env[key];
        match &key[ENV_PREFIX.len()..] {
            "INTERNAL_DIR_NAME" => layer.internal_dir_name = Some(value.clone()),
            "IGNORE_FILE_NAME" => layer.ignore_file_name = Some(value.clone()),
            "HASH_CONCURRENCY" => layer.hash_concurrency = Some(parse_number(key, value)?),
            "NETWORK_TIMEOUT_SECS" => {
                layer.network_timeout_secs = Some(parse_number(key, value)?)
            }
            "MAX_OUTPUT_BYTES" => layer.max_output_bytes = Some(parse_number(key, value)?),
            "SOURCES_DIR" => layer.sources_dir = Some(PathBuf::from(value)),
            "CACHE_DIR" => layer.cache_dir = Some(PathBuf::from(value)),
            _ => continue,
        }
        names.push(key.clone());
    }

    Ok((layer, names))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::configuration(format!("{key} must be a number, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_only() {
        let loaded = SettingsLoader::new().env(HashMap::new()).load().unwrap();
        assert_eq!(loaded.settings, Settings::default());
        assert_eq!(loaded.sources, vec![ConfigSource::Default]);
    }

    #[test]
    fn test_file_then_env_precedence() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("stamp.json"),
            r#"{"hash_concurrency": 8, "max_output_bytes": 2048}"#,
        )
        .unwrap();

        let loaded = SettingsLoader::new()
            .directory(temp_dir.path())
            .env(vars(&[("STAMP_HASH_CONCURRENCY", "4"), ("PATH", "/bin")]))
            .load()
            .unwrap();

        assert_eq!(loaded.settings.hash_concurrency, 4);
        assert_eq!(loaded.settings.max_output_bytes, 2048);
        assert_eq!(
            loaded.sources,
            vec![
                ConfigSource::Default,
                ConfigSource::ConfigFile(temp_dir.path().join("stamp.json")),
                ConfigSource::EnvironmentVariable("STAMP_HASH_CONCURRENCY".to_string()),
            ]
        );
    }

    #[test]
    fn test_overrides_win() {
        let loaded = SettingsLoader::new()
            .env(vars(&[("STAMP_NETWORK_TIMEOUT_SECS", "30")]))
            .overrides(PartialSettings {
                network_timeout_secs: Some(5),
                ..PartialSettings::default()
            })
            .load()
            .unwrap();
        assert_eq!(loaded.settings.network_timeout_secs, 5);
        assert_eq!(loaded.sources.last(), Some(&ConfigSource::Programmatic));
    }

    #[test]
    fn test_unknown_file_field_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("stamp.json"), r#"{"hash_concurency": 8}"#).unwrap();

        let err = SettingsLoader::new()
            .directory(temp_dir.path())
            .env(HashMap::new())
            .load()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_bad_env_number() {
        let err = SettingsLoader::new()
            .env(vars(&[("STAMP_MAX_OUTPUT_BYTES", "lots")]))
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("STAMP_MAX_OUTPUT_BYTES"));
    }

    #[test]
    #[serial]
    fn test_process_environment_is_read() {
        std::env::set_var("STAMP_IGNORE_FILE_NAME", ".customignore");
        let loaded = SettingsLoader::new().load();
        std::env::remove_var("STAMP_IGNORE_FILE_NAME");

        assert_eq!(loaded.unwrap().settings.ignore_file_name, ".customignore");
    }
}

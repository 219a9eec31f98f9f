use super::series::Lookback;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_MFAPI_BASE_URL: &str = "https://api.mfapi.in/mf";
pub const DEFAULT_REGISTRY_FILE: &str = "scheme_registry.json";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MfapiProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for MfapiProviderConfig {
    fn default() -> Self {
        MfapiProviderConfig {
            base_url: DEFAULT_MFAPI_BASE_URL.to_string(),
            timeout_secs: 10,
            retries: 2,
            retry_delay_ms: 500,
        }
    }
}

impl MfapiProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProvidersConfig {
    pub mfapi: Option<MfapiProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            mfapi: Some(MfapiProviderConfig::default()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a successfully fetched series.
    pub ttl_secs: u64,
    /// Lifetime of a remembered fetch failure; `0` disables it.
    pub failure_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: 24 * 60 * 60,
            failure_ttl_secs: 5 * 60,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn failure_ttl(&self) -> Option<Duration> {
        (self.failure_ttl_secs > 0).then(|| Duration::from_secs(self.failure_ttl_secs))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub registry_path: Option<String>,
    pub default_lookback: Lookback,
    pub max_concurrent_fetches: usize,
    pub providers: ProvidersConfig,
    pub cache: CacheConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            registry_path: None,
            default_lookback: Lookback::default(),
            max_concurrent_fetches: 4,
            providers: ProvidersConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no config file has been set up.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "mfcompare", "mfcompare")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Registry file to load; relative to the working directory unless configured.
    pub fn registry_path(&self) -> PathBuf {
        self.registry_path
            .as_deref()
            .map_or_else(|| PathBuf::from(DEFAULT_REGISTRY_FILE), PathBuf::from)
    }

    pub fn mfapi(&self) -> MfapiProviderConfig {
        self.providers.mfapi.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
registry_path: "/data/scheme_registry.json"
default_lookback: 3Y
max_concurrent_fetches: 8
providers:
  mfapi:
    base_url: "http://example.com/mf"
    timeout_secs: 5
cache:
  ttl_secs: 3600
  failure_ttl_secs: 0
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.registry_path(),
            PathBuf::from("/data/scheme_registry.json")
        );
        assert_eq!(config.default_lookback, Lookback::ThreeYears);
        assert_eq!(config.max_concurrent_fetches, 8);

        let mfapi = config.mfapi();
        assert_eq!(mfapi.base_url, "http://example.com/mf");
        assert_eq!(mfapi.timeout(), Duration::from_secs(5));
        // Unset fields keep their defaults
        assert_eq!(mfapi.retries, 2);
        assert_eq!(mfapi.retry_delay_ms, 500);

        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
        assert!(config.cache.failure_ttl().is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());

        assert_eq!(config.registry_path(), PathBuf::from(DEFAULT_REGISTRY_FILE));
        assert_eq!(config.default_lookback, Lookback::OneYear);
        assert_eq!(config.mfapi().base_url, DEFAULT_MFAPI_BASE_URL);
        assert_eq!(config.mfapi().timeout(), Duration::from_secs(10));
        assert_eq!(config.cache.ttl(), Duration::from_secs(86400));
        assert_eq!(
            config.cache.failure_ttl(),
            Some(Duration::from_secs(300))
        );
    }

    #[test]
    fn test_missing_mfapi_section_falls_back_to_default() {
        let config: AppConfig = serde_yaml::from_str("providers: {}").unwrap();
        assert!(config.providers.mfapi.is_none());
        assert_eq!(config.mfapi(), MfapiProviderConfig::default());
    }

    #[test]
    fn test_invalid_lookback_is_rejected() {
        let result = serde_yaml::from_str::<AppConfig>("default_lookback: 4W");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_path_reports_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");

        let err = AppConfig::load_from_path(&missing).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file"));
    }

    #[test]
    fn test_example_config_parses() {
        let config: AppConfig =
            serde_yaml::from_str(include_str!("../../docs/example_config.yaml")).unwrap();
        assert_eq!(config.mfapi().base_url, DEFAULT_MFAPI_BASE_URL);
    }
}

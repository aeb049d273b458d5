use crate::calc::deposit::Compounding;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_RATES_URL: &str = "https://open.er-api.com/v6";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub exchange_rate: Option<ExchangeRateProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            exchange_rate: Some(ExchangeRateProviderConfig {
                base_url: DEFAULT_RATES_URL.to_string(),
            }),
        }
    }
}

/// Defaults applied when a calculator option is not given on the command line.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DefaultsConfig {
    #[serde(default = "default_compounding")]
    pub fd_compounding: Compounding,
    #[serde(default = "default_compounding")]
    pub rd_compounding: Compounding,
    /// Fixed obligation to income ratio, in percent.
    #[serde(default = "default_foir")]
    pub foir: f64,
    #[serde(default = "default_ppf_rate")]
    pub ppf_rate: f64,
}

fn default_compounding() -> Compounding {
    Compounding::Quarterly
}

fn default_foir() -> f64 {
    50.0
}

fn default_ppf_rate() -> f64 {
    7.1
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            fd_compounding: default_compounding(),
            rd_compounding: default_compounding(),
            foir: default_foir(),
            ppf_rate: default_ppf_rate(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Rates quoted against `currency`, used when no live or cached table is
    /// available.
    #[serde(default)]
    pub fallback_rates: HashMap<String, f64>,
    pub data_path: Option<String>,
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            providers: ProvidersConfig::default(),
            defaults: DefaultsConfig::default(),
            fallback_rates: HashMap::new(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when none exists.
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
        let proj_dirs = ProjectDirs::from("in", "fincalc", "fincalc")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "fincalc", "fincalc")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn rates_base_url(&self) -> &str {
        self.providers
            .exchange_rate
            .as_ref()
            .map_or(DEFAULT_RATES_URL, |p| &p.base_url)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
currency: "USD"
providers:
  exchange_rate:
    base_url: "http://example.com/rates"
defaults:
  fd_compounding: monthly
  foir: 40
fallback_rates:
  INR: 83.2
  EUR: 0.92
data_path: "/tmp/fincalc"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.currency, "USD");
        assert_eq!(config.rates_base_url(), "http://example.com/rates");
        assert_eq!(config.defaults.fd_compounding, Compounding::Monthly);
        assert_eq!(config.defaults.rd_compounding, Compounding::Quarterly);
        assert_eq!(config.defaults.foir, 40.0);
        assert_eq!(config.defaults.ppf_rate, 7.1);
        assert_eq!(config.fallback_rates.get("INR"), Some(&83.2));
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/fincalc")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.currency, "INR");
        assert_eq!(config.rates_base_url(), DEFAULT_RATES_URL);
        assert_eq!(config.defaults.foir, 50.0);
        assert!(config.fallback_rates.is_empty());
        assert!(config.data_path.is_none());
    }
}

use std::collections::HashSet;
use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::provider::yahoo;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_base_url() -> String {
    yahoo::YAHOO_BASE_URL.into()
}

fn default_requests_per_second() -> u32 {
    yahoo::YAHOO_REQUESTS_PER_SECOND
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub sectors: Vec<SectorConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

/// One named sector and its constituent tickers.
#[derive(Debug, Deserialize)]
pub struct SectorConfig {
    pub name: String,
    pub tickers: Vec<String>,
}

impl AppConfig {
    pub fn sector(&self, name: &str) -> Option<&SectorConfig> {
        self.sectors.iter().find(|s| s.name == name)
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
///
/// A roster that fails to load is fatal for the whole run.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_sector_names_unique(config)?;
    validate_sector_tickers(config)?;
    Ok(())
}

fn validate_sector_names_unique(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let mut seen = HashSet::new();
    for sector in &config.sectors {
        if sector.name.trim().is_empty() {
            return Err(Report::new(ConfigError::Validation {
                field: "sectors: empty sector name".into(),
            }));
        }
        if !seen.insert(sector.name.as_str()) {
            return Err(Report::new(ConfigError::Validation {
                field: format!("sectors: duplicate name \"{}\"", sector.name),
            }));
        }
    }
    Ok(())
}

fn validate_sector_tickers(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    for sector in &config.sectors {
        if sector.tickers.is_empty() {
            return Err(Report::new(ConfigError::Validation {
                field: format!("sectors[\"{}\"].tickers is empty", sector.name),
            }));
        }
        let mut seen = HashSet::new();
        for ticker in &sector.tickers {
            if ticker.trim().is_empty() {
                return Err(Report::new(ConfigError::Validation {
                    field: format!("sectors[\"{}\"]: empty ticker symbol", sector.name),
                }));
            }
            if !seen.insert(ticker.as_str()) {
                return Err(Report::new(ConfigError::Validation {
                    field: format!(
                        "sectors[\"{}\"]: duplicate ticker \"{}\"",
                        sector.name, ticker
                    ),
                }));
            }
        }
    }
    Ok(())
}

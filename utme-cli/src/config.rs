//! Configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub request: RequestConfig,
    /// Extra beacon parameters, applied over the defaults
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    /// Web property id sent as `utmac` (e.g. "UA-12345-1")
    pub account_id: Option<String>,
    #[serde(default)]
    pub use_ssl: bool,
    /// Browser language sent as `utmul`
    #[serde(default = "default_language")]
    pub language: String,
    /// Tracking code version sent as `utmwv`
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            account_id: None,
            use_ssl: false,
            language: default_language(),
            version: default_version(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

// search for 'utmwv' in ga.js
fn default_version() -> String {
    "5.1.5".to_string()
}

/// Request metadata normally gathered by the web framework
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RequestConfig {
    /// Host name (`utmhn`)
    pub host: Option<String>,
    /// Referrer (`utmr`)
    pub referrer: Option<String>,
    /// Page path (`utmp`)
    pub path: Option<String>,
    /// Remote address, anonymized before it becomes `utmip`
    pub remote_addr: Option<String>,
    /// Browser user agent, hashed into the visitor id `utmvid`
    pub user_agent: Option<String>,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if config.tracker.account_id.is_none() {
        log::warn!("No tracker.account_id in {:?}, utmac will be empty", path);
    }

    Ok(config)
}

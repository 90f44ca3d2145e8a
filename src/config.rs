use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants::BASE_URL;
use crate::error::{Result, ScraperError};

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const CONFIG_ENV_VAR: &str = "PFR_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub pacing: PacingConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Delay inserted between successive detail-page fetches
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub wait_seconds: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self { wait_seconds: 2.0 }
    }
}

impl PacingConfig {
    pub fn wait(&self) -> Duration {
        Duration::from_secs_f64(self.wait_seconds.max(0.0))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub wait_selector: String,
    pub timeout_seconds: u64,
    pub chrome_path: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            wait_selector: "#all_team_stats".to_string(),
            timeout_seconds: 10,
            chrome_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
    pub log_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "data".to_string(),
            log_dir: "logs".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `.env`, then the file named by `PFR_CONFIG` (or `config.toml`).
    /// A missing file yields the defaults.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let path =
            std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        if Path::new(&path).exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.site.base_url.starts_with("http") {
            return Err(ScraperError::Config(format!(
                "site.base_url must be an http(s) URL, got '{}'",
                self.site.base_url
            )));
        }
        if self.pacing.wait_seconds < 0.0 || !self.pacing.wait_seconds.is_finite() {
            return Err(ScraperError::Config(
                "pacing.wait_seconds must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

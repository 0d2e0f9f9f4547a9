use crate::advice::RetryPolicy;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Generation endpoint API key. Environment variables win over this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub media: MediaSettings,

    #[serde(default)]
    pub live: LiveSettings,
}

// ── Generation endpoint ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_model")]
    pub model: String,
    /// Override for tests and self-hosted proxies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_temperature() -> f64 {
    0.4
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ── Retry policy ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Zero keeps the endpoint's failures visible to the user immediately.
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
}

fn default_base_backoff_ms() -> u64 {
    500
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_backoff_ms: default_base_backoff_ms(),
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_backoff_ms: settings.base_backoff_ms,
        }
    }
}

// ── Media ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSettings {
    #[serde(default = "default_max_image_mb")]
    pub max_image_mb: u64,
}

fn default_max_image_mb() -> u64 {
    8
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            max_image_mb: default_max_image_mb(),
        }
    }
}

impl MediaSettings {
    #[must_use]
    pub fn max_image_bytes(&self) -> u64 {
        self.max_image_mb * 1024 * 1024
    }
}

// ── Live voice session ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_live_model")]
    pub model: String,
}

fn default_live_model() -> String {
    "gemini-2.0-flash-live".into()
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_live_model(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl Config {
    /// Load `~/.coachcore/config.toml`, creating a default file on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let coachcore_dir = home.join(".coachcore");
        let config_path = coachcore_dir.join("config.toml");

        if !coachcore_dir.exists() {
            fs::create_dir_all(&coachcore_dir)
                .context("Failed to create .coachcore directory")?;
        }

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self {
                config_path: config_path.clone(),
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    /// Load and validate a config file at an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        let mut config: Config =
            toml::from_str(&contents).context("Failed to parse config file")?;
        config.config_path = path.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, contents).context("Failed to write config file")?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::Validation(format!(
                "generation.temperature must be within 0.0..=2.0, got {}",
                self.generation.temperature
            )));
        }
        if self.generation.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "generation.timeout_secs must be nonzero".into(),
            ));
        }
        if self.media.max_image_mb == 0 {
            return Err(ConfigError::Validation(
                "media.max_image_mb must be nonzero".into(),
            ));
        }
        Ok(())
    }

    /// API key with environment variables taking precedence over the file.
    #[must_use]
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
            .or_else(|| self.api_key.clone())
    }
}

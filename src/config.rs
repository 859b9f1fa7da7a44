use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::assessment::{DEFAULT_ASSESSMENT_PERIOD, DEFAULT_PROCESS_NAME};
use crate::store::DEFAULT_STORAGE_KEY;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub process: ProcessConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub autosave: AutosaveConfig,
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The business process under assessment, shown in the wizard header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    pub name: String,
    /// Assessment period label, e.g. "December 2024"
    pub period: String,
    pub business_unit: String,
    pub due: String,
    pub last_assessed: String,
    pub estimated_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Where the assessment blob and logs live
    pub state: String,
    /// Default target directory for exports
    pub exports: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_key")]
    pub key: String,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: default_storage_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    #[serde(default = "default_autosave_enabled")]
    pub enabled: bool,
    #[serde(default = "default_autosave_interval")]
    pub interval_secs: u64,
}

fn default_autosave_enabled() -> bool {
    true
}

fn default_autosave_interval() -> u64 {
    30
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: default_autosave_enabled(),
            interval_secs: default_autosave_interval(),
        }
    }
}

impl AutosaveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    /// Lifetime of success / info / warning toasts
    pub toast_ms: u64,
    pub error_toast_ms: u64,
    /// Pause while the simulated analysis runs between steps
    pub analysis_delay_ms: u64,
    pub welcome_delay_ms: u64,
    /// Nudge shown if the user is still on the first step after this long
    pub encouragement_delay_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

impl Config {
    /// Project-local config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".rcsa/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the wizard works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let project_config = Self::project_config_path();
        if project_config.exists() {
            builder = builder.add_source(config::File::from(project_config));
        }

        // User config in ~/.config/rcsa/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("rcsa").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // RCSA__UI__TOAST_MS=4000 and friends
        builder = builder.add_source(
            config::Environment::with_prefix("RCSA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        absolute(&self.paths.state)
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    pub fn exports_path(&self) -> PathBuf {
        absolute(&self.paths.exports)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.ui.toast_ms)
    }

    pub fn error_toast_duration(&self) -> Duration {
        Duration::from_millis(self.ui.error_toast_ms)
    }
}

fn absolute(path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            process: ProcessConfig {
                name: DEFAULT_PROCESS_NAME.to_string(),
                period: DEFAULT_ASSESSMENT_PERIOD.to_string(),
                business_unit: "Retail Banking".to_string(),
                due: "Today".to_string(),
                last_assessed: "3 months ago".to_string(),
                estimated_time: "8 min".to_string(),
            },
            paths: PathsConfig {
                state: ".rcsa".to_string(), // Relative to cwd
                exports: ".".to_string(),
            },
            storage: StorageConfig::default(),
            autosave: AutosaveConfig::default(),
            ui: UiConfig {
                refresh_rate_ms: 250,
                toast_ms: 3000,
                error_toast_ms: 5000,
                analysis_delay_ms: 2000,
                welcome_delay_ms: 500,
                encouragement_delay_secs: 15,
            },
            logging: LoggingConfig::default(),
        }
    }
}

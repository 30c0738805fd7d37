//! Configuration management for uiverify
//!
//! Supports environment variables, config files, and runtime overrides.
//! Every scenario keeps its own target URL; there is no shared base URL.
//!
//! Config file location: ~/.config/uiverify/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::error::{Result, VerifyError};

/// Main configuration for uiverify
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Browser configuration
    #[serde(default)]
    pub browser: BrowserConfig,
    /// Run behaviour configuration
    #[serde(default)]
    pub run: RunConfig,
    /// Per-scenario target URLs
    #[serde(default)]
    pub targets: TargetConfig,
    /// Fixture naming configuration
    #[serde(default)]
    pub fixtures: FixtureConfig,
    /// Selector contract configuration
    #[serde(default)]
    pub contract: ContractConfig,
}

/// Browser automation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// agent-browser executable name or path
    pub binary: String,
    /// Session name for agent-browser
    pub session_name: String,
    /// Whether to run in headed mode (visible browser)
    pub headed: bool,
    /// Upper bound for a single agent-browser invocation in ms
    pub command_timeout_ms: u64,
    /// Delay between two polls of a wait condition in ms
    pub poll_interval_ms: u64,
}

/// Run behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory all screenshots and reports are written below
    pub output_dir: PathBuf,
    /// Timeout for waits that do not name one, in ms
    pub default_timeout_ms: u64,
    /// Probe the target over HTTP before launching the browser
    pub preflight: bool,
    /// Timeout of the reachability probe in ms
    pub preflight_timeout_ms: u64,
}

/// Target URL for each built-in scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub bulk_add: String,
    pub export_menu: String,
    pub global_settings: String,
    pub role_modal: String,
}

/// Fixture naming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Append a run-unique suffix to every created entity name
    pub unique_names: bool,
    /// Use this suffix instead of a random one
    pub suffix: Option<String>,
}

/// Selector contract configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Abort a scenario when its contract check finds missing selectors
    pub enforce: bool,
    /// Directory holding `<scenario>.toml` contract overrides
    pub dir: Option<PathBuf>,
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            binary: env::var("UIVERIFY_AGENT_BROWSER")
                .unwrap_or_else(|_| "agent-browser".to_string()),
            session_name: env::var("UIVERIFY_BROWSER_SESSION")
                .unwrap_or_else(|_| "uiverify".to_string()),
            headed: env_flag("UIVERIFY_BROWSER_HEADED", false),
            command_timeout_ms: 30000,
            poll_interval_ms: 100,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: env::var("UIVERIFY_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            default_timeout_ms: 30000,
            preflight: env_flag("UIVERIFY_PREFLIGHT", true),
            preflight_timeout_ms: 3000,
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            bulk_add: env::var("UIVERIFY_BULK_ADD_URL")
                .unwrap_or_else(|_| "http://localhost:8080/index.html".to_string()),
            export_menu: env::var("UIVERIFY_EXPORT_MENU_URL")
                .unwrap_or_else(|_| "http://localhost:8000/index.html".to_string()),
            global_settings: env::var("UIVERIFY_GLOBAL_SETTINGS_URL")
                .unwrap_or_else(|_| "http://localhost:8080/index.html".to_string()),
            role_modal: env::var("UIVERIFY_ROLE_MODAL_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            unique_names: env_flag("UIVERIFY_UNIQUE_NAMES", true),
            suffix: env::var("UIVERIFY_FIXTURE_SUFFIX").ok(),
        }
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            enforce: env_flag("UIVERIFY_ENFORCE_CONTRACT", true),
            dir: env::var("UIVERIFY_CONTRACT_DIR").ok().map(PathBuf::from),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("uiverify")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let path = Self::config_file();
        if path.exists() {
            match Self::load_from_path(&path) {
                Ok(config) => return config,
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring config file"),
            }
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from an explicit file; a missing file is an error
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let _ = dotenvy::dotenv();

        if !path.exists() {
            return Err(VerifyError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| VerifyError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML; missing sections take their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| VerifyError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to the default file and return the path
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| VerifyError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| VerifyError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| VerifyError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Check if a config file exists
    pub fn config_exists() -> bool {
        Self::config_file().exists()
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }

    /// Point every scenario at the same target
    pub fn set_all_targets(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.targets.bulk_add = url.clone();
        self.targets.export_menu = url.clone();
        self.targets.global_settings = url.clone();
        self.targets.role_modal = url;
    }

    /// Resolve a path below the output directory
    pub fn artifact_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.run.output_dir.join(relative)
    }
}

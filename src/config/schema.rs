use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory - computed from home, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    pub api_key: Option<String>,
    pub default_model: Option<String>,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub reliability: ReliabilityConfig,

    #[serde(default)]
    pub tutor: TutorConfig,

    #[serde(default)]
    pub observations: ObservationsConfig,
}

fn default_temperature() -> f64 {
    0.7
}

fn default_api_base_url() -> String {
    crate::providers::gemini::DEFAULT_BASE_URL.into()
}

// ── Reliability ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityConfig {
    /// Total attempts per model call.
    #[serde(default = "default_provider_retries")]
    pub provider_retries: u32,
    /// Delay after the first failed attempt; doubles on each further failure.
    #[serde(default = "default_provider_backoff_ms")]
    pub provider_backoff_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_provider_retries() -> u32 {
    3
}

fn default_provider_backoff_ms() -> u64 {
    2_000
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            provider_retries: default_provider_retries(),
            provider_backoff_ms: default_provider_backoff_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// ── Tutor ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Count turns spent in the vocabulary-help detour toward lesson progress.
    #[serde(default)]
    pub count_help_turns: bool,
    /// Quiz length assumed when the final report omits the score sentence.
    #[serde(default = "default_quiz_total")]
    pub default_quiz_total: u32,
    /// UI locale for the CLI ("ko" or "en").
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_quiz_total() -> u32 {
    4
}

fn default_locale() -> String {
    "ko".into()
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            count_help_turns: false,
            default_quiz_total: default_quiz_total(),
            locale: default_locale(),
        }
    }
}

// ── Observations ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ObservationsConfig {
    /// Where experiment CSV files live; defaults to `<workspace>/observations`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

// ── Config impl ──────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let sinu_dir = home.join(".sinu");

        Self {
            workspace_dir: sinu_dir.join("workspace"),
            config_path: sinu_dir.join("config.toml"),
            api_key: None,
            default_model: Some(DEFAULT_MODEL.into()),
            default_temperature: default_temperature(),
            api_base_url: default_api_base_url(),
            reliability: ReliabilityConfig::default(),
            tutor: TutorConfig::default(),
            observations: ObservationsConfig::default(),
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_or_init_in(&home.join(".sinu"))
    }

    /// Load `config.toml` from `sinu_dir`, writing defaults when it is missing.
    pub fn load_or_init_in(sinu_dir: &Path) -> Result<Self> {
        let config_path = sinu_dir.join("config.toml");
        let workspace_dir = sinu_dir.join("workspace");

        if !sinu_dir.exists() {
            fs::create_dir_all(sinu_dir).context("Failed to create .sinu directory")?;
        }
        if !workspace_dir.exists() {
            fs::create_dir_all(&workspace_dir).context("Failed to create workspace directory")?;
        }

        if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config = toml::from_str(&contents)
                .map_err(|e| ConfigError::Load(e.to_string()))
                .context("Failed to parse config file")?;
            // Set computed paths that are skipped during serialization
            config.config_path = config_path;
            config.workspace_dir = workspace_dir;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self {
                config_path,
                workspace_dir,
                ..Self::default()
            };
            config.validate()?;
            config.save()?;
            Ok(config)
        }
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) {
        // API Key: SINU_API_KEY or GEMINI_API_KEY
        if let Ok(key) = std::env::var("SINU_API_KEY").or_else(|_| std::env::var("GEMINI_API_KEY"))
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("SINU_MODEL")
            && !model.is_empty()
        {
            self.default_model = Some(model);
        }

        if let Ok(workspace) = std::env::var("SINU_WORKSPACE")
            && !workspace.is_empty()
        {
            self.workspace_dir = PathBuf::from(workspace);
        }

        if let Ok(temp_str) = std::env::var("SINU_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.default_temperature = temp;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::Validation(
                "default_temperature must be in [0.0, 2.0]".into(),
            ));
        }
        if self.reliability.provider_retries == 0 {
            return Err(ConfigError::Validation(
                "reliability.provider_retries must be >= 1".into(),
            ));
        }
        if self.tutor.default_quiz_total == 0 {
            return Err(ConfigError::Validation(
                "tutor.default_quiz_total must be >= 1".into(),
            ));
        }
        if !matches!(self.tutor.locale.as_str(), "ko" | "en") {
            return Err(ConfigError::Validation(format!(
                "tutor.locale must be \"ko\" or \"en\", got {:?}",
                self.tutor.locale
            )));
        }
        Ok(())
    }

    pub fn model(&self) -> &str {
        self.default_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn observations_dir(&self) -> PathBuf {
        self.observations
            .data_dir
            .clone()
            .unwrap_or_else(|| self.workspace_dir.join("observations"))
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}

//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::chunking::ChunkConfig;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Fireflies transcript source settings
    #[serde(default)]
    pub fireflies: FirefliesSettings,

    /// Embedding provider settings
    #[serde(default)]
    pub embedding: EmbeddingSettings,

    /// Supabase persistence settings
    #[serde(default)]
    pub supabase: SupabaseSettings,

    /// Chunking budgets
    #[serde(default)]
    pub chunking: ChunkConfig,

    /// Sync pipeline behavior
    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Data directory for local transcript copies
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirefliesSettings {
    /// Fireflies API key
    #[serde(default)]
    pub api_key: String,

    /// GraphQL endpoint (empty = api.fireflies.ai)
    #[serde(default)]
    pub endpoint: String,

    /// Page size for paginated transcript listing
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai)
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// API key (for cloud providers)
    #[serde(default)]
    pub api_key: String,

    /// Model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Expected vector dimension for the configured model
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// API endpoint (empty = api.openai.com)
    #[serde(default)]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseSettings {
    /// Project URL, e.g. https://xyzcompany.supabase.co
    #[serde(default)]
    pub url: String,

    /// Service role key used for REST and storage calls
    #[serde(default)]
    pub service_key: String,

    /// Storage bucket holding markdown transcripts
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Chunks embedded and stored per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Embedding retry attempts before a chunk is abandoned
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between embedding retries, in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Pause after this many transcripts during a full sync
    #[serde(default = "default_pace_every")]
    pub pace_every: usize,

    /// Length of the inter-transcript pause, in seconds
    #[serde(default = "default_pace_secs")]
    pub pace_secs: u64,

    /// Default interval between watch-mode passes, in minutes
    #[serde(default = "default_watch_interval_mins")]
    pub watch_interval_mins: u64,
}

// Default value functions

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "meetsync", "meetsync")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/meetsync"))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_page_size() -> usize {
    50
}

fn default_embedding_provider() -> String {
    "openai".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimension() -> usize {
    1536
}

fn default_bucket() -> String {
    "meetings".to_string()
}

fn default_batch_size() -> usize {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_pace_every() -> usize {
    5
}

fn default_pace_secs() -> u64 {
    2
}

fn default_watch_interval_mins() -> u64 {
    30
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for FirefliesSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: String::new(),
            page_size: default_page_size(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            api_key: String::new(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            endpoint: String::new(),
        }
    }
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: String::new(),
            bucket: default_bucket(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            pace_every: default_pace_every(),
            pace_secs: default_pace_secs(),
            watch_interval_mins: default_watch_interval_mins(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            fireflies: FirefliesSettings::default(),
            embedding: EmbeddingSettings::default(),
            supabase: SupabaseSettings::default(),
            chunking: ChunkConfig::default(),
            sync: SyncSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Apply environment variable overrides. The variable names match the
    /// .env contract of the original sync scripts.
    fn apply_env_overrides(&mut self) {
        if self.fireflies.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var("FIREFLIES_API_KEY") {
                if !key.trim().is_empty() {
                    self.fireflies.api_key = key;
                }
            }
        }

        if self.embedding.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                if !key.trim().is_empty() {
                    self.embedding.api_key = key;
                }
            }
        }

        if self.supabase.url.trim().is_empty() {
            if let Ok(url) = std::env::var("SUPABASE_URL") {
                if !url.trim().is_empty() {
                    self.supabase.url = url;
                }
            }
        }

        if self.supabase.service_key.trim().is_empty() {
            let key = std::env::var("SUPABASE_SERVICE_KEY")
                .or_else(|_| std::env::var("SUPABASE_SERVICE_ROLE_KEY"));
            if let Ok(key) = key {
                if !key.trim().is_empty() {
                    self.supabase.service_key = key;
                }
            }
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "meetsync", "meetsync")
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &PathBuf) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory holding local markdown copies of synced transcripts
    pub fn transcripts_dir(&self) -> PathBuf {
        self.general.data_dir.join("transcripts")
    }

    /// Ensure all required directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.general.data_dir)?;
        std::fs::create_dir_all(self.transcripts_dir())?;
        Ok(())
    }
}

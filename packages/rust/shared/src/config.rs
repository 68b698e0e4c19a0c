//! Application configuration for tubedigest.
//!
//! User config lives at `~/.tubedigest/tubedigest.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored in the file; the config names the
//! environment variables that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TubeDigestError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "tubedigest.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".tubedigest";

// ---------------------------------------------------------------------------
// Config structs (matching tubedigest.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Catalog (listing/metadata/transcript) API settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Inference service settings.
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Working-directory layout.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Channel whose videos are discovered.
    #[serde(default)]
    pub channel_id: String,

    /// Only videos published in this year are fetched.
    #[serde(default = "default_target_year")]
    pub target_year: i32,

    /// Optional cap on how many videos discovery accumulates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,

    /// Transcript language preference, first available wins.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            channel_id: String::new(),
            target_year: default_target_year(),
            max_results: None,
            languages: default_languages(),
        }
    }
}

fn default_target_year() -> i32 {
    2025
}
fn default_languages() -> Vec<String> {
    vec!["pt".into(), "en".into()]
}

/// `[catalog]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog data API.
    #[serde(default = "default_catalog_base")]
    pub api_base: String,

    /// Base URL of the timed-text endpoint.
    #[serde(default = "default_transcript_base")]
    pub transcript_base: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_catalog_key_env")]
    pub api_key_env: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base: default_catalog_base(),
            transcript_base: default_transcript_base(),
            api_key_env: default_catalog_key_env(),
            timeout_secs: default_catalog_timeout(),
        }
    }
}

fn default_catalog_base() -> String {
    "https://www.googleapis.com/youtube/v3".into()
}
fn default_transcript_base() -> String {
    "https://video.google.com/timedtext".into()
}
fn default_catalog_key_env() -> String {
    "YT_TOKEN".into()
}
fn default_catalog_timeout() -> u64 {
    30
}

/// `[inference]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// OpenAI-compatible base URL.
    #[serde(default = "default_inference_base")]
    pub api_base: String,

    /// Name of the env var holding the API key.
    #[serde(default = "default_inference_key_env")]
    pub api_key_env: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Provider routed to by the inference gateway.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Completion token budget per request.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_base: default_inference_base(),
            api_key_env: default_inference_key_env(),
            model: default_model(),
            provider: default_provider(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_inference_timeout(),
        }
    }
}

fn default_inference_base() -> String {
    "https://router.huggingface.co/v1".into()
}
fn default_inference_key_env() -> String {
    "HF_TOKEN".into()
}
fn default_model() -> String {
    "meta-llama/Llama-3.3-70B-Instruct".into()
}
fn default_provider() -> String {
    "cerebras".into()
}
fn default_max_tokens() -> u32 {
    8196
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.9
}
fn default_inference_timeout() -> u64 {
    120
}

/// `[storage]` section — where pipeline directories live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for cache/, transcriptions/, generated/ and logs.
    #[serde(default = "default_root")]
    pub root: String,

    /// Directory holding the fixed prompt fragments.
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            prompts_dir: default_prompts_dir(),
        }
    }
}

fn default_root() -> String {
    ".".into()
}
fn default_prompts_dir() -> String {
    "prompts".into()
}

impl StorageConfig {
    /// Directory for listing-cache files and the failures list.
    pub fn cache_dir(&self) -> PathBuf {
        Path::new(&self.root).join("cache")
    }

    /// Directory holding raw documents.
    pub fn transcriptions_dir(&self) -> PathBuf {
        Path::new(&self.root).join("transcriptions")
    }

    /// Directory holding transformed documents.
    pub fn generated_dir(&self) -> PathBuf {
        Path::new(&self.root).join("generated")
    }

    /// Directory holding the prompt fragments.
    pub fn prompts_dir(&self) -> PathBuf {
        Path::new(&self.root).join(&self.prompts_dir)
    }

    /// Append-only list of video IDs that failed with upstream errors.
    pub fn failures_path(&self) -> PathBuf {
        self.cache_dir().join("failed_items.txt")
    }

    /// Directory the daily log file is written to.
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.tubedigest/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TubeDigestError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.tubedigest/tubedigest.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TubeDigestError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| TubeDigestError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TubeDigestError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TubeDigestError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TubeDigestError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the catalog API key from the environment variable named in the config.
pub fn catalog_api_key(config: &AppConfig) -> Result<String> {
    read_key(&config.catalog.api_key_env, "catalog")
}

/// Read the inference API key from the environment variable named in the config.
pub fn inference_api_key(config: &AppConfig) -> Result<String> {
    read_key(&config.inference.api_key_env, "inference")
}

fn read_key(var_name: &str, which: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(TubeDigestError::config(format!(
            "{which} API key not found. Set the {var_name} environment variable."
        ))),
    }
}

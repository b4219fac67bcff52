//! Configuration for callflow.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (CALLFLOW_HOME, CALLFLOW_STORE_ROOT, CALLFLOW_GATEWAY_URL)
//! 2. Config file (.callflow/config.yaml)
//! 3. Defaults (~/.callflow)
//!
//! Config file discovery:
//! - Searches current directory and parents for .callflow/config.yaml
//! - Paths in config file are relative to the config file's parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::PollPolicy;
use crate::domain::SpeechOptions;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const DEFAULT_GATEWAY_URL: &str = "http://localhost:8080";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub gateway: Option<GatewayConfig>,
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Engine state directory (relative to config file)
    pub home: Option<String>,
    /// Root of the local artifact store (relative to config file)
    pub store_root: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the analysis gateway
    pub url: String,
}

/// Settings that shape a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Prefix the speech service reads source media from
    #[serde(default = "default_media_uri_base")]
    pub media_uri_base: String,

    /// Options sent with every transcription job
    #[serde(default)]
    pub speech: SpeechOptions,

    /// Language code for text analytics (default: en)
    #[serde(default = "default_text_language")]
    pub text_language: String,

    /// Job polling cadence and bound
    #[serde(default)]
    pub poll: PollPolicy,

    /// Total invocation timeout in seconds (default: 1800 = 30 min)
    #[serde(default = "default_invocation_timeout")]
    pub invocation_timeout_seconds: u64,
}

fn default_media_uri_base() -> String {
    "https://s3.us-east-2.amazonaws.com".to_string()
}
fn default_text_language() -> String {
    "en".to_string()
}
fn default_invocation_timeout() -> u64 {
    1800
} // 30 min

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            media_uri_base: default_media_uri_base(),
            speech: SpeechOptions::default(),
            text_language: default_text_language(),
            poll: PollPolicy::default(),
            invocation_timeout_seconds: default_invocation_timeout(),
        }
    }
}

impl PipelineSettings {
    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_secs(self.invocation_timeout_seconds)
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to callflow home
    pub home: PathBuf,
    /// Root of the local artifact store
    pub store_root: PathBuf,
    /// Base URL of the analysis gateway
    pub gateway_url: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Pipeline settings
    pub pipeline: PipelineSettings,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".callflow").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse config file content
pub fn parse_config(content: &str) -> Result<ConfigFile> {
    serde_yaml::from_str(content).context("Invalid config YAML")
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Combine a parsed config file (if any), environment and defaults
fn resolve(
    config_path: Option<&Path>,
    config: Option<ConfigFile>,
    default_home: PathBuf,
) -> ResolvedConfig {
    let env_home = std::env::var("CALLFLOW_HOME").ok().map(PathBuf::from);
    let env_store = std::env::var("CALLFLOW_STORE_ROOT").ok().map(PathBuf::from);
    let env_gateway = std::env::var("CALLFLOW_GATEWAY_URL").ok();

    let (home, store_root, gateway_url, pipeline) = match (config_path, config) {
        (Some(config_path), Some(config)) => {
            // .callflow/ directory; the project root is its parent
            let callflow_dir = config_path.parent().unwrap_or(Path::new("."));
            let base_dir = callflow_dir.parent().unwrap_or(Path::new("."));

            let home = env_home.unwrap_or_else(|| match config.paths.home {
                Some(ref home_path) => resolve_path(callflow_dir, home_path),
                None => default_home.clone(),
            });

            let store_root = env_store.unwrap_or_else(|| match config.paths.store_root {
                Some(ref store_path) => resolve_path(base_dir, store_path),
                None => home.join("store"),
            });

            let gateway_url = env_gateway
                .or_else(|| config.gateway.map(|g| g.url))
                .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());

            (home, store_root, gateway_url, config.pipeline)
        }
        _ => {
            let home = env_home.unwrap_or(default_home);
            let store_root = env_store.unwrap_or_else(|| home.join("store"));
            let gateway_url = env_gateway.unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());
            (home, store_root, gateway_url, PipelineSettings::default())
        }
    };

    ResolvedConfig {
        home,
        store_root,
        gateway_url,
        config_file: config_path.map(Path::to_path_buf),
        pipeline,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".callflow");

    let config_file = find_config_file();
    let config = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    Ok(resolve(config_file.as_deref(), config, default_home))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

//! Store configuration and factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use exampro_core::authoring::AuthoringPolicy;
use exampro_core::session::SessionOptions;
use exampro_core::traits::ExamStore;

use crate::json::JsonFileStore;
use crate::memory::MemoryStore;

/// Where the exam and result collections live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Json {
        #[serde(default = "default_data_dir")]
        dir: PathBuf,
    },
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Json {
            dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./exampro-data")
}

/// Top-level exampro configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamproConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Fraction of the maximum score needed to pass (0.0..=1.0).
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,
    /// Maximum number of questions in one exam.
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
    /// Digits in a generated access token.
    #[serde(default = "default_token_length")]
    pub token_length: usize,
    /// Prefix of generated student ids.
    #[serde(default = "default_student_id_prefix")]
    pub student_id_prefix: String,
}

fn default_pass_threshold() -> f64 {
    0.7
}
fn default_max_questions() -> usize {
    500
}
fn default_token_length() -> usize {
    4
}
fn default_student_id_prefix() -> String {
    "SIS-".to_string()
}

impl Default for ExamproConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            pass_threshold: default_pass_threshold(),
            max_questions: default_max_questions(),
            token_length: default_token_length(),
            student_id_prefix: default_student_id_prefix(),
        }
    }
}

impl ExamproConfig {
    /// Authoring limits derived from this configuration.
    pub fn policy(&self) -> AuthoringPolicy {
        AuthoringPolicy {
            max_questions: self.max_questions,
            token_length: self.token_length,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            student_id_prefix: self.student_id_prefix.clone(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied as-is and never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_store_config(config: &StoreConfig) -> StoreConfig {
    match config {
        StoreConfig::Json { dir } => StoreConfig::Json {
            dir: PathBuf::from(resolve_env_vars(&dir.to_string_lossy())),
        },
        StoreConfig::Memory => StoreConfig::Memory,
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `exampro.toml` in the current directory
/// 2. `~/.config/exampro/config.toml`
///
/// Environment variable override: `EXAMPRO_DATA_DIR` selects a JSON store
/// in that directory.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamproConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("exampro.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExamproConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamproConfig::default(),
    };

    if let Ok(dir) = std::env::var("EXAMPRO_DATA_DIR") {
        if !dir.is_empty() {
            config.store = StoreConfig::Json { dir: dir.into() };
        }
    }

    config.store = resolve_store_config(&config.store);
    config.student_id_prefix = resolve_env_vars(&config.student_id_prefix);

    if !(0.0..=1.0).contains(&config.pass_threshold) {
        anyhow::bail!(
            "pass_threshold must be between 0 and 1, got {}",
            config.pass_threshold
        );
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("exampro"))
}

/// Create a store instance from its configuration.
pub fn create_store(config: &StoreConfig) -> Box<dyn ExamStore> {
    match config {
        StoreConfig::Json { dir } => Box::new(JsonFileStore::new(dir.clone())),
        StoreConfig::Memory => Box::new(MemoryStore::new()),
    }
}

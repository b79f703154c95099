mod agent;
mod api;
pub mod defaults;
mod validation;

use crate::cli::Args;
use crate::error::{GennyError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use agent::{AgentConfig, SearchConfig, SessionConfig, StoreConfig};
pub use api::{normalize_endpoint, ApiConfig, ModelConfig};
pub use validation::{expand_env_var_in_string, parse_flag};

use defaults::*;

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub api_key: String,
    pub endpoint: String,
    pub max_results: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_endpoint: String,
    pub model: String,
    pub vision_model: String,
    pub system_prompt: String,
    pub greeting: String,
    pub request_timeout: u64,
    pub verbose: bool,
    pub max_iterations: usize,
    pub tool_timeout: u64,
    pub max_result_chars: usize,
    /// `None` when search is disabled or no search key is available.
    pub search: Option<SearchSettings>,
    pub store_path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let file_config = FileConfig::load()?;
        Self::resolve(args, &file_config, |key| env::var(key).ok())
    }

    /// Merges the layers: CLI args > environment > config file > defaults.
    pub fn resolve(
        args: &Args,
        file: &FileConfig,
        env_var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        // API key is required from the environment only
        let api_key = env_var("OPENROUTER_API_KEY")
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                GennyError::ConfigError("OPENROUTER_API_KEY environment variable not set".into())
            })?;

        let api_endpoint = args
            .api_endpoint
            .clone()
            .or_else(|| env_var("AI_API_ENDPOINT"))
            .or_else(|| {
                file.api
                    .endpoint
                    .as_deref()
                    .map(|e| expand_env_var_in_string(e, &env_var))
            })
            .map(normalize_endpoint)
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());

        let model = args
            .model
            .clone()
            .or_else(|| env_var("AI_MODEL"))
            .or(file.model.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let vision_model = env_var("AI_VISION_MODEL")
            .or(file.model.vision_model.clone())
            .unwrap_or_else(|| model.clone());

        let system_prompt = env_var("AI_SYSTEM_PROMPT")
            .or(file.model.system_prompt.clone())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let greeting = file
            .model
            .greeting
            .clone()
            .unwrap_or_else(|| DEFAULT_GREETING.to_string());

        let request_timeout = env_var("AI_REQUEST_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .or(file.api.request_timeout)
            .unwrap_or_else(default_request_timeout);

        let verbose = args.verbose
            || env_var("AI_VERBOSE")
                .map(|v| parse_flag(&v))
                .or(file.session.verbose)
                .unwrap_or(false);

        let max_iterations = args
            .max_iterations
            .or_else(|| env_var("AI_MAX_ITERATIONS").and_then(|s| s.parse().ok()))
            .or(file.agent.max_iterations)
            .unwrap_or_else(default_max_iterations);
        if max_iterations == 0 {
            return Err(GennyError::ConfigError(
                "max_iterations must be at least 1".into(),
            ));
        }

        let tool_timeout = env_var("AI_TOOL_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .or(file.agent.tool_timeout)
            .unwrap_or_else(default_tool_timeout);

        let max_result_chars = file
            .agent
            .max_result_chars
            .unwrap_or_else(default_max_result_chars);
        if max_result_chars == 0 {
            return Err(GennyError::ConfigError(
                "max_result_chars must be at least 1".into(),
            ));
        }

        // Search needs both the switch and a key; without a key the tool is
        // simply not offered to the model.
        let search = if args.no_search || !file.search.enabled {
            None
        } else {
            env_var("TAVILY_API_KEY")
                .filter(|k| !k.is_empty())
                .map(|api_key| SearchSettings {
                    api_key,
                    endpoint: file
                        .search
                        .endpoint
                        .as_deref()
                        .map(|e| expand_env_var_in_string(e, &env_var))
                        .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
                    max_results: file.search.max_results.max(1),
                })
        };

        let store_path = args
            .store
            .clone()
            .or_else(|| env_var("GENNY_STORE").map(PathBuf::from))
            .or_else(|| {
                file.store
                    .path
                    .as_deref()
                    .map(|p| PathBuf::from(expand_env_var_in_string(p, &env_var)))
            })
            .unwrap_or_else(default_store_path);

        Ok(Config {
            api_key,
            api_endpoint,
            model,
            vision_model,
            system_prompt,
            greeting,
            request_timeout,
            verbose,
            max_iterations,
            tool_timeout,
            max_result_chars,
            search,
            store_path,
        })
    }

    pub fn get_current_date() -> String {
        chrono::Local::now().format("%A, %B %d, %Y").to_string()
    }
}

pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("genny")
        .join("students.csv")
}

impl FileConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Ok(Self::load_from(&path)?);
            }
        }

        // No config file found, return default
        Ok(FileConfig::default())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))?
        };

        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            // Current directory (local override)
            PathBuf::from(".genny.yaml"),
            PathBuf::from(".genny.yml"),
            PathBuf::from(".genny.json"),
        ];

        if let Some(config_dir) = dirs::home_dir().map(|h| h.join(".config").join("genny")) {
            paths.push(config_dir.join("genny.yaml"));
            paths.push(config_dir.join("genny.yml"));
            paths.push(config_dir.join("genny.json"));
        }

        paths
    }

    /// Writes an example YAML file to the global config location.
    pub fn write_example() -> Result<PathBuf> {
        let dir = dirs::home_dir()
            .ok_or_else(|| GennyError::ConfigError("Cannot determine home directory".into()))?
            .join(".config")
            .join("genny");
        fs::create_dir_all(&dir)?;

        let path = dir.join("genny.yaml");
        if path.exists() {
            return Err(GennyError::ConfigError(format!(
                "Config file already exists: {}",
                path.display()
            )));
        }

        let example = FileConfig {
            api: ApiConfig {
                endpoint: Some("https://openrouter.ai/api/v1".to_string()),
                request_timeout: Some(default_request_timeout()),
            },
            model: ModelConfig {
                default_model: Some(DEFAULT_MODEL.to_string()),
                ..ModelConfig::default()
            },
            agent: AgentConfig {
                max_iterations: Some(default_max_iterations()),
                tool_timeout: Some(default_tool_timeout()),
                max_result_chars: Some(default_max_result_chars()),
            },
            search: SearchConfig::default(),
            store: StoreConfig {
                path: Some("${HOME}/.local/share/genny/students.csv".to_string()),
            },
            session: SessionConfig { verbose: Some(false) },
        };

        fs::write(&path, serde_yaml::to_string(&example)?)?;
        Ok(path)
    }
}

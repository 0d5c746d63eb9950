mod api;
pub mod defaults;
mod tools;
mod validation;

use crate::cli::Args;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use api::{ApiConfig, LoopConfig, ModelConfig, SessionConfig};
pub use tools::{ScreenshotConfig, ToolsConfig};
pub use validation::{expand_with, is_truthy};

use defaults::{
    default_max_rounds, default_request_timeout, default_stream, default_stream_timeout,
    default_tool_timeout, DEFAULT_API_ENDPOINT, DEFAULT_MODEL,
};

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_endpoint: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub stream: bool,
    pub stream_timeout: u64,
    pub request_timeout: u64,
    pub verbose: bool,
    pub max_rounds: usize,
    pub tool_timeout: u64,
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default, rename = "loop")]
    pub orchestration: LoopConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self, String> {
        let file_config = match FileConfig::load() {
            Ok(config) => config,
            Err(e) => return Err(format!("{:#}", e)),
        };
        Self::resolve(args, file_config, |name| env::var(name).ok())
    }

    /// Merge sources with precedence CLI args > environment > file > defaults.
    pub fn resolve<F>(args: &Args, file: FileConfig, env_lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = env_lookup("QA_API_KEY")
            .or_else(|| env_lookup("OPENROUTER_API_KEY"))
            .filter(|k| !k.is_empty())
            .ok_or("QA_API_KEY (or OPENROUTER_API_KEY) environment variable not set")?;

        let api_endpoint = args
            .api_endpoint
            .clone()
            .or_else(|| env_lookup("QA_API_ENDPOINT"))
            .or(file.api.endpoint.clone())
            .map(|endpoint| normalize_endpoint(&endpoint))
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());

        let model = args
            .model
            .clone()
            .or_else(|| env_lookup("QA_MODEL"))
            .or(file.model.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let system_prompt = env_lookup("QA_SYSTEM_PROMPT").or(file.model.system_prompt.clone());

        let stream = if args.no_stream {
            false
        } else {
            env_lookup("QA_STREAM")
                .map(|v| is_truthy(&v))
                .or(file.api.stream)
                .unwrap_or_else(default_stream)
        };

        let stream_timeout = env_lookup("QA_STREAM_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .or(file.api.stream_timeout)
            .unwrap_or_else(default_stream_timeout);

        let request_timeout = env_lookup("QA_REQUEST_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .or(file.api.request_timeout)
            .unwrap_or_else(default_request_timeout);

        let verbose = args.verbose
            || env_lookup("QA_VERBOSE")
                .map(|v| is_truthy(&v))
                .or(file.session.verbose)
                .unwrap_or(false);

        let max_rounds = args
            .max_rounds
            .or_else(|| env_lookup("QA_MAX_ROUNDS").and_then(|s| s.parse::<usize>().ok()))
            .or(file.orchestration.max_rounds)
            .unwrap_or_else(default_max_rounds);
        if max_rounds == 0 {
            return Err("max_rounds must be at least 1".to_string());
        }

        let tool_timeout = env_lookup("QA_TOOL_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .or(file.orchestration.tool_timeout)
            .unwrap_or_else(default_tool_timeout);

        let mut tools = file.tools;
        if args.no_tools {
            tools.enabled = false;
        } else if let Some(v) = env_lookup("QA_TOOLS_ENABLED") {
            tools.enabled = is_truthy(&v);
        }
        tools.weather_key = tools
            .weather_key
            .map(|k| expand_with(&k, &env_lookup))
            // An unset reference means no key was configured
            .filter(|k| !k.is_empty() && !k.contains("${"))
            .or_else(|| env_lookup("WEATHER_KEY"));
        tools.pictures_dir = tools.pictures_dir.map(|p| expand_with(&p, &env_lookup));
        tools.search_base_url = expand_with(&tools.search_base_url, &env_lookup);

        Ok(Config {
            api_key,
            api_endpoint,
            model,
            system_prompt,
            stream,
            stream_timeout,
            request_timeout,
            verbose,
            max_rounds,
            tool_timeout,
            tools,
        })
    }

    /// System message content: today's date, then the configured prompt.
    pub fn system_message(&self) -> String {
        let date_prompt = format!("Today's date is {}.", Self::get_current_date());
        match &self.system_prompt {
            Some(prompt) => format!("{}\n\n{}", date_prompt, prompt),
            None => date_prompt,
        }
    }

    pub fn get_current_date() -> String {
        chrono::Local::now().format("%A, %B %d, %Y").to_string()
    }
}

/// Accept a base URL or a full completions URL.
pub fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.ends_with("/chat/completions") {
        endpoint.to_string()
    } else if endpoint.ends_with("/v1") {
        format!("{}/chat/completions", endpoint)
    } else if endpoint.ends_with("/v1/") {
        format!("{}chat/completions", endpoint)
    } else {
        format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'))
    }
}

impl FileConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(FileConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
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
            PathBuf::from(".quickask.yaml"),
            PathBuf::from(".quickask.yml"),
            PathBuf::from(".quickask.json"),
        ];

        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("quickask");
            paths.push(config_dir.join("quickask.yaml"));
            paths.push(config_dir.join("quickask.yml"));
            paths.push(config_dir.join("quickask.json"));
        }

        paths
    }
}

use serde::{Deserialize, Serialize};

use crate::config::defaults::{
    default_screenshot_command, default_search_base_url, default_tools_enabled,
    default_weather_endpoint,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_tools_enabled")]
    pub enabled: bool,

    /// Base URL of the search/scrape/image/wolfram proxy.
    #[serde(default = "default_search_base_url")]
    pub search_base_url: String,

    #[serde(default = "default_weather_endpoint")]
    pub weather_endpoint: String,

    // Falls back to the WEATHER_KEY environment variable
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_key: Option<String>,

    // Defaults to the OS pictures directory
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pictures_dir: Option<String>,

    #[serde(default)]
    pub screenshot: ScreenshotConfig,

    /// Tool names to leave out of the registry.
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: default_tools_enabled(),
            search_base_url: default_search_base_url(),
            weather_endpoint: default_weather_endpoint(),
            weather_key: None,
            pictures_dir: None,
            screenshot: ScreenshotConfig::default(),
            disabled: Vec::new(),
        }
    }
}

impl ToolsConfig {
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled && !self.disabled.iter().any(|d| d == name)
    }
}

/// External capture program; must write PNG bytes to stdout.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScreenshotConfig {
    #[serde(default = "default_screenshot_command")]
    pub command: Vec<String>,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            command: default_screenshot_command(),
        }
    }
}

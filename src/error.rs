use std::fmt;

#[derive(Debug)]
pub enum QuickAskError {
    ApiError {
        status: u16,
        message: String,
    },
    ConfigError(String),
    NetworkError(reqwest::Error),
    Timeout(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    YamlError(serde_yaml::Error),
    Other(String),
}

impl fmt::Display for QuickAskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuickAskError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            QuickAskError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            QuickAskError::NetworkError(e) => write!(f, "Network error: {}", e),
            QuickAskError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            QuickAskError::IoError(e) => write!(f, "IO error: {}", e),
            QuickAskError::JsonError(e) => write!(f, "JSON error: {}", e),
            QuickAskError::YamlError(e) => write!(f, "YAML error: {}", e),
            QuickAskError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for QuickAskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuickAskError::NetworkError(e) => Some(e),
            QuickAskError::IoError(e) => Some(e),
            QuickAskError::JsonError(e) => Some(e),
            QuickAskError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for QuickAskError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            QuickAskError::Timeout(err.to_string())
        } else {
            QuickAskError::NetworkError(err)
        }
    }
}

impl From<std::io::Error> for QuickAskError {
    fn from(err: std::io::Error) -> Self {
        QuickAskError::IoError(err)
    }
}

impl From<serde_json::Error> for QuickAskError {
    fn from(err: serde_json::Error) -> Self {
        QuickAskError::JsonError(err)
    }
}

impl From<serde_yaml::Error> for QuickAskError {
    fn from(err: serde_yaml::Error) -> Self {
        QuickAskError::YamlError(err)
    }
}

impl From<anyhow::Error> for QuickAskError {
    fn from(err: anyhow::Error) -> Self {
        QuickAskError::Other(format!("{:#}", err))
    }
}

impl From<String> for QuickAskError {
    fn from(msg: String) -> Self {
        QuickAskError::Other(msg)
    }
}

impl From<&str> for QuickAskError {
    fn from(msg: &str) -> Self {
        QuickAskError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuickAskError>;

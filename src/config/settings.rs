use serde::Deserialize;

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String, // allowed: debug, info, warn, error
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(default_log_level(), LogFormat::default())
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    #[serde(alias = "compact", alias = "text")]
    Console,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "console" | "compact" | "text" => Some(LogFormat::Console),
            _ => None,
        }
    }
}

/// ================================
/// Metrics
/// ================================
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct MetricsConfig {
    /// When set, the registry is dumped here in text exposition format
    /// after every run (node-exporter textfile collector).
    #[serde(default)]
    pub textfile_path: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

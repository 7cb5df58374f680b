// Server configuration, layered from an optional TOML file and environment
use serde::Deserialize;

use crate::domain::plot::PlotArea;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub plot: PlotArea,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory containing one sub-directory per run.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// Built frontend directory, served for unmatched routes when set.
    #[serde(default)]
    pub frontend_dir: Option<String>,
    /// Seconds between rescans of the log directory.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_dir: default_log_dir(),
            frontend_dir: None,
            poll_interval_secs: default_poll_interval(),
        }
    }
}

/// Size thresholds above which items are only sent on request.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Limits {
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,
    #[serde(default = "default_max_log_lines")]
    pub max_log_lines: usize,
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_text_len: default_max_text_len(),
            max_log_lines: default_max_log_lines(),
            thumbnail_size: default_thumbnail_size(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4343
}

fn default_log_dir() -> String {
    "log".to_string()
}

fn default_poll_interval() -> u64 {
    2
}

fn default_max_text_len() -> usize {
    1024
}

fn default_max_log_lines() -> usize {
    100
}

fn default_thumbnail_size() -> u32 {
    40
}

pub fn load_config() -> anyhow::Result<ServerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/server").required(false))
        .add_source(config::Environment::with_prefix("RUNBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let settings = config::Config::builder().build().unwrap();
        let config: ServerConfig = settings.try_deserialize().unwrap();
        assert_eq!(config.server.port, 4343);
        assert_eq!(config.server.log_dir, "log");
        assert_eq!(config.limits.max_text_len, 1024);
        assert_eq!(config.plot, PlotArea::default());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[server]\nport = 8000\nlog_dir = \"runs\"\n\n[limits]\nmax_log_lines = 5\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: ServerConfig = settings.try_deserialize().unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.log_dir, "runs");
        assert_eq!(config.limits.max_log_lines, 5);
        // Untouched sections keep their defaults.
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.limits.max_text_len, 1024);
    }
}

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_fps")]
    pub fps: f64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_skip_interval")]
    pub skip_interval: u32,
    #[serde(default = "default_edge_low")]
    pub edge_low: f32,
    #[serde(default = "default_edge_high")]
    pub edge_high: f32,
    #[serde(default = "default_motion_threshold")]
    pub motion_threshold: u8,
    #[serde(default = "default_fps_window")]
    pub fps_window: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_title")]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            skip_interval: default_skip_interval(),
            edge_low: default_edge_low(),
            edge_high: default_edge_high(),
            motion_threshold: default_motion_threshold(),
            fps_window: default_fps_window(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

// Default value functions
fn default_mode() -> String {
    "mjpeg".into()
}
fn default_fps() -> f64 {
    10.0
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_skip_interval() -> u32 {
    2
}
fn default_edge_low() -> f32 {
    50.0
}
fn default_edge_high() -> f32 {
    150.0
}
fn default_motion_threshold() -> u8 {
    30
}
fn default_fps_window() -> usize {
    30
}
fn default_title() -> String {
    "frame-scope".into()
}
fn default_log_level() -> String {
    "info".into()
}

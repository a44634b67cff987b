//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Transcoder parameters.
    pub render: RenderSettings,

    /// Pipeline scheduling and staging.
    pub pipeline: PipelineSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Frame geometry and codec parameters handed to the transcoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Canonical slide frame (letterboxed to this size).
    pub slide_width: u32,
    pub slide_height: u32,

    /// Webcam column width; its height follows `slide_height`.
    pub webcam_width: u32,

    /// Rate at which the still image is read.
    pub input_fps: u32,

    /// Output frame rate of every slide clip.
    pub output_fps: u32,

    /// Letterbox fill colour (any ffmpeg colour name or hex).
    pub pad_color: String,

    /// Encoder for slide clips.
    pub video_codec: String,

    pub pixel_format: String,

    /// Transcoder executable name or path.
    pub ffmpeg_binary: String,
}

/// Pipeline scheduling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Maximum concurrent slide fetches and slide renders.
    pub jobs: usize,

    /// Keep the staging directory after a successful run.
    pub keep_staging: bool,

    /// Parent of per-run staging directories (defaults to the output directory).
    pub staging_root: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "recast=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            slide_width: 1024,
            slide_height: 768,
            webcam_width: 512,
            input_fps: 5,
            output_fps: 24,
            pad_color: "white".to_string(),
            video_codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
            ffmpeg_binary: "ffmpeg".to_string(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            jobs: 4,
            keep_staging: false,
            staging_root: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl PipelineSettings {
    /// Worker pool width, never zero.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.max(1)
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("recast").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults_match_canonical_frame() {
        let render = RenderSettings::default();
        assert_eq!((render.slide_width, render.slide_height), (1024, 768));
        assert_eq!(render.webcam_width, 512);
        assert_eq!(render.output_fps, 24);
        assert_eq!(render.pad_color, "white");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"pipeline":{"jobs":0},"render":{"pad_color":"black"}}"#)
                .unwrap();
        assert_eq!(config.pipeline.jobs, 0);
        assert_eq!(config.pipeline.effective_jobs(), 1);
        assert!(!config.pipeline.keep_staging);
        assert_eq!(config.render.pad_color, "black");
        assert_eq!(config.render.slide_width, 1024);
        assert_eq!(config.logging.level, "info");
    }
}

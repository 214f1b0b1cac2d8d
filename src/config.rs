use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::types::render::QualityPreset;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub generation_timeout: Duration,
    pub cors_origin: String,
    pub media_dir: PathBuf,
    pub videos_dir: PathBuf,
    pub python_executable: Option<PathBuf>,
    pub quality: QualityPreset,
    pub render_timeout: Duration,
    pub purge_render_dirs: bool,
    pub log_file: PathBuf,
    pub max_body_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        let media_dir = PathBuf::from("media");
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            api_key: String::new(),
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            generation_timeout: Duration::from_secs(60),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            videos_dir: media_dir.join("videos"),
            media_dir,
            python_executable: None,
            quality: QualityPreset::High,
            render_timeout: Duration::from_secs(300),
            purge_render_dirs: true,
            log_file: PathBuf::from("app.log"),
            max_body_size: 64 * 1024,
        }
    }
}

impl Config {
    /// Reads the process environment. The Gemini key is the only mandatory value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("GOOGLE_API_KEY")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingVar("GOOGLE_API_KEY"))?;

        let port = lookup("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let render_timeout_seconds = lookup("RENDER_TIMEOUT_SECONDS")
            .and_then(|s| s.parse().ok())
            .filter(|secs: &u64| *secs > 0)
            .unwrap_or(defaults.render_timeout.as_secs());

        let generation_timeout_seconds = lookup("GEMINI_TIMEOUT_SECONDS")
            .and_then(|s| s.parse().ok())
            .filter(|secs: &u64| *secs > 0)
            .unwrap_or(defaults.generation_timeout.as_secs());

        let quality = match lookup("RENDER_QUALITY") {
            Some(value) => QualityPreset::from_str(&value)
                .ok_or_else(|| ConfigError::Invalid("RENDER_QUALITY", value))?,
            None => defaults.quality,
        };

        let backend_dir = lookup("BACKEND_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let media_dir = backend_dir.join("media");

        let max_body_size = lookup("MAX_BODY_BYTES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_body_size);

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            api_key,
            gemini_model: lookup("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini_base_url),
            generation_timeout: Duration::from_secs(generation_timeout_seconds),
            cors_origin: lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            videos_dir: media_dir.join("videos"),
            media_dir,
            python_executable: lookup("MANIM_PYTHON").map(PathBuf::from),
            quality,
            render_timeout: Duration::from_secs(render_timeout_seconds),
            purge_render_dirs: lookup("PURGE_RENDER_DIRS")
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.purge_render_dirs),
            log_file: lookup("LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            max_body_size,
        })
    }

    /// Points both media directories below `root`.
    pub fn with_backend_dir(mut self, root: &Path) -> Self {
        self.media_dir = root.join("media");
        self.videos_dir = self.media_dir.join("videos");
        self
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.media_dir)?;
        std::fs::create_dir_all(&self.videos_dir)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

use std::path::PathBuf;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    MissingVar(&'static str),
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Model request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Model API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Model returned an empty response")]
    EmptyResponse,
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptParseError {
    #[error("Could not find Scene class in generated code")]
    MissingSceneClass,
    #[error("Invalid scene class name: {0:?}")]
    InvalidSceneName(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Could not find Manim executable: {0}")]
    Environment(String),
    #[error("Animation generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("Manim failed (exit code {exit_code}): {stderr}")]
    Process {
        exit_code: i32,
        stderr: String,
        stdout: String,
    },
    #[error("Video directory was not created")]
    MissingOutputDir(PathBuf),
    #[error("No video files were generated")]
    NoArtifact(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    ScriptParse(#[from] ScriptParseError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Generation(_) | AppError::ScriptParse(_) | AppError::Render(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error: {}", self),
            ),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

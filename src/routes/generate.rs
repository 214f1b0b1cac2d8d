use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};

use crate::error::{AppError, RenderError};
use crate::pipeline::animate;
use crate::state::AppState;
use crate::types::script::GenerateRequest;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/generate", post(generate).options(preflight))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// The body is read as raw bytes so that malformed JSON is a plain 400
/// rather than axum's extractor rejection.
fn parse_description(body: &[u8]) -> Result<String, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("No data received".to_string()));
    }
    let req: GenerateRequest = serde_json::from_slice(body)
        .map_err(|err| AppError::BadRequest(format!("Invalid JSON body: {}", err)))?;
    req.description
        .map(|description| description.trim().to_string())
        .filter(|description| !description.is_empty())
        .ok_or_else(|| AppError::BadRequest("Description is required".to_string()))
}

async fn generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("Received animation generation request");

    let description = parse_description(&body).inspect_err(|err| {
        tracing::warn!("Rejected generation request: {}", err);
    })?;
    tracing::info!("Generating animation for description: {}", description);

    let artifact = animate::create_animation(&state, &description)
        .await
        .inspect_err(|err| {
            tracing::error!("Error in generate: {}", err);
            tracing::error!("{:#?}", err);
        })?;

    let video = tokio::fs::read(&artifact.path).await.map_err(|err| {
        tracing::error!("Error sending file {}: {}", artifact.path.display(), err);
        AppError::Render(RenderError::Io(err))
    })?;

    tracing::info!(
        "Video generated successfully at: {} ({} bytes)",
        artifact.path.display(),
        artifact.size_bytes
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.file_name),
            ),
        ],
        video,
    ))
}

use chrono::{DateTime, Local};

use crate::error::AppError;
use crate::pipeline::{prompt, script};
use crate::state::AppState;
use crate::types::render::RenderArtifact;

/// Runs one request end to end: prompt the model, parse its script, render.
///
/// The script is parsed before anything touches the filesystem, so a response
/// without a scene class never reaches the renderer.
pub async fn create_animation(
    state: &AppState,
    description: &str,
) -> Result<RenderArtifact, AppError> {
    let prompt = prompt::build_prompt(description);
    let raw = state.generator().generate(&prompt).await?;
    tracing::debug!("Generated code from model: {}", raw);

    let script = script::parse_script(&raw)?;
    tracing::info!("Found scene class name: {}", script.scene_name);

    let output_name = output_file_name(Local::now());
    let artifact = state.renderer().render(&script, &output_name).await?;
    Ok(artifact)
}

pub fn output_file_name(now: DateTime<Local>) -> String {
    format!("animation_{}.mp4", now.format("%Y%m%d_%H%M%S"))
}

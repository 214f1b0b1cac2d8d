use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub description: Option<String>,
}

/// Manim source returned by the model, plus the `Scene` subclass to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScript {
    pub source: String,
    pub scene_name: String,
}

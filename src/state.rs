use std::sync::Arc;

use crate::config::Config;
use crate::error::GenerationError;
use crate::pipeline::generate::{GeminiClient, ScriptGenerator};
use crate::pipeline::render::Renderer;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    generator: Arc<dyn ScriptGenerator>,
    renderer: Arc<Renderer>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, GenerationError> {
        let generator = Arc::new(GeminiClient::new(&config)?);
        Ok(Self::with_generator(config, generator))
    }

    /// Builds state around a caller-supplied generator instead of Gemini.
    pub fn with_generator(config: Config, generator: Arc<dyn ScriptGenerator>) -> Self {
        let renderer = Arc::new(Renderer::new(&config));
        Self {
            config: Arc::new(config),
            generator,
            renderer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn generator(&self) -> &dyn ScriptGenerator {
        self.generator.as_ref()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }
}

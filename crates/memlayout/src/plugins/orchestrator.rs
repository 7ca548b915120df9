//! Plugin orchestrator for coordinating the diagram processing pipeline
//!
//! The orchestrator runs every stage for one document:
//! Loader → MapBuilder → Renderer

use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, info, span, warn, Level};

use crate::core::{DiagramError, Renderer};
use crate::map::{MapBuilder, MemoryMap};
use crate::plugins::{GraphvizRenderer, SvgRenderer};
use crate::yaml::Loader;

/// Plugin orchestrator that coordinates the entire pipeline
///
/// Renderers are registered by name; [`Orchestrator::process`] picks one
/// for each call.
pub struct Orchestrator {
    renderers: HashMap<String, Box<dyn Renderer>>,
    loader: Loader,
}

impl Orchestrator {
    /// Create a new orchestrator with no renderers
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
            loader: Loader::new(),
        }
    }

    /// Create a new orchestrator with the SVG and DOT renderers registered
    pub fn with_all_renderers() -> Self {
        let mut orchestrator = Self::new();
        orchestrator.register_renderer(Box::new(SvgRenderer::new()));
        orchestrator.register_renderer(Box::new(GraphvizRenderer::new()));
        orchestrator
    }

    /// Use a custom loader, e.g. one with its own warning handler
    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    /// Register a renderer under its own name, replacing any previous one
    pub fn register_renderer(&mut self, renderer: Box<dyn Renderer>) {
        debug!(
            renderer = renderer.name(),
            version = renderer.version(),
            "Registering renderer"
        );
        self.renderers.insert(renderer.name().to_string(), renderer);
    }

    /// Get available renderer names, sorted
    pub fn renderer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.renderers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn renderer(&self, format: &str) -> Option<&dyn Renderer> {
        self.renderers.get(format).map(|renderer| renderer.as_ref())
    }

    /// Load a document and build its memory map
    pub fn build_map(&self, input: &str) -> Result<MemoryMap> {
        let build_span = span!(Level::INFO, "build_map", input_len = input.len());
        let _enter = build_span.enter();

        let load_span = span!(Level::DEBUG, "pipeline_load");
        let load_enter = load_span.enter();
        let root = self.loader.load_str(input).map_err(DiagramError::from)?;
        drop(load_enter);

        let map = MapBuilder::new().build(&root)?;
        debug!(region_count = map.len(), "Map built");
        Ok(map)
    }

    /// Process input through the complete pipeline
    pub fn process(&self, input: &str, format: &str) -> Result<String> {
        let process_span = span!(
            Level::INFO,
            "process_diagram",
            input_len = input.len(),
            format
        );
        let _enter = process_span.enter();

        info!("Starting diagram processing pipeline");

        let Some(renderer) = self.renderer(format) else {
            warn!(format, "Unsupported output format");
            return Err(DiagramError::unknown_format(format).into());
        };

        let map = self.build_map(input)?;

        let render_span = span!(Level::DEBUG, "pipeline_render", renderer = renderer.name());
        let render_enter = render_span.enter();
        let output = renderer.render(&map)?;
        debug!(output_len = output.len(), "Rendering completed");
        drop(render_enter);

        info!("Pipeline completed successfully");
        Ok(output)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

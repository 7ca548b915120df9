//! Core renderer trait for diagram output
//!
//! A renderer turns a [`MemoryMap`] into the text of one output format.

use anyhow::Result;

use crate::map::MemoryMap;

/// Core trait for diagram renderers
///
/// # Example
/// ```
/// use memlayout::core::Renderer;
/// use memlayout::map::{MemoryMap, Region};
/// use memlayout::plugins::dot::GraphvizRenderer;
///
/// let mut map = MemoryMap::new();
/// map.add_region(Region::new(0x8000, 0x4000));
/// let output = GraphvizRenderer::new().render(&map).unwrap();
/// assert!(output.contains("digraph memory"));
/// ```
pub trait Renderer: Send + Sync {
    /// Render the memory map into the output format
    fn render(&self, map: &MemoryMap) -> Result<String>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the version of this renderer
    fn version(&self) -> &'static str;

    /// Suggested filename suffix for the output, including the dot
    fn file_suffix(&self) -> &'static str;
}

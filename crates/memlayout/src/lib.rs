//! memlayout - Memory layout diagrams from indented text
//!
//! A library for describing memory maps in a small YAML-like format and
//! rendering them as SVG or Graphviz DOT.
//!
//! # Quick Start
//!
//! ```rust
//! use memlayout::render;
//!
//! let input = "\
//! layout:
//!   0x0000: RAM
//!   0x8000: ROM
//! ";
//! let svg = render(input, "svg").unwrap();
//! assert!(svg.contains("ROM"));
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use memlayout::prelude::*;
//!
//! let root = yaml::load_str("layout:\n  0x1000:\n    size: 0x800\n    label: Stack\n").unwrap();
//!
//! // Build the map model
//! let mut map = MapBuilder::new().build(&root).unwrap();
//! assert_eq!(map.regions()[0].size, 0x800);
//!
//! // Adjust it, then render
//! map.add_address_labels(&AddressLabelOptions::default());
//! let dot = GraphvizRenderer::new().render(&map).unwrap();
//! assert!(dot.contains("Stack"));
//! ```

pub mod core;
pub mod map;
pub mod plugins;
pub mod yaml;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        DiagramError, DiscontinuityStyle, JunctionStyle, LabelPosition, Renderer, XPosition,
        YPosition,
    };
    pub use crate::map::{
        AddressLabelOptions, DiscontinuityOptions, MapBuilder, MemoryMap, Region, RegionLabel,
        ValueFormatter,
    };
    pub use crate::plugins::{GraphvizRenderer, Orchestrator, SvgRenderer};
    pub use crate::yaml::{self, Loader, Value};
}

/// Render a memory map document in the named output format
///
/// # Arguments
/// * `input` - Memory map document text
/// * `format` - Renderer name, `svg` or `dot`
///
/// # Example
/// ```rust
/// use memlayout::render;
///
/// let dot = render("layout:\n  0: Boot\n", "dot").unwrap();
/// assert!(dot.starts_with("digraph memory"));
/// assert!(render("layout:\n  0: Boot\n", "pdf").is_err());
/// ```
pub fn render(input: &str, format: &str) -> anyhow::Result<String> {
    use crate::plugins::orchestrator::Orchestrator;

    Orchestrator::with_all_renderers().process(input, format)
}

/// Load a memory map document without rendering it
///
/// # Example
/// ```rust
/// use memlayout::load_map;
///
/// let map = load_map("layout:\n  0x8000: ROM\n").unwrap();
/// assert_eq!(map.regions()[0].address, 0x8000);
/// ```
pub fn load_map(input: &str) -> anyhow::Result<map::MemoryMap> {
    use crate::plugins::orchestrator::Orchestrator;

    Orchestrator::new().build_map(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "\
defaults:
  address_format: acorn
layout:
  0x0000:
    size: 0x4000
    label: RAM
  0xC000:
    size: 0x4000
    label: OS
automatic:
  discontinuities: true
  addresses:
    end: true
";

    #[test]
    fn test_render_svg() {
        let output = render(INPUT, "svg").unwrap();
        assert!(output.contains(">OS</text>"));
        assert!(output.contains(">&amp;C000</text>"));
    }

    #[test]
    fn test_render_dot() {
        let output = render(INPUT, "dot").unwrap();
        assert!(output.contains("region0000c000"));
        assert!(output.contains("style=\"dashed\""));
    }

    #[test]
    fn test_render_unknown_format() {
        let result = render(INPUT, "txt");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_map() {
        let map = load_map(INPUT).unwrap();
        assert_eq!(map.len(), 3);
        assert!(map.regions()[1].is_discontinuity());
    }

    #[test]
    fn test_load_map_error() {
        let err = load_map("defaults:\n  fill: red\n").unwrap_err();
        assert!(err.to_string().contains("layout"));
    }
}

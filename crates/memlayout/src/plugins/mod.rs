//! Output plugins
//!
//! Each renderer turns a [`MemoryMap`](crate::map::MemoryMap) into one
//! output format. The [`Orchestrator`] chooses between them by name.

pub mod dot;
pub mod orchestrator;
pub mod svg;

pub use dot::GraphvizRenderer;
pub use orchestrator::*;
pub use svg::SvgRenderer;

/// Font list used when the map does not name one
pub const DEFAULT_FONT: &str = "Optima, Rachana, Sawasdee, sans-serif";

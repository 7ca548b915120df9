//! SVG output
//!
//! [`elements`] is a small element tree that tracks bounds in inches;
//! [`SvgRenderer`] lays a memory map out with it.

pub mod elements;
mod renderer;

pub use renderer::SvgRenderer;

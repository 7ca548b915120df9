//! Core abstractions for diagram processing
//!
//! Error types, logging setup, the renderer trait, and the small value
//! types shared by the map model and the renderers.

mod error;
mod geometry;
pub mod logging;
mod renderer;
mod types;

pub use error::*;
pub use geometry::*;
pub use logging::*;
pub use renderer::*;
pub use types::*;

//! Memory map model
//!
//! Regions, their labels and the layout parameters of a diagram, plus the
//! [`MapBuilder`] that reads them from a loaded document.

pub mod builder;
mod formatter;
mod label;
mod memory_map;
mod region;

pub use builder::{Defaults, MapBuilder};
pub use formatter::ValueFormatter;
pub use label::RegionLabel;
pub use memory_map::{AddressLabelOptions, DiscontinuityOptions, MemoryMap, Side};
pub use region::{Region, RegionKind, DEFAULT_OUTLINE_WIDTH};

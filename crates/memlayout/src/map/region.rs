//! Address regions
//!
//! A region covers `size` bytes from `address`. Gaps between regions can be
//! represented by discontinuity regions, which are drawn with a break
//! instead of a box.

use crate::core::{DiscontinuityStyle, JunctionStyle, LabelPosition};

use super::label::RegionLabel;

/// Default outline width: two points
pub const DEFAULT_OUTLINE_WIDTH: f64 = 2.0 / 72.0;

/// What a region represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionKind {
    /// Ordinary memory
    #[default]
    Memory,
    /// A gap in the address space
    Discontinuity(DiscontinuityStyle),
}

/// One region of the memory map
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub address: u64,
    pub size: u64,
    pub kind: RegionKind,
    /// At most one label per position, in insertion order
    labels: Vec<RegionLabel>,
    pub fill: Option<String>,
    pub outline: Option<String>,
    /// Outline width in inches
    pub outline_width: f64,
    /// Boundary with the region below (lower addresses)
    pub outline_lower: JunctionStyle,
    /// Boundary with the region above (higher addresses)
    pub outline_upper: JunctionStyle,
}

impl Region {
    pub fn new(address: u64, size: u64) -> Self {
        Self {
            address,
            size,
            kind: RegionKind::Memory,
            labels: Vec::new(),
            fill: None,
            outline: Some("#000".to_string()),
            outline_width: DEFAULT_OUTLINE_WIDTH,
            outline_lower: JunctionStyle::Solid,
            outline_upper: JunctionStyle::Solid,
        }
    }

    pub fn discontinuity(address: u64, size: u64, style: DiscontinuityStyle) -> Self {
        Self {
            kind: RegionKind::Discontinuity(style),
            ..Self::new(address, size)
        }
    }

    /// First address past the region
    pub fn end(&self) -> u64 {
        self.address.saturating_add(self.size)
    }

    pub fn is_discontinuity(&self) -> bool {
        matches!(self.kind, RegionKind::Discontinuity(_))
    }

    pub fn discontinuity_style(&self) -> Option<DiscontinuityStyle> {
        match self.kind {
            RegionKind::Discontinuity(style) => Some(style),
            RegionKind::Memory => None,
        }
    }

    pub fn labels(&self) -> &[RegionLabel] {
        &self.labels
    }

    pub fn label_at(&self, position: LabelPosition) -> Option<&RegionLabel> {
        self.labels.iter().find(|label| label.position == position)
    }

    /// Add a label, replacing any label already at the same position
    pub fn add_label(&mut self, label: RegionLabel) -> &RegionLabel {
        let index = match self
            .labels
            .iter()
            .position(|existing| existing.position == label.position)
        {
            Some(index) => {
                self.labels[index] = label;
                index
            }
            None => {
                self.labels.push(label);
                self.labels.len() - 1
            }
        };
        &self.labels[index]
    }

    pub fn remove_label(&mut self, position: LabelPosition) -> Option<RegionLabel> {
        let index = self
            .labels
            .iter()
            .position(|label| label.position == position)?;
        Some(self.labels.remove(index))
    }
}

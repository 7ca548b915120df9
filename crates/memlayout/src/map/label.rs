//! Text labels attached to regions

use crate::core::LabelPosition;

/// A text label placed relative to a region
///
/// The text may contain `\n` line breaks.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionLabel {
    pub text: String,
    pub position: LabelPosition,
    pub colour: Option<String>,
    pub fontname: Option<String>,
}

impl RegionLabel {
    pub fn new(text: impl Into<String>, position: LabelPosition) -> Self {
        Self {
            text: text.into(),
            position,
            colour: None,
            fontname: None,
        }
    }

    pub fn with_colour(mut self, colour: Option<String>) -> Self {
        self.colour = colour;
        self
    }

    pub fn with_fontname(mut self, fontname: Option<String>) -> Self {
        self.fontname = fontname;
        self
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

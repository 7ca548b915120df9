//! Core type definitions for memory map diagrams
//!
//! Label placement codes, junction styles between adjacent regions, and
//! the drawing styles for gaps in the address space.

use std::fmt;

/// Horizontal placement of a label relative to its region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XPosition {
    /// `il`: inside, left aligned
    InsideLeft,
    /// `ic`: inside, centred
    InsideCentre,
    /// `ir`: inside, right aligned
    InsideRight,
    /// `el`: outside on the left, against the region's edge
    ExternalLeft,
    /// `elm`: outside on the left, mid-way from the edge
    ExternalLeftMiddle,
    /// `elf`: outside on the left, far from the edge
    ExternalLeftFar,
    /// `er`: outside on the right, against the region's edge
    ExternalRight,
    /// `erm`: outside on the right, mid-way from the edge
    ExternalRightMiddle,
    /// `erf`: outside on the right, far from the edge
    ExternalRightFar,
}

impl XPosition {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "il" => Some(XPosition::InsideLeft),
            "ic" => Some(XPosition::InsideCentre),
            "ir" => Some(XPosition::InsideRight),
            "el" => Some(XPosition::ExternalLeft),
            "elm" => Some(XPosition::ExternalLeftMiddle),
            "elf" => Some(XPosition::ExternalLeftFar),
            "er" => Some(XPosition::ExternalRight),
            "erm" => Some(XPosition::ExternalRightMiddle),
            "erf" => Some(XPosition::ExternalRightFar),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            XPosition::InsideLeft => "il",
            XPosition::InsideCentre => "ic",
            XPosition::InsideRight => "ir",
            XPosition::ExternalLeft => "el",
            XPosition::ExternalLeftMiddle => "elm",
            XPosition::ExternalLeftFar => "elf",
            XPosition::ExternalRight => "er",
            XPosition::ExternalRightMiddle => "erm",
            XPosition::ExternalRightFar => "erf",
        }
    }

    pub fn is_inside(&self) -> bool {
        matches!(
            self,
            XPosition::InsideLeft | XPosition::InsideCentre | XPosition::InsideRight
        )
    }

    /// Any of the positions outside the region on the left
    pub fn is_left(&self) -> bool {
        matches!(
            self,
            XPosition::ExternalLeft | XPosition::ExternalLeftMiddle | XPosition::ExternalLeftFar
        )
    }

    /// Any of the positions outside the region on the right
    pub fn is_right(&self) -> bool {
        matches!(
            self,
            XPosition::ExternalRight
                | XPosition::ExternalRightMiddle
                | XPosition::ExternalRightFar
        )
    }
}

impl fmt::Display for XPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Vertical placement of a label relative to its region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YPosition {
    /// `it`: inside, at the top
    InsideTop,
    /// `ic`: inside, centred
    InsideCentre,
    /// `ib`: inside, at the bottom
    InsideBottom,
    /// `jt`: on the junction with the region above
    JunctionTop,
    /// `jb`: on the junction with the region below
    JunctionBottom,
}

impl YPosition {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "it" => Some(YPosition::InsideTop),
            "ic" => Some(YPosition::InsideCentre),
            "ib" => Some(YPosition::InsideBottom),
            "jt" => Some(YPosition::JunctionTop),
            "jb" => Some(YPosition::JunctionBottom),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            YPosition::InsideTop => "it",
            YPosition::InsideCentre => "ic",
            YPosition::InsideBottom => "ib",
            YPosition::JunctionTop => "jt",
            YPosition::JunctionBottom => "jb",
        }
    }

    /// Junction positions folded onto the nearest inside row
    pub fn inside_row(&self) -> YPosition {
        match self {
            YPosition::JunctionTop => YPosition::InsideTop,
            YPosition::JunctionBottom => YPosition::InsideBottom,
            other => *other,
        }
    }
}

impl fmt::Display for YPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Where a label sits: a horizontal and a vertical placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelPosition {
    pub x: XPosition,
    pub y: YPosition,
}

impl LabelPosition {
    pub fn new(x: XPosition, y: YPosition) -> Self {
        Self { x, y }
    }

    /// Decode a position name.
    ///
    /// Accepts the shorthand names `c`, `t`, `b`, `l`, `r`, `tl`, `tr`, `bl`,
    /// `br`, or an explicit `"<x>,<y>"` pair of codes such as `"er,jb"`.
    pub fn parse(text: &str) -> Option<Self> {
        use XPosition as X;
        use YPosition as Y;

        if let Some((x, y)) = text.split_once(',') {
            return Some(Self::new(
                X::from_code(x.trim())?,
                Y::from_code(y.trim())?,
            ));
        }
        let (x, y) = match text {
            "c" => (X::InsideCentre, Y::InsideCentre),
            "t" => (X::InsideCentre, Y::InsideTop),
            "b" => (X::InsideCentre, Y::InsideBottom),
            "l" => (X::InsideLeft, Y::InsideCentre),
            "r" => (X::InsideRight, Y::InsideCentre),
            "tl" => (X::InsideLeft, Y::InsideTop),
            "tr" => (X::InsideRight, Y::InsideTop),
            "bl" => (X::InsideLeft, Y::InsideBottom),
            "br" => (X::InsideRight, Y::InsideBottom),
            _ => return None,
        };
        Some(Self::new(x, y))
    }
}

impl Default for LabelPosition {
    fn default() -> Self {
        Self::new(XPosition::InsideCentre, YPosition::InsideCentre)
    }
}

impl fmt::Display for LabelPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// How the boundary between two adjacent regions is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum JunctionStyle {
    #[default]
    Solid,
    None,
    Dotted,
    Dashed,
    Double,
    /// Short ticks at each end of the boundary
    Ticks,
}

impl JunctionStyle {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "solid" => Some(JunctionStyle::Solid),
            "none" => Some(JunctionStyle::None),
            "dotted" => Some(JunctionStyle::Dotted),
            "dashed" => Some(JunctionStyle::Dashed),
            "double" => Some(JunctionStyle::Double),
            "ticks" => Some(JunctionStyle::Ticks),
            _ => None,
        }
    }

    /// Whether the boundary is drawn as a plain line in the outline path
    pub fn is_closed(&self) -> bool {
        matches!(self, JunctionStyle::Solid | JunctionStyle::Double)
    }

    /// Whether the boundary uses a dash pattern
    pub fn is_patterned(&self) -> bool {
        matches!(self, JunctionStyle::Dotted | JunctionStyle::Dashed)
    }
}

impl fmt::Display for JunctionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JunctionStyle::Solid => write!(f, "solid"),
            JunctionStyle::None => write!(f, "none"),
            JunctionStyle::Dotted => write!(f, "dotted"),
            JunctionStyle::Dashed => write!(f, "dashed"),
            JunctionStyle::Double => write!(f, "double"),
            JunctionStyle::Ticks => write!(f, "ticks"),
        }
    }
}

/// How a gap in the address space is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum DiscontinuityStyle {
    /// Same as `ZigZag`
    #[default]
    Default,
    ZigZag,
    /// Curved cut lines across the region
    CutOut,
    Dotted,
    Dashed,
}

impl DiscontinuityStyle {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "default" => Some(DiscontinuityStyle::Default),
            "zig-zag" => Some(DiscontinuityStyle::ZigZag),
            "cut-out" => Some(DiscontinuityStyle::CutOut),
            "dotted" => Some(DiscontinuityStyle::Dotted),
            "dashed" => Some(DiscontinuityStyle::Dashed),
            _ => None,
        }
    }
}

impl fmt::Display for DiscontinuityStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscontinuityStyle::Default => write!(f, "default"),
            DiscontinuityStyle::ZigZag => write!(f, "zig-zag"),
            DiscontinuityStyle::CutOut => write!(f, "cut-out"),
            DiscontinuityStyle::Dotted => write!(f, "dotted"),
            DiscontinuityStyle::Dashed => write!(f, "dashed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_positions() {
        assert_eq!(LabelPosition::parse("c"), Some(LabelPosition::default()));
        let tr = LabelPosition::parse("tr").unwrap();
        assert_eq!(tr.x, XPosition::InsideRight);
        assert_eq!(tr.y, YPosition::InsideTop);
        assert_eq!(LabelPosition::parse("middle"), None);
    }

    #[test]
    fn test_explicit_positions() {
        let pos = LabelPosition::parse("erf,jb").unwrap();
        assert_eq!(pos.x, XPosition::ExternalRightFar);
        assert_eq!(pos.y, YPosition::JunctionBottom);
        assert_eq!(pos.to_string(), "erf,jb");
        assert_eq!(LabelPosition::parse("el, ic").unwrap().x, XPosition::ExternalLeft);
        assert_eq!(LabelPosition::parse("zz,ic"), None);
        assert_eq!(LabelPosition::parse("ic,zz"), None);
    }

    #[test]
    fn test_position_sides() {
        assert!(XPosition::ExternalLeftMiddle.is_left());
        assert!(XPosition::ExternalRight.is_right());
        assert!(XPosition::InsideLeft.is_inside());
        assert!(!XPosition::InsideLeft.is_left());
        assert_eq!(YPosition::JunctionTop.inside_row(), YPosition::InsideTop);
        assert_eq!(YPosition::InsideCentre.inside_row(), YPosition::InsideCentre);
    }

    #[test]
    fn test_junction_style_parsing() {
        assert_eq!(JunctionStyle::from_str("ticks"), Some(JunctionStyle::Ticks));
        assert_eq!(JunctionStyle::from_str("wavy"), None);
        assert!(JunctionStyle::Double.is_closed());
        assert!(JunctionStyle::Dotted.is_patterned());
        assert_eq!(JunctionStyle::default().to_string(), "solid");
    }

    #[test]
    fn test_discontinuity_style_parsing() {
        assert_eq!(
            DiscontinuityStyle::from_str("cut-out"),
            Some(DiscontinuityStyle::CutOut)
        );
        assert_eq!(DiscontinuityStyle::from_str("zigzag"), None);
        assert_eq!(DiscontinuityStyle::ZigZag.to_string(), "zig-zag");
    }
}

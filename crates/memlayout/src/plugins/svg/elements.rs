//! Minimal SVG element tree
//!
//! Positions and sizes are inches. Rectangles and text are written with
//! `in` units; path data and transforms are written in pixels at
//! [`DPI`] pixels per inch, since path data cannot carry units.

use std::fmt::{self, Write};

use unicode_width::UnicodeWidthStr;

use crate::core::{Bounds, Translate};

/// Pixels per inch for unitless SVG values
pub const DPI: f64 = 96.0;

/// Nominal font size in points
pub const FONT_SIZE: f64 = 12.0;

/// Character width relative to the font size, used to estimate text extents
const TEXT_ASPECT: f64 = 0.75;

/// Inches, as an SVG length
pub fn units(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}in", value as i64)
    } else {
        format!("{:.3}in", value)
    }
}

/// Inches, as unitless pixels
pub fn pixels(value: f64) -> String {
    let value = value * DPI;
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokePattern {
    #[default]
    Solid,
    Dotted,
    Dashed,
}

/// Filled or outlined rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub bounds: Bounds,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            bounds: Bounds::new(x, y, x + width, y + height),
            fill: None,
            stroke: None,
            stroke_width: None,
        }
    }

    pub fn filled(mut self, fill: Option<&str>) -> Self {
        self.fill = fill.map(str::to_string);
        self
    }

    pub fn stroked(mut self, stroke: Option<&str>, width: f64) -> Self {
        self.stroke = stroke.map(str::to_string);
        self.stroke_width = Some(width);
        self
    }

    fn write(&self, out: &mut String, indent: &str) -> fmt::Result {
        let b = &self.bounds;
        write!(
            out,
            "{}<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"",
            indent,
            units(b.x0),
            units(b.y0),
            units(b.width()),
            units(b.height()),
            self.fill.as_deref().unwrap_or("none")
        )?;
        if let Some(stroke) = &self.stroke {
            write!(out, " stroke=\"{}\"", stroke)?;
            if let Some(width) = self.stroke_width {
                write!(out, " stroke-width=\"{}\"", units(width))?;
            }
        }
        writeln!(out, "/>")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    Move(f64, f64),
    Line(f64, f64),
    /// Cubic bezier: two control points then the end point
    Curve([f64; 6]),
}

/// Path built from move, line and curve commands
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub commands: Vec<PathCommand>,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub pattern: StrokePattern,
}

impl Path {
    pub fn filled(fill: Option<&str>) -> Self {
        Self {
            fill: fill.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn stroked(stroke: Option<&str>, width: f64) -> Self {
        Self {
            stroke: stroke.map(str::to_string),
            stroke_width: width,
            ..Default::default()
        }
    }

    pub fn with_pattern(mut self, pattern: StrokePattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.commands.push(PathCommand::Move(x, y));
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.commands.push(PathCommand::Line(x, y));
        self
    }

    pub fn curve_to(&mut self, c0: (f64, f64), c1: (f64, f64), end: (f64, f64)) -> &mut Self {
        self.commands
            .push(PathCommand::Curve([c0.0, c0.1, c1.0, c1.1, end.0, end.1]));
        self
    }

    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::unset();
        for command in &self.commands {
            match command {
                PathCommand::Move(x, y) | PathCommand::Line(x, y) => {
                    bounds.merge_point(*x, *y);
                }
                PathCommand::Curve(points) => {
                    for pair in points.chunks(2) {
                        bounds.merge_point(pair[0], pair[1]);
                    }
                }
            }
        }
        bounds
    }

    fn dash_array(&self) -> Option<String> {
        let w = self.stroke_width;
        match self.pattern {
            StrokePattern::Solid => None,
            StrokePattern::Dotted => Some(format!("{},{}", units(w * 2.0), units(w * 2.0))),
            StrokePattern::Dashed => Some(format!("{},{}", units(w * 4.0), units(w * 2.0))),
        }
    }

    fn write(&self, out: &mut String, indent: &str) -> fmt::Result {
        write!(
            out,
            "{}<path fill=\"{}\" stroke=\"{}\"",
            indent,
            self.fill.as_deref().unwrap_or("none"),
            self.stroke.as_deref().unwrap_or("none")
        )?;
        if self.stroke.is_some() {
            if self.stroke_width > 0.0 {
                write!(out, " stroke-width=\"{}\"", units(self.stroke_width))?;
            }
            if let Some(dashes) = self.dash_array() {
                write!(out, " stroke-dasharray=\"{}\"", dashes)?;
            }
        }

        let mut data = Vec::new();
        for command in &self.commands {
            match command {
                PathCommand::Move(x, y) => data.push(format!("M {} {}", pixels(*x), pixels(*y))),
                PathCommand::Line(x, y) => data.push(format!("L {} {}", pixels(*x), pixels(*y))),
                PathCommand::Curve(points) => {
                    let coords: Vec<String> = points.iter().map(|v| pixels(*v)).collect();
                    data.push(format!("C {}", coords.join(" ")));
                }
            }
        }
        writeln!(out, " d=\"{}\"/>", data.join(" "))
    }
}

/// Horizontal origin of a text element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Centre,
    Right,
}

/// Vertical origin of a text element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Centre,
    Bottom,
}

/// Text whose `(x, y)` origin is the point described by its alignment
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub halign: HAlign,
    pub valign: VAlign,
    pub colour: Option<String>,
    pub font_family: Option<String>,
}

impl Text {
    pub fn new(x: f64, y: f64, text: impl Into<String>, halign: HAlign, valign: VAlign) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            halign,
            valign,
            colour: None,
            font_family: None,
        }
    }

    pub fn line_height() -> f64 {
        FONT_SIZE / 72.0
    }

    /// Estimated width from the widest line; glyph metrics are unknown
    pub fn width(&self) -> f64 {
        let longest = self.text.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
        longest as f64 * FONT_SIZE / 72.0 * TEXT_ASPECT
    }

    pub fn height(&self) -> f64 {
        self.text.lines().count() as f64 * Self::line_height()
    }

    pub fn bounds(&self) -> Bounds {
        let (width, height) = (self.width(), self.height());
        let x0 = match self.halign {
            HAlign::Left => self.x,
            HAlign::Centre => self.x - width / 2.0,
            HAlign::Right => self.x - width,
        };
        let y0 = match self.valign {
            VAlign::Top => self.y,
            VAlign::Centre => self.y - height / 2.0,
            VAlign::Bottom => self.y - height,
        };
        Bounds::new(x0, y0, x0 + width, y0 + height)
    }

    fn write(&self, out: &mut String, indent: &str) -> fmt::Result {
        let lines: Vec<&str> = self.text.lines().collect();
        let extra = lines.len().saturating_sub(1) as f64 * Self::line_height();

        // The origin is for the block; move to the first line
        let mut y = match self.valign {
            VAlign::Top => self.y,
            VAlign::Centre => self.y - extra / 2.0,
            VAlign::Bottom => self.y - extra,
        };

        let mut styles = Vec::new();
        match self.halign {
            HAlign::Left => {}
            HAlign::Centre => styles.push("text-anchor: middle;".to_string()),
            HAlign::Right => styles.push("text-anchor: end;".to_string()),
        }
        match self.valign {
            VAlign::Bottom => {}
            VAlign::Centre => styles.push("dominant-baseline: middle;".to_string()),
            VAlign::Top => styles.push("dominant-baseline: hanging;".to_string()),
        }
        if let Some(font) = &self.font_family {
            styles.push(format!("font-family: {};", font));
        }

        let mut attrs = String::new();
        if let Some(colour) = &self.colour {
            write!(attrs, " fill=\"{}\"", colour)?;
        }
        if !styles.is_empty() {
            write!(attrs, " style=\"{}\"", styles.join(" "))?;
        }

        for line in lines {
            writeln!(
                out,
                "{}<text x=\"{}\" y=\"{}\"{}>{}</text>",
                indent,
                units(self.x),
                units(y),
                attrs,
                escape(line)
            )?;
            y += Self::line_height();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Rect(Rect),
    Path(Path),
    Text(Text),
    Group(Group),
}

impl Element {
    pub fn bounds(&self) -> Bounds {
        match self {
            Element::Rect(rect) => rect.bounds,
            Element::Path(path) => path.bounds(),
            Element::Text(text) => text.bounds(),
            Element::Group(group) => group.bounds(),
        }
    }

    pub fn write(&self, out: &mut String, indent: &str) -> fmt::Result {
        match self {
            Element::Rect(rect) => rect.write(out, indent),
            Element::Path(path) => path.write(out, indent),
            Element::Text(text) => text.write(out, indent),
            Element::Group(group) => group.write(out, indent),
        }
    }
}

impl From<Rect> for Element {
    fn from(rect: Rect) -> Self {
        Element::Rect(rect)
    }
}

impl From<Path> for Element {
    fn from(path: Path) -> Self {
        Element::Path(path)
    }
}

impl From<Text> for Element {
    fn from(text: Text) -> Self {
        Element::Text(text)
    }
}

impl From<Group> for Element {
    fn from(group: Group) -> Self {
        Element::Group(group)
    }
}

/// Group of elements sharing a translation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub elements: Vec<Element>,
    pub translate: Translate,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    pub fn prepend(&mut self, element: impl Into<Element>) {
        self.elements.insert(0, element.into());
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Bounds of the children, after this group's translation
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::unset();
        for element in &self.elements {
            bounds.merge(&element.bounds());
        }
        bounds.translated(self.translate)
    }

    pub fn write(&self, out: &mut String, indent: &str) -> fmt::Result {
        if self.translate.is_identity() {
            writeln!(out, "{}<g>", indent)?;
        } else {
            writeln!(
                out,
                "{}<g transform=\"translate({} {})\">",
                indent,
                pixels(self.translate.dx),
                pixels(self.translate.dy)
            )?;
        }
        let inner = format!("{}  ", indent);
        for element in &self.elements {
            element.write(out, &inner)?;
        }
        writeln!(out, "{}</g>", indent)
    }
}

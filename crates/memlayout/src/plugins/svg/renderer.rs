//! SVG renderer
//!
//! Regions are stacked downwards from the highest address, so y grows as
//! addresses fall. Everything is laid out in inches around the region
//! column at `x = 0 ..= region_width`, then the whole drawing is moved so
//! the padded background starts at the origin.

use std::fmt::Write;

use anyhow::Result;
use tracing::{debug, span, trace, Level};

use super::elements::{pixels, Element, Group, HAlign, Path, Rect, StrokePattern, Text, VAlign};
use crate::core::{
    Bounds, DiscontinuityStyle, JunctionStyle, Renderer, Translate, XPosition, YPosition,
};
use crate::map::{MemoryMap, Region};
use crate::plugins::DEFAULT_FONT;

/// Gap between a label and the region edge it is placed against
const INSET: f64 = 0.05;

/// Renders memory maps as standalone SVG documents
#[derive(Debug, Clone, Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Lay out every region, top of the map first
    pub fn layout(&self, map: &MemoryMap) -> Group {
        let mut group = Group::new();
        let mut y = 0.0;
        for region in map.regions().iter().rev() {
            let height = map.region_height(region);
            trace!(address = region.address, y, height, "Laying out region");
            match region.discontinuity_style() {
                Some(style) => discontinuity(&mut group, map, region, style, y, height),
                None => memory_region(&mut group, map, region, y, height),
            }
            labels(&mut group, map, region, y, height);
            y += height;
        }
        group
    }

    fn header(&self, out: &mut String, map: &MemoryMap, bounds: &Bounds) -> std::fmt::Result {
        writeln!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>"
        )?;
        writeln!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{} {} {} {}\" width=\"{:.2}in\" height=\"{:.2}in\">",
            pixels(bounds.x0),
            pixels(bounds.y0),
            pixels(bounds.width()),
            pixels(bounds.height()),
            bounds.width(),
            bounds.height()
        )?;
        writeln!(out, "<defs>")?;
        writeln!(out, "    <style type=\"text/css\">")?;
        writeln!(out, "        text {{")?;
        writeln!(
            out,
            "            font-family: {};",
            map.font_family.as_deref().unwrap_or(DEFAULT_FONT)
        )?;
        writeln!(out, "        }}")?;
        writeln!(out, "    </style>")?;
        writeln!(out, "</defs>")
    }
}

impl Renderer for SvgRenderer {
    fn render(&self, map: &MemoryMap) -> Result<String> {
        let render_span = span!(Level::INFO, "render_svg", region_count = map.len());
        let _enter = render_span.enter();

        let content = self.layout(map);
        let mut bounds = content.bounds();
        if !bounds.is_set() {
            bounds = Bounds::new(0.0, 0.0, 0.0, 0.0);
        }
        let background = bounds.padded(map.padding);

        let mut document = Group::new();
        document.push(
            Rect::new(
                background.x0,
                background.y0,
                background.width(),
                background.height(),
            )
            .filled(Some(map.background.as_str())),
        );
        document.push(content);
        document.translate = Translate::new(-background.x0, -background.y0);

        let mut out = String::new();
        self.header(&mut out, map, &document.bounds())?;
        Element::from(document).write(&mut out, "")?;
        writeln!(out, "</svg>")?;

        debug!(output_len = out.len(), "SVG rendering completed");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "svg"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn file_suffix(&self) -> &'static str {
        ".svg"
    }
}

fn pattern(style: JunctionStyle) -> StrokePattern {
    match style {
        JunctionStyle::Dotted => StrokePattern::Dotted,
        JunctionStyle::Dashed => StrokePattern::Dashed,
        _ => StrokePattern::Solid,
    }
}

fn memory_region(group: &mut Group, map: &MemoryMap, region: &Region, y: f64, height: f64) {
    let width = map.region_width;
    let fill = Some(region.fill.as_deref().unwrap_or("#fff"));
    let outline = region.outline.as_deref();
    let stroke = region.outline_width;
    let lower = region.outline_lower;
    let upper = region.outline_upper;

    if lower == JunctionStyle::Solid && upper == JunctionStyle::Solid {
        group.push(Rect::new(0.0, y, width, height).filled(fill).stroked(outline, stroke));
        return;
    }

    group.push(Rect::new(0.0, y, width, height).filled(fill));

    // Sides always, ends only when they are closed lines
    let mut path = Path::stroked(outline, stroke);
    path.move_to(0.0, y).line_to(0.0, y + height);
    if lower.is_closed() {
        path.line_to(width, y + height);
    } else {
        path.move_to(width, y + height);
    }
    path.line_to(width, y);
    if upper.is_closed() {
        path.line_to(0.0, y);
    }
    if lower == JunctionStyle::Double {
        let inner = y + height - stroke * 2.0;
        path.move_to(0.0, inner).line_to(width, inner);
    }
    if upper == JunctionStyle::Double {
        let inner = y + stroke * 2.0;
        path.move_to(0.0, inner).line_to(width, inner);
    }
    group.push(path);

    for (style, edge, tick) in [(lower, y + height, width / 8.0), (upper, y, width / 12.0)] {
        if style.is_patterned() {
            let mut path = Path::stroked(outline, stroke).with_pattern(pattern(style));
            path.move_to(0.0, edge).line_to(width, edge);
            group.push(path);
        } else if style == JunctionStyle::Ticks {
            let mut path = Path::stroked(outline, stroke);
            path.move_to(0.0, edge)
                .line_to(tick, edge)
                .move_to(width, edge)
                .line_to(width - tick, edge);
            group.push(path);
        }
    }
}

fn discontinuity(
    group: &mut Group,
    map: &MemoryMap,
    region: &Region,
    style: DiscontinuityStyle,
    y: f64,
    height: f64,
) {
    let width = map.region_width;
    let fill = region.fill.as_deref();
    let outline = region.outline.as_deref();
    let stroke = region.outline_width;
    let offset = map.unit_height / 6.0;

    match style {
        DiscontinuityStyle::Default | DiscontinuityStyle::ZigZag => {
            let segment = (height - offset * 2.0) / 4.0;
            let zig = |path: &mut Path, x: f64, bottom_up: bool| {
                let mut points = [
                    (x, y),
                    (x, y + offset),
                    (x - offset, y + offset + segment),
                    (x, y + offset + segment * 2.0),
                    (x + offset, y + offset + segment * 3.0),
                    (x, y + height - offset),
                    (x, y + height),
                ];
                if bottom_up {
                    points.reverse();
                }
                for (px, py) in points {
                    path.line_to(px, py);
                }
            };

            // The fill runs down the left edge and back up the right
            if fill.is_some() {
                let mut path = Path::filled(fill);
                path.move_to(0.0, y);
                zig(&mut path, 0.0, false);
                zig(&mut path, width, true);
                group.push(path);
            }
            let mut path = Path::stroked(outline, stroke);
            path.move_to(0.0, y);
            zig(&mut path, 0.0, false);
            path.move_to(width, y + height);
            zig(&mut path, width, true);
            group.push(path);
        }
        DiscontinuityStyle::CutOut => {
            let segment = (height - offset) / 2.0;
            let upper = y + segment;
            let lower = y + height - segment;

            if fill.is_some() {
                let mut path = Path::filled(fill);
                for (end, cut) in [(y, upper), (y + height, lower)] {
                    path.move_to(0.0, end)
                        .line_to(0.0, cut)
                        .curve_to(
                            (offset, cut + offset),
                            (offset * 2.0, cut + offset),
                            (offset * 3.0, cut),
                        )
                        .curve_to(
                            (offset * 4.0, cut - offset),
                            (width - offset * 4.0, cut + offset),
                            (width - offset * 3.0, cut),
                        )
                        .curve_to(
                            (width - offset * 2.0, cut - offset),
                            (width - offset, cut - offset),
                            (width, cut),
                        )
                        .line_to(width, end);
                }
                group.push(path);
            }

            // Each side is cut with a short wave crossing the edge
            let mut path = Path::stroked(outline, stroke);
            for x in [0.0, width] {
                for (end, cut) in [(y, upper), (y + height, lower)] {
                    path.move_to(x, end)
                        .line_to(x, cut)
                        .move_to(x - offset * 3.0, cut)
                        .curve_to(
                            (x - offset * 2.0, cut - offset),
                            (x - offset, cut - offset),
                            (x, cut),
                        )
                        .curve_to(
                            (x + offset, cut + offset),
                            (x + offset * 2.0, cut + offset),
                            (x + offset * 3.0, cut),
                        );
                }
            }
            group.push(path);
        }
        DiscontinuityStyle::Dotted | DiscontinuityStyle::Dashed => {
            if fill.is_some() {
                group.push(Rect::new(0.0, y, width, height).filled(fill));
            }

            let solid_upper = region.outline_upper == JunctionStyle::Solid;
            let solid_lower = region.outline_lower == JunctionStyle::Solid;
            if solid_upper || solid_lower {
                let mut path = Path::stroked(outline, stroke);
                if solid_upper {
                    path.move_to(0.0, y).line_to(width, y);
                }
                if solid_lower {
                    path.move_to(0.0, y + height).line_to(width, y + height);
                }
                group.push(path);
            }

            let sides = if style == DiscontinuityStyle::Dotted {
                StrokePattern::Dotted
            } else {
                StrokePattern::Dashed
            };
            let mut path = Path::stroked(outline, stroke).with_pattern(sides);
            path.move_to(0.0, y)
                .line_to(0.0, y + height)
                .move_to(width, y + height)
                .line_to(width, y);
            group.push(path);
        }
    }
}

fn labels(group: &mut Group, map: &MemoryMap, region: &Region, y: f64, height: f64) {
    let width = map.region_width;
    for label in region.labels() {
        let (x, halign) = match label.position.x {
            XPosition::InsideLeft => (INSET, HAlign::Left),
            XPosition::InsideCentre => (width / 2.0, HAlign::Centre),
            XPosition::InsideRight => (width - INSET, HAlign::Right),
            XPosition::ExternalLeft => (-INSET, HAlign::Right),
            XPosition::ExternalLeftMiddle => (-width / 2.0, HAlign::Centre),
            XPosition::ExternalLeftFar => (INSET - width, HAlign::Left),
            XPosition::ExternalRight => (width + INSET, HAlign::Left),
            XPosition::ExternalRightMiddle => (width * 1.5, HAlign::Centre),
            XPosition::ExternalRightFar => (width * 2.0 - INSET, HAlign::Right),
        };
        let (label_y, valign) = match label.position.y {
            YPosition::InsideTop => (y + INSET, VAlign::Top),
            YPosition::InsideCentre => (y + height / 2.0, VAlign::Centre),
            YPosition::InsideBottom => (y + height - INSET, VAlign::Bottom),
            YPosition::JunctionTop => (y, VAlign::Centre),
            YPosition::JunctionBottom => (y + height, VAlign::Centre),
        };

        let mut text = Text::new(x, label_y, label.text.clone(), halign, valign);
        text.colour = label.colour.clone();
        text.font_family = label.fontname.clone();
        group.push(text);
    }
}

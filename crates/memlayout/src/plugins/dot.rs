//! Graphviz DOT renderer
//!
//! Each region becomes a fixed-size rectangle node, stacked by invisible
//! edges from the highest address down. Labels outside the region are
//! placed in borderless table nodes held on the same rank.

use std::fmt::Write;

use anyhow::Result;
use tracing::{debug, span, trace, Level};

use crate::core::{DiscontinuityStyle, Renderer, XPosition, YPosition};
use crate::map::{MemoryMap, Region, RegionLabel};

use super::DEFAULT_FONT;

const CELL_PADDING: u32 = 2;
const ROWS: [YPosition; 3] = [
    YPosition::InsideTop,
    YPosition::InsideCentre,
    YPosition::InsideBottom,
];

/// Where a label table sits relative to its region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Cell,
    Left,
    Right,
}

impl Placement {
    /// Columns from left to right
    fn columns(&self) -> [XPosition; 3] {
        match self {
            Placement::Cell => [
                XPosition::InsideLeft,
                XPosition::InsideCentre,
                XPosition::InsideRight,
            ],
            Placement::Left => [
                XPosition::ExternalLeftFar,
                XPosition::ExternalLeftMiddle,
                XPosition::ExternalLeft,
            ],
            Placement::Right => [
                XPosition::ExternalRight,
                XPosition::ExternalRightMiddle,
                XPosition::ExternalRightFar,
            ],
        }
    }
}

/// Renders memory maps as Graphviz `digraph` source
#[derive(Debug, Clone, Default)]
pub struct GraphvizRenderer;

impl GraphvizRenderer {
    pub fn new() -> Self {
        Self
    }

    fn header(&self, out: &mut String, map: &MemoryMap) -> std::fmt::Result {
        let font = map.font_family.as_deref().unwrap_or(DEFAULT_FONT);
        writeln!(out, "digraph memory {{")?;
        writeln!(out, "    ranksep = 0;")?;
        writeln!(out, "    nodesep = 0;")?;
        writeln!(out, "    graph [")?;
        writeln!(out, "        pad = {};", map.padding)?;
        writeln!(out, "        bgcolor = \"{}\";", expand_colour(Some(map.background.as_str())))?;
        writeln!(out, "    ];")?;
        writeln!(out, "    node [")?;
        writeln!(out, "        shape=rect,")?;
        writeln!(out, "        penwidth=2,")?;
        writeln!(out, "        fontname=\"{}\",", font)?;
        writeln!(out, "        fontsize = 12")?;
        writeln!(out, "    ];")?;
        writeln!(out, "    edge [")?;
        writeln!(out, "        fontname=\"{}\",", font)?;
        writeln!(out, "        style=invis")?;
        writeln!(out, "    ];")
    }

    fn region(
        &self,
        out: &mut String,
        map: &MemoryMap,
        region: &Region,
        any_on_left: bool,
        last_left: Option<&Region>,
    ) -> std::fmt::Result {
        let name = node_name(region);
        let height = map.region_height(region);
        let has_right = region.labels().iter().any(|l| l.position.x.is_right());

        // Side tables share the rank of the region so they line up with it
        if any_on_left || has_right {
            writeln!(out, "    {{")?;
            writeln!(out, "        rank = same;")?;
            if any_on_left {
                let table = region_table(map, height, region.labels(), Placement::Left);
                writeln!(
                    out,
                    "        {}left [ label=<{}> labelloc=c, labeljust=c, shape=none ];",
                    name, table
                )?;
            }
            writeln!(out, "        {};", name)?;
            if has_right {
                let table = region_table(map, height, region.labels(), Placement::Right);
                writeln!(
                    out,
                    "        {}right [ label=<{}> labelloc=c, labeljust=c, shape=none ];",
                    name, table
                )?;
            }
            writeln!(out, "    }}")?;
            if let Some(previous) = last_left {
                writeln!(out, "    {}left -> {}left;", node_name(previous), name)?;
            }
        }

        writeln!(
            out,
            "    {} [ width={:.2}, height={:.2}, fixedsize=true ];",
            name, map.region_width, height
        )?;

        let interior: Vec<&RegionLabel> = region
            .labels()
            .iter()
            .filter(|label| label.position.x.is_inside())
            .collect();
        match interior.as_slice() {
            // An empty label stops Graphviz showing the node name
            [] => writeln!(out, "    {} [ label=\"\" ];", name)?,
            [label] => {
                let justify = match label.position.x {
                    XPosition::InsideLeft => "\\l",
                    XPosition::InsideRight => "\\r",
                    _ => "",
                };
                let text = label
                    .text
                    .replace('\\', "\\\\")
                    .replace('"', "\\\"")
                    .replace('\n', if justify.is_empty() { "\\n" } else { justify });
                let colour = label
                    .colour
                    .as_deref()
                    .map(|c| format!(", fontcolor=\"{}\"", expand_colour(Some(c))))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "    {} [ label=\"{}{}\", labelloc={}{} ];",
                    name,
                    text,
                    justify,
                    label_loc(label.position.y),
                    colour
                )?;
            }
            _ => {
                let labels: Vec<RegionLabel> = interior.iter().map(|&label| label.clone()).collect();
                let table = region_table(map, height, &labels, Placement::Cell);
                writeln!(out, "    {} [ label=<{}> labelloc=c labeljust=c ];", name, table)?;
            }
        }

        let mut style = Vec::new();
        if let Some(discontinuity) = region.discontinuity_style() {
            style.push(match discontinuity {
                DiscontinuityStyle::Dotted => "dotted",
                _ => "dashed",
            });
        }
        let mut attrs = Vec::new();
        if let Some(fill) = &region.fill {
            attrs.push(format!("fillcolor=\"{}\"", expand_colour(Some(fill.as_str()))));
            style.push("filled");
        }
        if let Some(outline) = &region.outline {
            attrs.push(format!("color=\"{}\"", expand_colour(Some(outline.as_str()))));
            attrs.push(format!("penwidth=\"{:.2}\"", region.outline_width * 72.0));
        }
        if !style.is_empty() {
            attrs.push(format!("style=\"{}\"", style.join(",")));
        }
        if !attrs.is_empty() {
            writeln!(out, "    {} [ {} ];", name, attrs.join(", "))?;
        }
        Ok(())
    }
}

impl Renderer for GraphvizRenderer {
    fn render(&self, map: &MemoryMap) -> Result<String> {
        let render_span = span!(Level::INFO, "render_dot", region_count = map.len());
        let _enter = render_span.enter();

        let mut out = String::new();
        self.header(&mut out, map)?;

        let any_on_left = map
            .regions()
            .iter()
            .any(|region| region.labels().iter().any(|l| l.position.x.is_left()));

        let mut last: Option<&Region> = None;
        for region in map.regions().iter().rev() {
            trace!(address = region.address, "Writing region node");
            let last_left = if any_on_left { last } else { None };
            self.region(&mut out, map, region, any_on_left, last_left)?;
            if let Some(previous) = last {
                writeln!(out, "    {} -> {};", node_name(previous), node_name(region))?;
            }
            last = Some(region);
        }

        writeln!(out, "}}")?;
        debug!(output_len = out.len(), "DOT rendering completed");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "dot"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn file_suffix(&self) -> &'static str {
        ".dot"
    }
}

fn node_name(region: &Region) -> String {
    format!("region{:08x}", region.address)
}

/// `#abc` becomes `#aabbcc`; no colour is fully transparent
pub fn expand_colour(colour: Option<&str>) -> String {
    let Some(colour) = colour.filter(|c| !c.is_empty()) else {
        return "#FFFFFF00".to_string();
    };
    match colour.strip_prefix('#') {
        Some(short) if short.len() == 3 && short.is_ascii() => {
            let mut expanded = String::from("#");
            for c in short.chars() {
                expanded.push(c);
                expanded.push(c);
            }
            expanded
        }
        _ => colour.to_string(),
    }
}

fn label_loc(y: YPosition) -> &'static str {
    match y.inside_row() {
        YPosition::InsideTop => "t",
        YPosition::InsideBottom => "b",
        _ => "c",
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "<br/>")
}

fn cell_text(label: Option<&RegionLabel>) -> String {
    let Some(label) = label else {
        return String::new();
    };
    let escaped = escape_html(&label.text);
    match &label.colour {
        Some(colour) if !escaped.is_empty() => format!(
            "<font color=\"{}\">{}</font>",
            expand_colour(Some(colour.as_str())),
            escaped
        ),
        _ => escaped,
    }
}

/// Three by three HTML table holding the labels for one placement
///
/// Junction rows are folded into the nearest inside row.
fn region_table(map: &MemoryMap, height: f64, labels: &[RegionLabel], place: Placement) -> String {
    let columns = place.columns();
    let cell = |row: YPosition, column: XPosition| {
        labels
            .iter()
            .find(|l| l.position.x == column && l.position.y.inside_row() == row)
    };
    let used_mask = |cells: [bool; 3]| {
        (cells[0] as u8) << 2 | (cells[1] as u8) << 1 | cells[2] as u8
    };

    let rows_used = used_mask(ROWS.map(|y| columns.iter().any(|&x| cell(y, x).is_some())));
    // Rows share the height equally when there is room, otherwise only
    // the rows with labels take space
    let row_heights = if height > map.region_min_height * 3.0 {
        [height / 3.0; 3]
    } else if rows_used == 0 {
        [0.0, height, 0.0]
    } else {
        let share = height / f64::from(rows_used.count_ones());
        [0b100u8, 0b010, 0b001].map(|bit| if rows_used & bit != 0 { share } else { 0.0 })
    };

    let mut rows = String::new();
    for (index, &row_position) in ROWS.iter().enumerate() {
        let cells = columns.map(|column| cell(row_position, column));
        let used = used_mask(cells.map(|c| c.is_some()));
        let cell_height = (row_heights[index] * 72.0).max(0.0);
        if used == 0 && cell_height == 0.0 {
            continue;
        }
        let valign = ["top", "middle", "bottom"][index];
        rows.push_str(&row(map, valign, used, cell_height, cells));
    }
    table(height, map.region_width, &rows)
}

fn table(height: f64, width: f64, rows: &str) -> String {
    format!(
        "<table cellborder=\"0\" cellspacing=\"0\" cellpadding=\"{}\" border=\"0\" fixedsize=\"false\" height=\"{:.2}\" width=\"{:.2}\">{}</table>",
        CELL_PADDING,
        height * 72.0,
        width * 72.0,
        rows
    )
}

fn row(
    map: &MemoryMap,
    valign: &str,
    used: u8,
    cell_height: f64,
    cells: [Option<&RegionLabel>; 3],
) -> String {
    let cell_width = map.region_width * 72.0;
    let spanning = |align: &str, label: Option<&RegionLabel>| {
        format!(
            "<td colspan=\"3\" align=\"{}\" valign=\"{}\" width=\"{}\" height=\"{}\">{}</td>",
            align,
            valign,
            cell_width,
            cell_height,
            cell_text(label)
        )
    };
    let single = |colspan: &str, align: &str, label: Option<&RegionLabel>| {
        format!(
            "<td{} align=\"{}\" valign=\"{}\" height=\"{}\">{}</td>",
            colspan,
            align,
            valign,
            cell_height,
            cell_text(label)
        )
    };

    let cells_html = match used {
        0b000 => spanning("center", None),
        0b001 => spanning("right", cells[2]),
        0b010 => spanning("center", cells[1]),
        0b100 => spanning("left", cells[0]),
        0b101 => {
            single(" colspan=\"2\"", "left", cells[0]) + &single("", "right", cells[2])
        }
        _ => {
            single("", "left", cells[0])
                + &single("", "center", cells[1])
                + &single("", "right", cells[2])
        }
    };
    format!("<tr>{}</tr>", cells_html)
}

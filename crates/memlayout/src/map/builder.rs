//! Build a [`MemoryMap`] from a loaded document
//!
//! The document root is a mapping with three sections:
//!
//! ```text
//! defaults:            # optional presentation and layout defaults
//!   address_format: acorn
//!   min_height: 24pt
//! layout:              # required: address -> label or region description
//!   0x0000: Zero page
//!   0x8000:
//!     size: 0x4000
//!     label: ROM
//!     fill: "#ddf"
//! automatic:           # optional generated content
//!   discontinuities: true
//!   addresses:
//!     end: true
//! ```

use tracing::{debug, info, span, trace, Level};

use crate::core::{DiagramError, DiscontinuityStyle, JunctionStyle, LabelPosition};
use crate::yaml::{Mapping, Value};

use super::formatter::ValueFormatter;
use super::label::RegionLabel;
use super::memory_map::{AddressLabelOptions, DiscontinuityOptions, MemoryMap, Side};
use super::region::{Region, DEFAULT_OUTLINE_WIDTH};

type Result<T> = std::result::Result<T, DiagramError>;

/// Presentation defaults applied to every region and label
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    pub colour: Option<String>,
    pub colour_size: Option<String>,
    pub fontname: Option<String>,
    pub fontname_address: Option<String>,
    pub fill: Option<String>,
    pub outline: Option<String>,
    /// Inches
    pub outline_width: f64,
    pub position: LabelPosition,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            colour: None,
            colour_size: None,
            fontname: None,
            fontname_address: None,
            fill: None,
            outline: None,
            outline_width: DEFAULT_OUTLINE_WIDTH,
            position: LabelPosition::default(),
        }
    }
}

/// Interprets a document tree as a memory map description
#[derive(Debug, Clone, Default)]
pub struct MapBuilder {
    defaults: Defaults,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The defaults in effect after the last [`MapBuilder::build`]
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn build(&mut self, root: &Value) -> Result<MemoryMap> {
        let build_span = span!(Level::INFO, "build_map");
        let _enter = build_span.enter();

        let document = root.as_mapping().ok_or_else(|| {
            DiagramError::config_error(format!(
                "Document must be a mapping, got {}",
                root.type_name()
            ))
        })?;

        self.defaults = Defaults::default();
        let mut map = MemoryMap::new();

        if let Some(defaults) = document.get("defaults") {
            self.apply_defaults(&mut map, section(defaults, "defaults")?)?;
        }

        let layout = document
            .get("layout")
            .ok_or_else(|| DiagramError::config_error("'layout' not defined"))?;
        self.apply_layout(&mut map, section(layout, "layout")?)?;

        if let Some(automatic) = document.get("automatic") {
            self.apply_automatic(&mut map, section(automatic, "automatic")?)?;
        }

        info!(region_count = map.len(), "Memory map built");
        Ok(map)
    }

    fn apply_defaults(&mut self, map: &mut MemoryMap, defaults: &Mapping) -> Result<()> {
        trace!(keys = defaults.len(), "Applying defaults");

        // Layout options
        if let Some(value) = defaults.get("unit_size") {
            map.unit_size = match value.as_u64() {
                Some(size) if size > 0 => size,
                _ => return Err(invalid("defaults.unit_size", "a positive integer", value)),
            };
        }
        if let Some(value) = defaults.get("unit_height") {
            map.unit_height = decode_distance(value, "defaults.unit_height")?;
        }
        if let Some(value) = defaults.get("min_height") {
            map.region_min_height = decode_distance(value, "defaults.min_height")?;
        }
        if let Some(value) = defaults.get("max_height") {
            map.region_max_height = decode_distance(value, "defaults.max_height")?;
        }
        if let Some(value) = defaults.get("discontinuity_height") {
            let height = decode_distance(value, "defaults.discontinuity_height")?;
            map.set_discontinuity_height(Some(height));
        }
        if let Some(value) = defaults.get("region_width") {
            map.region_width = decode_distance(value, "defaults.region_width")?;
        }

        // Presentation options
        if let Some(value) = defaults.get("background") {
            map.background = text(value, "defaults.background")?;
        }
        let d = &mut self.defaults;
        read_text(defaults, "fill", "defaults.fill", &mut d.fill)?;
        read_text(defaults, "outline", "defaults.outline", &mut d.outline)?;
        read_text(defaults, "colour", "defaults.colour", &mut d.colour)?;
        read_text(defaults, "colour_size", "defaults.colour_size", &mut d.colour_size)?;
        read_text(defaults, "fontname", "defaults.fontname", &mut d.fontname)?;
        read_text(
            defaults,
            "fontname_address",
            "defaults.fontname_address",
            &mut d.fontname_address,
        )?;
        if let Some(value) = defaults.get("outline_width") {
            d.outline_width = decode_distance(value, "defaults.outline_width")?;
        }
        if let Some(value) = defaults.get("position") {
            d.position = decode_position(value)?;
        }
        map.font_family = d.fontname.clone();

        // Label formats
        if let Some(value) = defaults.get("address_format") {
            map.address_formatter = decode_formatter(value)?;
        }
        if let Some(value) = defaults.get("size_format") {
            map.size_formatter = Some(decode_formatter(value)?);
        }
        Ok(())
    }

    fn apply_layout(&self, map: &mut MemoryMap, layout: &Mapping) -> Result<()> {
        let mut ordered = layout
            .iter()
            .map(|(key, config)| decode_address(key).map(|address| (address, config)))
            .collect::<Result<Vec<_>>>()?;
        ordered.sort_by_key(|(address, _)| *address);

        // Junctions are applied once every region exists, because each one
        // also changes the facing edge of the neighbouring region
        let mut junctions: Vec<(u64, Option<JunctionStyle>, Option<JunctionStyle>)> = Vec::new();

        for (address, config) in ordered {
            let region = match config {
                Value::Mapping(config) => {
                    let low = optional_junction(config, "junction_low")?;
                    let high = optional_junction(config, "junction_high")?;
                    if low.is_some() || high.is_some() {
                        junctions.push((address, low, high));
                    }
                    self.region_from_mapping(map, address, config)?
                }
                Value::Null => self.plain_region(map, address),
                Value::Sequence(_) => {
                    return Err(DiagramError::config_error(format!(
                        "Layout entry for {} must be a label or a mapping",
                        map.format_address(address)
                    )))
                }
                scalar => {
                    let mut region = self.plain_region(map, address);
                    region.add_label(
                        RegionLabel::new(scalar.to_string(), self.defaults.position)
                            .with_colour(self.defaults.colour.clone()),
                    );
                    region
                }
            };
            debug!(
                address = region.address,
                size = region.size,
                labels = region.labels().len(),
                "Region defined"
            );
            map.add_region(region);
        }

        for (address, low, high) in junctions {
            if let Some(style) = low {
                map.set_outline_lower(Some(address), style)?;
            }
            if let Some(style) = high {
                map.set_outline_upper(Some(address), style)?;
            }
        }
        Ok(())
    }

    fn plain_region(&self, map: &MemoryMap, address: u64) -> Region {
        let mut region = Region::new(address, map.unit_size);
        self.apply_colours(&mut region, None, None);
        region.outline_width = self.defaults.outline_width;
        region
    }

    fn apply_colours(&self, region: &mut Region, fill: Option<String>, outline: Option<String>) {
        if let Some(fill) = fill.or_else(|| self.defaults.fill.clone()) {
            region.fill = Some(fill);
        }
        if let Some(outline) = outline.or_else(|| self.defaults.outline.clone()) {
            region.outline = Some(outline);
        }
    }

    fn region_from_mapping(&self, map: &MemoryMap, address: u64, config: &Mapping) -> Result<Region> {
        let size = match config.get("size") {
            None => map.unit_size,
            Some(value) => match value.as_u64() {
                Some(size) => size,
                None => return Err(invalid("size", "a non-negative integer", value)),
            },
        };

        let mut region = match config.get("discontinuity") {
            None | Some(Value::Bool(false)) | Some(Value::Null) => Region::new(address, size),
            Some(Value::Bool(true)) => {
                Region::discontinuity(address, size, DiscontinuityStyle::Default)
            }
            Some(value) => Region::discontinuity(address, size, decode_discontinuity(value)?),
        };

        let fill = optional_text(config, "fill")?;
        let outline = optional_text(config, "outline")?;
        self.apply_colours(&mut region, fill, outline);
        region.outline_width = match config.get("outline_width") {
            Some(value) => decode_distance(value, "outline_width")?,
            None => self.defaults.outline_width,
        };

        for label in self.labels(config)? {
            region.add_label(label);
        }
        Ok(region)
    }

    /// Labels from `labels` (a list, or a position to label mapping) plus `label`
    fn labels(&self, config: &Mapping) -> Result<Vec<RegionLabel>> {
        let mut labels = Vec::new();

        match config.get("labels") {
            None | Some(Value::Null) => {}
            Some(Value::Sequence(items)) => {
                for item in items {
                    labels.push(self.label(item, self.defaults.position)?);
                }
            }
            Some(Value::Mapping(by_position)) => {
                for (position, item) in by_position.iter() {
                    let position = decode_position(&Value::from(position))?;
                    labels.push(self.label(item, position)?);
                }
            }
            Some(other) => return Err(invalid("labels", "a list or a mapping", other)),
        }

        if let Some(label) = config.get("label") {
            labels.push(self.label(label, self.defaults.position)?);
        }
        Ok(labels)
    }

    /// A label is plain text, or a mapping with `label`, `position`, `colour`
    fn label(&self, value: &Value, position: LabelPosition) -> Result<RegionLabel> {
        let colour = self.defaults.colour.clone();
        match value {
            Value::Mapping(fields) => {
                let label_text = fields
                    .get("label")
                    .ok_or_else(|| DiagramError::config_error("Label mapping has no 'label' text"))
                    .and_then(|v| scalar_text(v, "label"))?;
                let position = match fields.get("position") {
                    Some(value) => decode_position(value)?,
                    None => position,
                };
                let colour = optional_text(fields, "colour")?.or(colour);
                Ok(RegionLabel::new(label_text, position).with_colour(colour))
            }
            other => Ok(RegionLabel::new(scalar_text(other, "label")?, position).with_colour(colour)),
        }
    }

    fn apply_automatic(&self, map: &mut MemoryMap, automatic: &Mapping) -> Result<()> {
        if let Some(value) = automatic.get("discontinuities") {
            let mut options = DiscontinuityOptions {
                fill: self.defaults.fill.clone(),
                outline: self.defaults.outline.clone(),
                outline_width: Some(self.defaults.outline_width),
                style: DiscontinuityStyle::Default,
            };
            let enable = match value {
                Value::Bool(enable) => *enable,
                Value::Mapping(config) => {
                    if let Some(fill) = optional_text(config, "fill")? {
                        options.fill = Some(fill);
                    }
                    if let Some(outline) = optional_text(config, "outline")? {
                        options.outline = Some(outline);
                    }
                    if let Some(style) = config.get("style").filter(|v| !v.is_null()) {
                        options.style = decode_discontinuity(style)?;
                    }
                    flag(config, "enable", true)?
                }
                other => {
                    return Err(invalid(
                        "automatic.discontinuities",
                        "a boolean or a mapping",
                        other,
                    ))
                }
            };
            if enable {
                map.add_discontinuities(&options);
            }
        }

        if let Some(value) = automatic.get("addresses") {
            let mut options = AddressLabelOptions {
                colour: self.defaults.colour.clone(),
                colour_size: self.defaults.colour_size.clone(),
                fontname_address: self.defaults.fontname_address.clone(),
                ..Default::default()
            };
            let enable = match value {
                Value::Bool(enable) => *enable,
                Value::Mapping(config) => {
                    options.start = flag(config, "start", options.start)?;
                    options.end = flag(config, "end", options.end)?;
                    options.size = flag(config, "size", options.size)?;
                    options.end_exclusive = flag(config, "end_exclusive", options.end_exclusive)?;
                    options.initial_start = flag(config, "initial_start", options.initial_start)?;
                    options.final_end = flag(config, "final_end", options.final_end)?;
                    if let Some(side) = config.get("side") {
                        options.side = side
                            .as_str()
                            .and_then(Side::from_str)
                            .ok_or_else(|| invalid("side", "'left' or 'right'", side))?;
                    }
                    if let Some(omit) = config.get("omit") {
                        options.omit = decode_omit(omit)?;
                    }
                    if let Some(colour) = optional_text(config, "colour")? {
                        options.colour = Some(colour);
                    }
                    flag(config, "enable", true)?
                }
                other => {
                    return Err(invalid(
                        "automatic.addresses",
                        "a boolean or a mapping",
                        other,
                    ))
                }
            };
            if enable {
                map.add_address_labels(&options);
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, expected: &str, value: &Value) -> DiagramError {
    DiagramError::config_error(format!(
        "'{}' must be {}, got {} '{}'",
        field,
        expected,
        value.type_name(),
        value
    ))
}

fn section<'a>(value: &'a Value, name: &str) -> Result<&'a Mapping> {
    value
        .as_mapping()
        .ok_or_else(|| invalid(name, "a mapping", value))
}

/// Text of a scalar; numbers and booleans are written out
fn scalar_text(value: &Value, field: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(_) | Value::Float(_) | Value::Bool(_) => Ok(value.to_string()),
        other => Err(invalid(field, "text", other)),
    }
}

fn text(value: &Value, field: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(field, "a string", value))
}

/// A string field that may be absent or null
fn optional_text(config: &Mapping, key: &str) -> Result<Option<String>> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => text(value, key).map(Some),
    }
}

fn read_text(config: &Mapping, key: &str, field: &str, target: &mut Option<String>) -> Result<()> {
    match config.get(key) {
        None => {}
        Some(Value::Null) => *target = None,
        Some(value) => *target = Some(text(value, field)?),
    }
    Ok(())
}

fn flag(config: &Mapping, key: &str, default: bool) -> Result<bool> {
    match config.get(key) {
        None => Ok(default),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| invalid(key, "true or false", value)),
    }
}

fn optional_junction(config: &Mapping, key: &str) -> Result<Option<JunctionStyle>> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .and_then(JunctionStyle::from_str)
            .map(Some)
            .ok_or_else(|| {
                invalid(key, "one of solid, none, dotted, dashed, double, ticks", value)
            }),
    }
}

fn decode_discontinuity(value: &Value) -> Result<DiscontinuityStyle> {
    value
        .as_str()
        .and_then(DiscontinuityStyle::from_str)
        .ok_or_else(|| {
            invalid(
                "discontinuity style",
                "one of default, zig-zag, cut-out, dotted, dashed",
                value,
            )
        })
}

/// Layout keys are `0x` hex or decimal addresses
pub fn decode_address(key: &str) -> Result<u64> {
    let parsed = match key.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => key.parse::<u64>(),
    };
    parsed.map_err(|_| {
        DiagramError::config_error(format!("Layout address '{}' is not recognised", key))
    })
}

/// Distances are inches, or points with a `pt` suffix
pub fn decode_distance(value: &Value, field: &str) -> Result<f64> {
    if let Some(distance) = value.as_f64() {
        return Ok(distance);
    }
    let parsed = value.as_str().and_then(|s| match s.strip_suffix("pt") {
        Some(points) => points.trim().parse::<f64>().ok().map(|p| p / 72.0),
        None => s.trim().parse::<f64>().ok(),
    });
    parsed.ok_or_else(|| invalid(field, "a distance in inches or points", value))
}

pub fn decode_position(value: &Value) -> Result<LabelPosition> {
    value
        .as_str()
        .and_then(LabelPosition::parse)
        .ok_or_else(|| {
            DiagramError::config_error(format!("Unrecognised label position '{}'", value))
        })
}

pub fn decode_formatter(value: &Value) -> Result<ValueFormatter> {
    value
        .as_str()
        .and_then(ValueFormatter::from_name)
        .ok_or_else(|| {
            DiagramError::config_error(format!(
                "Unrecognised formatter name '{}'. Valid names are: {}",
                value,
                ValueFormatter::names().join(", ")
            ))
        })
}

fn decode_omit(value: &Value) -> Result<Vec<u64>> {
    let address = |item: &Value| item.as_u64().ok_or_else(|| invalid("omit", "an address", item));
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items.iter().map(address).collect(),
        single => Ok(vec![address(single)?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{XPosition, YPosition};
    use crate::yaml;

    fn build(text: &str) -> Result<MemoryMap> {
        let root = yaml::load_str(text).unwrap();
        MapBuilder::new().build(&root)
    }

    #[test]
    fn test_decode_address() {
        assert_eq!(decode_address("0x8000").unwrap(), 0x8000);
        assert_eq!(decode_address("4096").unwrap(), 4096);
        assert!(decode_address("&8000").is_err());
        assert!(decode_address("0x").is_err());
    }

    #[test]
    fn test_decode_distance() {
        assert_eq!(decode_distance(&Value::Integer(2), "w").unwrap(), 2.0);
        assert_eq!(decode_distance(&Value::from("36pt"), "w").unwrap(), 0.5);
        assert_eq!(decode_distance(&Value::from("0.25"), "w").unwrap(), 0.25);
        assert!(decode_distance(&Value::from("wide"), "w").is_err());
        assert!(decode_distance(&Value::Null, "w").is_err());
    }

    #[test]
    fn test_layout_is_required() {
        let err = build("defaults:\n  fill: red\n").unwrap_err();
        assert!(err.to_string().contains("'layout' not defined"));
    }

    #[test]
    fn test_root_must_be_mapping() {
        let err = build("- a\n- b\n").unwrap_err();
        assert!(err.to_string().contains("must be a mapping"));
    }

    #[test]
    fn test_regions_sorted_by_address() {
        let map = build("layout:\n  0x8000: ROM\n  0: RAM\n  0x4000:\n").unwrap();
        let addresses: Vec<u64> = map.regions().iter().map(|r| r.address).collect();
        assert_eq!(addresses, vec![0, 0x4000, 0x8000]);
        assert_eq!(map.regions()[0].labels()[0].text, "RAM");
        assert!(map.regions()[1].labels().is_empty());
        assert_eq!(map.regions()[2].size, 32 * 1024);
    }

    #[test]
    fn test_bad_layout_address() {
        let err = build("layout:\n  ROM: 1\n").unwrap_err();
        assert!(err.to_string().contains("Layout address 'ROM'"));
    }

    #[test]
    fn test_region_mapping() {
        let text = "\
defaults:
  fill: '#eee'
  colour: blue
layout:
  0x1000:
    size: 0x800
    outline: red
    outline_width: 1pt
    label: Stack
    labels:
      - Top
      - label: Limit
        position: er,ib
        colour: green
";
        let map = build(text).unwrap();
        let region = &map.regions()[0];
        assert_eq!(region.size, 0x800);
        assert_eq!(region.fill.as_deref(), Some("#eee"));
        assert_eq!(region.outline.as_deref(), Some("red"));
        assert!((region.outline_width - 1.0 / 72.0).abs() < 1e-12);

        // `Top` is replaced by `Stack` at the default position
        let labels = region.labels();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].text, "Stack");
        assert_eq!(labels[0].colour.as_deref(), Some("blue"));
        assert_eq!(labels[1].text, "Limit");
        assert_eq!(labels[1].position.x, XPosition::ExternalRight);
        assert_eq!(labels[1].colour.as_deref(), Some("green"));
    }

    #[test]
    fn test_labels_by_position() {
        let text = "\
layout:
  0:
    labels:
      tl: Vectors
      br:
        label: 256 bytes
";
        let map = build(text).unwrap();
        let labels = map.regions()[0].labels();
        assert_eq!(labels[0].position, LabelPosition::parse("tl").unwrap());
        assert_eq!(labels[1].text, "256 bytes");
        assert_eq!(labels[1].position.y, YPosition::InsideBottom);
    }

    #[test]
    fn test_junction_overrides() {
        let text = "\
layout:
  0x0000:
    size: 0x1000
  0x1000:
    size: 0x1000
    junction_low: dashed
    junction_high: ticks
  0x2000:
    size: 0x1000
";
        let map = build(text).unwrap();
        assert_eq!(map.regions()[0].outline_upper, JunctionStyle::None);
        assert_eq!(map.regions()[1].outline_lower, JunctionStyle::Dashed);
        assert_eq!(map.regions()[1].outline_upper, JunctionStyle::Ticks);
        assert_eq!(map.regions()[2].outline_lower, JunctionStyle::None);
    }

    #[test]
    fn test_unknown_junction_style() {
        let err = build("layout:\n  0:\n    junction_low: wavy\n").unwrap_err();
        assert!(err.to_string().contains("junction_low"));
    }

    #[test]
    fn test_defaults_section() {
        let text = "\
defaults:
  unit_size: 0x1000
  unit_height: 18pt
  region_width: 3
  background: '#000'
  address_format: acorn
  size_format: si
  fontname: Courier
  position: t
layout:
  0: Zero
";
        let map = build(text).unwrap();
        assert_eq!(map.unit_size, 0x1000);
        assert_eq!(map.unit_height, 0.25);
        assert_eq!(map.region_width, 3.0);
        assert_eq!(map.background, "#000");
        assert_eq!(map.format_address(0x1F00), "&1F00");
        assert_eq!(map.format_size(0x1000), "4 KiB");
        assert_eq!(map.font_family.as_deref(), Some("Courier"));
        assert_eq!(map.regions()[0].labels()[0].position.y, YPosition::InsideTop);
    }

    #[test]
    fn test_unknown_formatter() {
        let err = build("defaults:\n  address_format: roman\nlayout:\n  0: a\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("roman"));
        assert!(message.contains("acorn"));
    }

    #[test]
    fn test_automatic_sections() {
        let text = "\
layout:
  0x0000:
    size: 0x1000
  0x8000:
    size: 0x1000
automatic:
  discontinuities:
    style: cut-out
  addresses:
    end: true
    omit: 0x8000
";
        let map = build(text).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(
            map.regions()[1].discontinuity_style(),
            Some(DiscontinuityStyle::CutOut)
        );
        let last: Vec<&str> = map.regions()[2]
            .labels()
            .iter()
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(last, vec!["0x9000"]);
    }

    #[test]
    fn test_automatic_disabled() {
        let text = "\
layout:
  0: a
  0x10000: b
automatic:
  discontinuities: false
  addresses:
    enable: false
";
        let map = build(text).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.regions()[0].labels().len(), 1);
    }
}

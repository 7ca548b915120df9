//! The memory map: an ordered list of regions plus layout parameters
//!
//! Distances are in inches. Region heights scale with size in units of
//! `unit_size` bytes, clamped so tiny and huge regions stay readable.

use tracing::{debug, trace};

use crate::core::{DiagramError, DiscontinuityStyle, JunctionStyle, LabelPosition};
use crate::core::{XPosition, YPosition};

use super::formatter::ValueFormatter;
use super::label::RegionLabel;
use super::region::Region;

/// Which side of the map automatic address labels go on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    Left,
    #[default]
    Right,
}

impl Side {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Side::Left),
            "right" => Some(Side::Right),
            _ => None,
        }
    }

    /// Placement against the region edge, and far from it
    fn positions(&self) -> (XPosition, XPosition) {
        match self {
            Side::Left => (XPosition::ExternalLeft, XPosition::ExternalLeftFar),
            Side::Right => (XPosition::ExternalRight, XPosition::ExternalRightFar),
        }
    }
}

/// Presentation of automatically inserted discontinuities
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscontinuityOptions {
    pub fill: Option<String>,
    /// Outline colour; when unset the region keeps the default outline
    pub outline: Option<String>,
    /// Only applied together with `outline`
    pub outline_width: Option<f64>,
    pub style: DiscontinuityStyle,
}

/// Which automatic address labels to add
#[derive(Debug, Clone, PartialEq)]
pub struct AddressLabelOptions {
    /// Start address of every region
    pub start: bool,
    /// End address of every region
    pub end: bool,
    /// Size of every region
    pub size: bool,
    pub side: Side,
    /// End addresses are one past the region rather than its last byte
    pub end_exclusive: bool,
    /// Start address of the lowest region, even when `start` is off
    pub initial_start: bool,
    /// End address of the highest region, even when `end` is off
    pub final_end: bool,
    /// Addresses that never get a label
    pub omit: Vec<u64>,
    pub colour: Option<String>,
    pub colour_size: Option<String>,
    pub fontname_address: Option<String>,
}

impl Default for AddressLabelOptions {
    fn default() -> Self {
        Self {
            start: true,
            end: false,
            size: false,
            side: Side::Right,
            end_exclusive: true,
            initial_start: false,
            final_end: false,
            omit: Vec::new(),
            colour: None,
            colour_size: None,
            fontname_address: None,
        }
    }
}

/// A memory map diagram
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryMap {
    regions: Vec<Region>,
    pub address_formatter: ValueFormatter,
    /// Falls back to the address formatter when unset
    pub size_formatter: Option<ValueFormatter>,

    // Layout parameters
    pub unit_height: f64,
    pub unit_size: u64,
    pub min_units: f64,
    pub region_min_height: f64,
    pub region_max_height: f64,
    discontinuity_height: Option<f64>,
    pub region_width: f64,

    // Render parameters
    pub background: String,
    pub padding: f64,
    pub font_family: Option<String>,
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMap {
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
            address_formatter: ValueFormatter::C,
            size_formatter: None,
            unit_height: 0.2,
            unit_size: 32 * 1024,
            min_units: 1.0,
            region_min_height: 0.625,
            region_max_height: 2.0,
            discontinuity_height: None,
            region_width: 2.0,
            background: "#fff".to_string(),
            padding: 0.125,
            font_family: None,
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Height of a discontinuity; 1.5 times the minimum region height unless set
    pub fn discontinuity_height(&self) -> f64 {
        self.discontinuity_height
            .unwrap_or(self.region_min_height * 1.5)
    }

    pub fn set_discontinuity_height(&mut self, height: Option<f64>) {
        self.discontinuity_height = height;
    }

    pub fn add_region(&mut self, region: Region) {
        trace!(address = region.address, size = region.size, "Adding region");
        self.regions.push(region);
    }

    /// Insert before `index`; negative indices count from the end and
    /// indices past the end append
    pub fn insert_region(&mut self, index: isize, region: Region) {
        let len = self.regions.len() as isize;
        if index >= len {
            self.add_region(region);
            return;
        }
        let index = if index < 0 { (len + index).max(0) } else { index };
        self.regions.insert(index as usize, region);
    }

    pub fn find_region(&self, address: u64) -> Result<&Region, DiagramError> {
        self.regions
            .iter()
            .find(|region| region.address == address)
            .ok_or_else(|| self.missing_region(address))
    }

    pub fn find_region_mut(&mut self, address: u64) -> Result<&mut Region, DiagramError> {
        let error = self.missing_region(address);
        self.regions
            .iter_mut()
            .find(|region| region.address == address)
            .ok_or(error)
    }

    fn missing_region(&self, address: u64) -> DiagramError {
        DiagramError::config_error(format!(
            "Cannot find region for address {}",
            self.format_address(address)
        ))
    }

    /// Sort regions by address, keeping the order of equal addresses
    pub fn sort(&mut self) {
        self.regions.sort_by_key(|region| region.address);
    }

    pub fn format_address(&self, address: u64) -> String {
        self.address_formatter.format(address)
    }

    pub fn format_size(&self, size: u64) -> String {
        self.size_formatter
            .unwrap_or(self.address_formatter)
            .format(size)
    }

    /// Drawn height of a region in inches
    pub fn region_height(&self, region: &Region) -> f64 {
        let units = (region.size as f64 / self.unit_size.max(1) as f64).max(self.min_units);
        let height = (units * self.unit_height)
            .max(self.region_min_height)
            .min(self.region_max_height);
        if region.is_discontinuity() {
            height.min(self.discontinuity_height())
        } else {
            height
        }
    }

    /// Insert a discontinuity into every gap between consecutive regions
    pub fn add_discontinuities(&mut self, options: &DiscontinuityOptions) {
        let before = self.regions.len();
        let mut regions = Vec::with_capacity(before * 2);
        let mut last_end: Option<u64> = None;

        for region in self.regions.drain(..) {
            if let Some(end) = last_end.filter(|&end| end < region.address) {
                let mut gap = Region::discontinuity(end, region.address - end, options.style);
                gap.fill = options.fill.clone();
                if let Some(outline) = &options.outline {
                    gap.outline = Some(outline.clone());
                    if let Some(width) = options.outline_width {
                        gap.outline_width = width;
                    }
                }
                trace!(address = gap.address, size = gap.size, "Inserted discontinuity");
                regions.push(gap);
            }
            last_end = Some(region.end());
            regions.push(region);
        }

        debug!(
            added = regions.len() - before,
            "Discontinuities added"
        );
        self.regions = regions;
    }

    /// Add start, end and size labels beside each region
    pub fn add_address_labels(&mut self, options: &AddressLabelOptions) {
        let (edge, far) = options.side.positions();
        let both = options.start && options.end;
        let count = self.regions.len();
        let mut labels = Vec::with_capacity(count);

        for (index, region) in self.regions.iter().enumerate() {
            let initial = index == 0;
            let last = index + 1 == count;
            let mut region_labels = Vec::new();

            if (options.start || (initial && options.initial_start))
                && !options.omit.contains(&region.address)
            {
                let y = if initial || both {
                    YPosition::InsideBottom
                } else {
                    YPosition::JunctionBottom
                };
                region_labels.push(
                    RegionLabel::new(self.format_address(region.address), LabelPosition::new(edge, y))
                        .with_colour(options.colour.clone())
                        .with_fontname(options.fontname_address.clone()),
                );
            }

            let end = region.end();
            if (options.end || (last && options.final_end)) && !options.omit.contains(&end) {
                let shown = if options.end_exclusive {
                    end
                } else {
                    end.saturating_sub(1)
                };
                let y = if last || both {
                    YPosition::InsideTop
                } else {
                    YPosition::JunctionTop
                };
                region_labels.push(
                    RegionLabel::new(self.format_address(shown), LabelPosition::new(edge, y))
                        .with_colour(options.colour.clone())
                        .with_fontname(options.fontname_address.clone()),
                );
            }

            if options.size {
                // Against the edge when there are no address labels in the way
                let x = if options.start || options.end { far } else { edge };
                region_labels.push(
                    RegionLabel::new(
                        self.format_size(region.size),
                        LabelPosition::new(x, YPosition::InsideCentre),
                    )
                    .with_colour(options.colour_size.clone()),
                );
            }
            labels.push(region_labels);
        }

        for (region, region_labels) in self.regions.iter_mut().zip(labels) {
            for label in region_labels {
                region.add_label(label);
            }
        }
        debug!(region_count = count, "Address labels added");
    }

    /// Indices of the region at `address`, or of all regions when `None`
    fn matching(&self, address: Option<u64>) -> Result<Vec<usize>, DiagramError> {
        match address {
            None => Ok((0..self.regions.len()).collect()),
            Some(address) => self
                .regions
                .iter()
                .position(|region| region.address == address)
                .map(|index| vec![index])
                .ok_or_else(|| self.missing_region(address)),
        }
    }

    pub fn set_fill_colour(
        &mut self,
        address: Option<u64>,
        colour: Option<String>,
    ) -> Result<(), DiagramError> {
        for index in self.matching(address)? {
            self.regions[index].fill = colour.clone();
        }
        Ok(())
    }

    pub fn set_outline_colour(
        &mut self,
        address: Option<u64>,
        colour: Option<String>,
    ) -> Result<(), DiagramError> {
        for index in self.matching(address)? {
            self.regions[index].outline = colour.clone();
        }
        Ok(())
    }

    /// Change the lower boundary; the region below gets a matching upper
    /// boundary (`solid` if solid, otherwise `none`)
    pub fn set_outline_lower(
        &mut self,
        address: Option<u64>,
        style: JunctionStyle,
    ) -> Result<(), DiagramError> {
        let facing = facing_style(style);
        for index in self.matching(address)? {
            self.regions[index].outline_lower = style;
            if index > 0 {
                self.regions[index - 1].outline_upper = facing;
            }
        }
        Ok(())
    }

    /// Change the upper boundary; the region above gets a matching lower
    /// boundary (`solid` if solid, otherwise `none`)
    pub fn set_outline_upper(
        &mut self,
        address: Option<u64>,
        style: JunctionStyle,
    ) -> Result<(), DiagramError> {
        let facing = facing_style(style);
        for index in self.matching(address)? {
            self.regions[index].outline_upper = style;
            if index + 1 < self.regions.len() {
                self.regions[index + 1].outline_lower = facing;
            }
        }
        Ok(())
    }
}

fn facing_style(style: JunctionStyle) -> JunctionStyle {
    if style == JunctionStyle::Solid {
        JunctionStyle::Solid
    } else {
        JunctionStyle::None
    }
}

//! Address and size formatting

use std::fmt;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// How addresses and sizes are written in labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormatter {
    /// `7936`
    Decimal,
    /// `&1F00`
    Acorn,
    /// `$1F00`
    Commodore,
    /// `0x1F00`
    #[default]
    C,
    /// `0x0000 1F00`
    C8,
    /// Binary units, whole multiples: `1 MiB`, `32 KiB + 12 B`
    Si,
    /// Binary units in quarters: `1.25 MiB`
    Si2,
    /// Rounded sizes: `3 MB`
    Human,
}

impl ValueFormatter {
    /// Names accepted by [`ValueFormatter::from_name`]
    pub fn names() -> &'static [&'static str] {
        &["acorn", "c", "c8", "commodore", "decimal", "human", "si", "si2"]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "decimal" => Some(ValueFormatter::Decimal),
            "acorn" => Some(ValueFormatter::Acorn),
            "commodore" => Some(ValueFormatter::Commodore),
            "c" => Some(ValueFormatter::C),
            "c8" => Some(ValueFormatter::C8),
            "si" => Some(ValueFormatter::Si),
            "si2" => Some(ValueFormatter::Si2),
            "human" => Some(ValueFormatter::Human),
            _ => None,
        }
    }

    pub fn format(&self, value: u64) -> String {
        match self {
            ValueFormatter::Decimal => value.to_string(),
            ValueFormatter::Acorn => format!("&{:X}", value),
            ValueFormatter::Commodore => format!("${:X}", value),
            ValueFormatter::C => format!("0x{:X}", value),
            ValueFormatter::C8 => format!("0x{:04X} {:04X}", value >> 16, value & 0xFFFF),
            ValueFormatter::Si => binary_units(value, 1),
            ValueFormatter::Si2 => binary_units(value, 4),
            ValueFormatter::Human => human(value),
        }
    }
}

impl fmt::Display for ValueFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueFormatter::Decimal => "decimal",
            ValueFormatter::Acorn => "acorn",
            ValueFormatter::Commodore => "commodore",
            ValueFormatter::C => "c",
            ValueFormatter::C8 => "c8",
            ValueFormatter::Si => "si",
            ValueFormatter::Si2 => "si2",
            ValueFormatter::Human => "human",
        };
        write!(f, "{}", name)
    }
}

/// GiB and MiB may be written in fractions of `1 / accuracy`; anything not a
/// whole KiB is split into a rounded part and a byte remainder
fn binary_units(size: u64, accuracy: u64) -> String {
    if size == 0 {
        return "0 B".to_string();
    }
    if size % (GIB / accuracy) == 0 {
        return format!("{} GiB", size as f64 / GIB as f64);
    }
    if size % (MIB / accuracy) == 0 {
        return format!("{} MiB", size as f64 / MIB as f64);
    }
    if size % KIB == 0 {
        return format!("{} KiB", size / KIB);
    }
    if size < KIB {
        return format!("{} B", size);
    }
    let remainder = size % KIB;
    format!("{} + {} B", binary_units(size - remainder, accuracy), remainder)
}

fn human(size: u64) -> String {
    if size == 0 {
        "0 B".to_string()
    } else if size > 2 * GIB {
        format!("{:.0} GB", size as f64 / GIB as f64)
    } else if size > 2 * MIB {
        format!("{:.0} MB", size as f64 / MIB as f64)
    } else if size > 2 * KIB {
        format!("{:.0} KB", size as f64 / KIB as f64)
    } else {
        format!("{} Bytes", size)
    }
}

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid color: {0:?}")]
    Invalid(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn r(&self) -> u8 {
        self.r
    }

    pub fn g(&self) -> u8 {
        self.g
    }

    pub fn b(&self) -> u8 {
        self.b
    }

    /// Accepts `#rrggbb`, `#rgb`, a preset family name or a CSS color
    /// keyword. Preset names shadow the CSS keywords they share.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorError::Invalid(input.to_string()));
        }
        PRESETS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(trimmed))
            .map(|p| p.background)
            .or_else(|| {
                CSS_NAMES
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
                    .map(|(_, color)| *color)
            })
            .ok_or_else(|| ColorError::Invalid(input.to_string()))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn parse_hex(hex: &str) -> Option<RgbColor> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some(RgbColor::new(
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        )),
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
            Some(RgbColor::new(digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for RgbColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RgbColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RgbColor> for String {
    fn from(color: RgbColor) -> Self {
        color.to_hex()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    Yellow,
    Green,
    Blue,
    Pink,
    Orange,
    Purple,
}

struct Preset {
    name: &'static str,
    family: Family,
    background: RgbColor,
    foreground: RgbColor,
    // other shades recognised as the same family
    shades: &'static [RgbColor],
}

const fn rgb(r: u8, g: u8, b: u8) -> RgbColor {
    RgbColor::new(r, g, b)
}

const PRESETS: &[Preset] = &[
    Preset {
        name: "yellow",
        family: Family::Yellow,
        background: rgb(0xff, 0xf1, 0x76),
        foreground: rgb(0x7a, 0x4f, 0x01),
        shades: &[
            rgb(0xff, 0xeb, 0x3b),
            rgb(0xff, 0xff, 0x00),
            rgb(0xfe, 0xf0, 0x8a),
            rgb(0xfd, 0xe0, 0x47),
        ],
    },
    Preset {
        name: "green",
        family: Family::Green,
        background: rgb(0xa5, 0xd6, 0xa7),
        foreground: rgb(0x1b, 0x5e, 0x20),
        shades: &[
            rgb(0xc5, 0xe1, 0xa5),
            rgb(0x00, 0xff, 0x00),
            rgb(0xbb, 0xf7, 0xd0),
            rgb(0x86, 0xef, 0xac),
        ],
    },
    Preset {
        name: "blue",
        family: Family::Blue,
        background: rgb(0x90, 0xca, 0xf9),
        foreground: rgb(0x0d, 0x47, 0xa1),
        shades: &[
            rgb(0x81, 0xd4, 0xfa),
            rgb(0xbf, 0xdb, 0xfe),
            rgb(0x93, 0xc5, 0xfd),
            rgb(0xad, 0xd8, 0xe6),
        ],
    },
    Preset {
        name: "pink",
        family: Family::Pink,
        background: rgb(0xf4, 0x8f, 0xb1),
        foreground: rgb(0x88, 0x0e, 0x4f),
        shades: &[
            rgb(0xf8, 0xbb, 0xd0),
            rgb(0xfb, 0xcf, 0xe8),
            rgb(0xf9, 0xa8, 0xd4),
            rgb(0xff, 0xc0, 0xcb),
        ],
    },
    Preset {
        name: "orange",
        family: Family::Orange,
        background: rgb(0xff, 0xcc, 0x80),
        foreground: rgb(0x7c, 0x2d, 0x12),
        shades: &[
            rgb(0xff, 0xb7, 0x4d),
            rgb(0xfe, 0xd7, 0xaa),
            rgb(0xfd, 0xba, 0x74),
            rgb(0xff, 0xa5, 0x00),
        ],
    },
    Preset {
        name: "purple",
        family: Family::Purple,
        background: rgb(0xce, 0x93, 0xd8),
        foreground: rgb(0x4a, 0x14, 0x8c),
        shades: &[
            rgb(0xe1, 0xbe, 0xe7),
            rgb(0xe9, 0xd5, 0xff),
            rgb(0xd8, 0xb4, 0xfe),
            rgb(0xdd, 0xa0, 0xdd),
        ],
    },
];

const CSS_NAMES: &[(&str, RgbColor)] = &[
    ("aqua", rgb(0x00, 0xff, 0xff)),
    ("black", rgb(0x00, 0x00, 0x00)),
    ("brown", rgb(0xa5, 0x2a, 0x2a)),
    ("coral", rgb(0xff, 0x7f, 0x50)),
    ("cyan", rgb(0x00, 0xff, 0xff)),
    ("fuchsia", rgb(0xff, 0x00, 0xff)),
    ("gold", rgb(0xff, 0xd7, 0x00)),
    ("gray", rgb(0x80, 0x80, 0x80)),
    ("grey", rgb(0x80, 0x80, 0x80)),
    ("indigo", rgb(0x4b, 0x00, 0x82)),
    ("khaki", rgb(0xf0, 0xe6, 0x8c)),
    ("lavender", rgb(0xe6, 0xe6, 0xfa)),
    ("lightblue", rgb(0xad, 0xd8, 0xe6)),
    ("lightgreen", rgb(0x90, 0xee, 0x90)),
    ("lime", rgb(0x00, 0xff, 0x00)),
    ("magenta", rgb(0xff, 0x00, 0xff)),
    ("maroon", rgb(0x80, 0x00, 0x00)),
    ("navy", rgb(0x00, 0x00, 0x80)),
    ("olive", rgb(0x80, 0x80, 0x00)),
    ("red", rgb(0xff, 0x00, 0x00)),
    ("salmon", rgb(0xfa, 0x80, 0x72)),
    ("silver", rgb(0xc0, 0xc0, 0xc0)),
    ("teal", rgb(0x00, 0x80, 0x80)),
    ("turquoise", rgb(0x40, 0xe0, 0xd0)),
    ("violet", rgb(0xee, 0x82, 0xee)),
    ("white", rgb(0xff, 0xff, 0xff)),
];

/// Foreground used on any background outside the preset families.
pub const NEUTRAL_FOREGROUND: RgbColor = rgb(0x1f, 0x29, 0x33);

pub fn family_of(color: RgbColor) -> Option<Family> {
    PRESETS
        .iter()
        .find(|p| p.background == color || p.shades.contains(&color))
        .map(|p| p.family)
}

/// Foreground to draw on top of a highlight background.
pub fn contrast(background: RgbColor) -> RgbColor {
    family_of(background)
        .and_then(|family| PRESETS.iter().find(|p| p.family == family))
        .map(|p| p.foreground)
        .unwrap_or(NEUTRAL_FOREGROUND)
}

/// Named highlight colors offered to the user, in display order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<(String, RgbColor)>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: PRESETS
                .iter()
                .map(|p| (p.name.to_string(), p.background))
                .collect(),
        }
    }
}

impl Palette {
    /// Adds an entry, replacing the color of an existing entry with the same name.
    pub fn insert(&mut self, name: &str, color: RgbColor) {
        let name = name.trim().to_ascii_lowercase();
        if let Some(existing) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = color;
        } else {
            self.entries.push((name, color));
        }
    }

    pub fn get(&self, name: &str) -> Option<RgbColor> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, c)| *c)
    }

    pub fn nth(&self, index: usize) -> Option<(&str, RgbColor)> {
        self.entries.get(index).map(|(n, c)| (n.as_str(), *c))
    }

    pub fn name_of(&self, color: RgbColor) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, c)| *c == color)
            .map(|(n, _)| n.as_str())
    }

    /// Palette names win over hex parsing, so a configured "yellow" shadows the preset.
    pub fn resolve(&self, input: &str) -> Result<RgbColor, ColorError> {
        match self.get(input) {
            Some(color) => Ok(color),
            None => RgbColor::parse(input),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, RgbColor)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), *c))
    }
}

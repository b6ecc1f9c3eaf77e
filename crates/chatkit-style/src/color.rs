#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use crate::css::css_color;

/// Maximum per-channel distance for two colors to count as close.
///
/// Two colors are close when every channel differs by at most this much
/// (Chebyshev distance over R, G and B).
pub const CLOSE_CHANNEL_DISTANCE: u8 = 32;

/// RGB color (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value; the top byte is ignored.
    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        Self::new((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    #[must_use]
    pub fn luminance_u8(self) -> u8 {
        // ITU-R BT.709 luma: 0.2126 R + 0.7152 G + 0.0722 B
        let r = self.r as u32;
        let g = self.g as u32;
        let b = self.b as u32;
        let luma = 2126 * r + 7152 * g + 722 * b;
        ((luma + 5000) / 10_000) as u8
    }

    /// Whether `other` lies within [`CLOSE_CHANNEL_DISTANCE`] on every channel.
    #[must_use]
    pub fn is_close(self, other: Rgb) -> bool {
        self.r.abs_diff(other.r) <= CLOSE_CHANNEL_DISTANCE
            && self.g.abs_diff(other.g) <= CLOSE_CHANNEL_DISTANCE
            && self.b.abs_diff(other.b) <= CLOSE_CHANNEL_DISTANCE
    }

    /// Parse `RRGGBB` or the compact `RGB` form, with or without a leading `#`.
    ///
    /// The compact form doubles each digit, so `#363` is `#336633`.
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match digits.len() {
            6 => u32::from_str_radix(digits, 16).ok().map(Self::from_u32),
            3 => {
                let mut value = 0u32;
                for ch in digits.chars() {
                    let digit = ch.to_digit(16)?;
                    value = (value << 8) | (digit * 0x11);
                }
                Some(Self::from_u32(value))
            }
            _ => None,
        }
    }

    /// Lowercase `#rrggbb` spelling.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation between two colors, `t` clamped to `0.0..=1.0`.
    #[must_use]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }

    /// Convert from HSV; `hue` in turns (wrapped into `0.0..1.0`), the
    /// others clamped to `0.0..=1.0`.
    #[must_use]
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Rgb {
        let h = hue.rem_euclid(1.0) * 6.0;
        let s = saturation.clamp(0.0, 1.0);
        let v = value.clamp(0.0, 1.0);
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match sector as u8 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        let channel = |c: f32| (c * 255.0).round() as u8;
        Rgb::new(channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s).ok_or_else(|| ColorParseError(s.to_owned()))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_hex()
    }
}

/// A string that names no known color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color: {0:?}")]
pub struct ColorParseError(pub String);

/// The 16 standard chat colors, in legacy code order (`0`-`f`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum NamedColor {
    Black = 0,
    DarkBlue = 1,
    DarkGreen = 2,
    DarkAqua = 3,
    DarkRed = 4,
    DarkPurple = 5,
    Gold = 6,
    Gray = 7,
    DarkGray = 8,
    Blue = 9,
    Green = 10,
    Aqua = 11,
    Red = 12,
    LightPurple = 13,
    Yellow = 14,
    White = 15,
}

impl NamedColor {
    pub const ALL: [NamedColor; 16] = [
        Self::Black,
        Self::DarkBlue,
        Self::DarkGreen,
        Self::DarkAqua,
        Self::DarkRed,
        Self::DarkPurple,
        Self::Gold,
        Self::Gray,
        Self::DarkGray,
        Self::Blue,
        Self::Green,
        Self::Aqua,
        Self::Red,
        Self::LightPurple,
        Self::Yellow,
        Self::White,
    ];

    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 16 {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// Tag spelling, e.g. `light_purple`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::DarkBlue => "dark_blue",
            Self::DarkGreen => "dark_green",
            Self::DarkAqua => "dark_aqua",
            Self::DarkRed => "dark_red",
            Self::DarkPurple => "dark_purple",
            Self::Gold => "gold",
            Self::Gray => "gray",
            Self::DarkGray => "dark_gray",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Aqua => "aqua",
            Self::Red => "red",
            Self::LightPurple => "light_purple",
            Self::Yellow => "yellow",
            Self::White => "white",
        }
    }

    /// Look up a color by tag name (ASCII case-insensitive, `grey` accepted).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "grey" => Some(Self::Gray),
            "dark_grey" => Some(Self::DarkGray),
            other => Self::ALL.into_iter().find(|c| c.name() == other),
        }
    }

    #[must_use]
    pub const fn rgb(self) -> Rgb {
        NAMED_PALETTE[self as usize]
    }
}

impl fmt::Display for NamedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const NAMED_PALETTE: [Rgb; 16] = [
    Rgb::from_u32(0x000000), // black
    Rgb::from_u32(0x0000aa), // dark_blue
    Rgb::from_u32(0x00aa00), // dark_green
    Rgb::from_u32(0x00aaaa), // dark_aqua
    Rgb::from_u32(0xaa0000), // dark_red
    Rgb::from_u32(0xaa00aa), // dark_purple
    Rgb::from_u32(0xffaa00), // gold
    Rgb::from_u32(0xaaaaaa), // gray
    Rgb::from_u32(0x555555), // dark_gray
    Rgb::from_u32(0x5555ff), // blue
    Rgb::from_u32(0x55ff55), // green
    Rgb::from_u32(0x55ffff), // aqua
    Rgb::from_u32(0xff5555), // red
    Rgb::from_u32(0xff55ff), // light_purple
    Rgb::from_u32(0xffff55), // yellow
    Rgb::from_u32(0xffffff), // white
];

/// A text color: one of the standard names or an arbitrary RGB value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum Color {
    Named(NamedColor),
    Rgb(Rgb),
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb(Rgb::new(r, g, b))
    }

    #[must_use]
    pub const fn to_rgb(self) -> Rgb {
        match self {
            Self::Named(named) => named.rgb(),
            Self::Rgb(rgb) => rgb,
        }
    }

    #[must_use]
    pub fn luminance_u8(self) -> u8 {
        self.to_rgb().luminance_u8()
    }

    /// Resolve a color argument as written in markup.
    ///
    /// `#hex` gives an RGB color, a standard name gives [`Color::Named`], and
    /// any other CSS keyword gives its RGB value. `css:name` forces the CSS
    /// table, so `css:aqua` is `#00ffff` rather than the standard aqua.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        if text.starts_with('#') {
            return Rgb::from_hex(text).map(Self::Rgb);
        }
        if let Some(name) = text.strip_prefix("css:") {
            return css_color(name).map(Self::Rgb);
        }
        NamedColor::from_name(text)
            .map(Self::Named)
            .or_else(|| css_color(text).map(Self::Rgb))
    }
}

impl From<NamedColor> for Color {
    fn from(named: NamedColor) -> Self {
        Self::Named(named)
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::Rgb(rgb)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(named) => named.fmt(f),
            Self::Rgb(rgb) => rgb.fmt(f),
        }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s).ok_or_else(|| ColorParseError(s.to_owned()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

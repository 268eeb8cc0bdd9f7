use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::ParseColorError;

/// An 8-bit RGB color. Compared by exact channel equality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB`, with or without a leading `#`.
    pub fn from_hex(s: &str) -> Result<Self, ParseColorError> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(ParseColorError::NonAscii);
        }
        if hex.len() != 6 {
            return Err(ParseColorError::InvalidLength(hex.len()));
        }
        let r = u8::from_str_radix(&hex[0..2], 16)?;
        let g = u8::from_str_radix(&hex[2..4], 16)?;
        let b = u8::from_str_radix(&hex[4..6], 16)?;
        Ok(Self::new(r, g, b))
    }

    /// Uppercase `RRGGBB` without the `#`.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Squared Euclidean distance in RGB space.
    #[inline(always)]
    pub fn distance_squared(self, other: Color) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Index of the closest entry in `candidates`, first one wins on ties.
    pub fn nearest_in(self, candidates: &[Color]) -> Option<usize> {
        let mut best = None;
        let mut best_dist = u32::MAX;
        for (idx, c) in candidates.iter().enumerate() {
            let d = self.distance_squared(*c);
            if d < best_dist {
                best_dist = d;
                best = Some(idx);
            }
        }
        best
    }

    /// Normalized float color, the form the clustering works in.
    pub fn to_srgb(self) -> Srgb<f32> {
        Srgb::new(self.r, self.g, self.b).into_format()
    }

    /// Rounds each channel back to 8 bits.
    pub fn from_srgb(c: Srgb<f32>) -> Self {
        let c: Srgb<u8> = c.into_format();
        Self::new(c.red, c.green, c.blue)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Color> for [u8; 3] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b]
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(p: image::Rgb<u8>) -> Self {
        Self::from(p.0)
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(c: Color) -> Self {
        image::Rgb([c.r, c.g, c.b])
    }
}

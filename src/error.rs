use std::num::ParseIntError;

use thiserror::Error;

use crate::color::Color;

/// Errors raised at the boundary of every transform. Nothing is processed
/// once one of these is returned, so callers never see a partial raster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecolorError {
    #[error("cluster count must be between 1 and {max}, got {k}")]
    InvalidClusterCount { k: u32, max: u32 },

    #[error("pixel factor must be between 1 and {max}, got {factor}")]
    InvalidPixelFactor { factor: u32, max: u32 },

    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch { len: usize, width: u32, height: u32 },

    #[error("buffer of {len} bytes is not a whole number of {stride}-byte pixels")]
    RaggedBuffer { len: usize, stride: usize },

    #[error("fixed palette cannot be empty")]
    EmptyPalette,

    #[error("color {0} is not in the current palette")]
    UnknownColor(Color),

    #[error("palette index {index} out of range for {len} colors")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("mapping is not invertible: {0} is the replacement of more than one color")]
    NotInvertible(Color),

    #[error("invalid color: {0}")]
    ParseColor(#[from] ParseColorError),
}

/// Failure to read a `RRGGBB` hex string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    #[error("hex color must be 6 characters, got {0}")]
    InvalidLength(usize),

    #[error("hex color contains non-ASCII characters")]
    NonAscii,

    #[error("invalid hex digit: {0}")]
    InvalidHex(#[from] ParseIntError),
}

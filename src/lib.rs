//! Image recoloring core: k-means color quantization, pixelation and
//! palette-based hue remapping over decoded RGB rasters.
//!
//! A [`Pipeline`] runs the enabled stages in a fixed order (quantize, then
//! pixelate, then remap) and keeps the palette found by the last quantization
//! together with the user's edits to it:
//!
//! ```
//! use image_recolor_wasm::{Color, Pipeline, Raster, RenderOptions};
//!
//! let red = Color::new(255, 0, 0);
//! let green = Color::new(0, 255, 0);
//! let raster = Raster::from_fn(4, 4, |x, y| if (x + y) % 2 == 0 { red } else { green });
//!
//! let mut pipeline = Pipeline::new();
//! let options = RenderOptions { quantize: true, k: 2, ..RenderOptions::default() };
//! pipeline.render(&raster, &options).unwrap();
//! pipeline.recolor(red, Color::new(0, 0, 255)).unwrap();
//!
//! let options = RenderOptions { remap_hues: true, ..options };
//! let out = pipeline.render(&raster, &options).unwrap();
//! assert_eq!(out.get(0, 0), Some(Color::new(0, 0, 255)));
//! ```
//!
//! Decoding and display are left to the caller; the `wasm` bindings and the
//! `recolor-cli` binary are thin shells around this API.

mod color;
mod error;
mod hues;
mod pipeline;
mod pixelate;
mod quantize;
mod raster;
mod wasm;

pub use color::Color;
pub use error::{ParseColorError, RecolorError};
pub use hues::{Palette, PaletteMapping, extract, remap};
pub use pipeline::{Pipeline, RenderOptions};
pub use pixelate::pixelate;
pub use quantize::{MAX_CLUSTERS, QuantizationResult, Quantizer, map_to_palette, quantize};
pub use raster::Raster;
pub use wasm::Recolorer;

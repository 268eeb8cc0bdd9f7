use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::color::Color;
use crate::error::RecolorError;
use crate::hues::{Palette, PaletteMapping, remap};
use crate::pixelate::{check_factor, pixelate};
use crate::quantize::{Quantizer, check_cluster_count, map_to_palette};
use crate::raster::Raster;

/// Which stages run and with what parameters. Disabled stages pass the
/// raster through, and their parameters are not validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub quantize: bool,
    pub k: u32,
    pub pixelate: bool,
    pub pixel_factor: u32,
    pub stretch: bool,
    pub remap_hues: bool,
    /// Seed for the k-means restarts.
    pub seed: u64,
    /// Quantize against these colors instead of clustering.
    pub fixed_palette: Option<Vec<Color>>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            quantize: false,
            k: 8,
            pixelate: false,
            pixel_factor: 64,
            stretch: false,
            remap_hues: false,
            seed: 0,
            fixed_palette: None,
        }
    }
}

impl RenderOptions {
    pub fn validate(&self, raster: &Raster) -> Result<(), RecolorError> {
        if self.quantize {
            match &self.fixed_palette {
                Some(colors) if colors.is_empty() => return Err(RecolorError::EmptyPalette),
                Some(_) => {}
                None => check_cluster_count(self.k)?,
            }
        }
        if self.pixelate {
            check_factor(self.pixel_factor, raster.width(), raster.height())?;
        }
        Ok(())
    }
}

/// One recoloring session: owns the palette discovered by the last
/// quantization and the user's edits to it.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    mapping: PaletteMapping,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs quantize, pixelate and remap in that order.
    ///
    /// Quantizing publishes the palette of its output. If it differs from the
    /// palette already held, the mapping starts over as the identity. Session
    /// state only changes once every stage has succeeded.
    pub fn render(&mut self, raster: &Raster, options: &RenderOptions) -> Result<Raster, RecolorError> {
        options.validate(raster)?;
        let (width, height) = raster.dimensions();
        debug!(width, height, ?options, "render");

        let (mut image, published) = if options.quantize {
            let (out, palette) = match &options.fixed_palette {
                Some(colors) => map_to_palette(raster, colors)?,
                None => Quantizer::new(options.k)?
                    .with_seed(options.seed)
                    .quantize(raster)?,
            };
            debug!(colors = palette.len(), "quantized");
            (out, Some(palette))
        } else {
            (raster.clone(), None)
        };

        let fresh = published
            .filter(|p| p != self.mapping.palette())
            .map(PaletteMapping::identity);

        if options.pixelate {
            image = pixelate(&image, options.pixel_factor, options.stretch)?;
        }

        if options.remap_hues {
            let mapping = fresh.as_ref().unwrap_or(&self.mapping);
            image = remap(&image, mapping);
        }

        if let Some(mapping) = fresh {
            info!(colors = mapping.len(), "palette republished, mapping reset");
            self.mapping = mapping;
        }
        Ok(image)
    }

    /// Palette from the most recent quantization. Empty before the first one.
    pub fn palette(&self) -> &Palette {
        self.mapping.palette()
    }

    pub fn mapping(&self) -> &PaletteMapping {
        &self.mapping
    }

    /// Record that `original` should be drawn as `replacement` from now on.
    pub fn recolor(&mut self, original: Color, replacement: Color) -> Result<(), RecolorError> {
        self.mapping.set(original, replacement)?;
        debug!(%original, %replacement, "recolor");
        Ok(())
    }

    pub fn recolor_index(&mut self, index: usize, replacement: Color) -> Result<(), RecolorError> {
        self.mapping.set_index(index, replacement)
    }

    pub fn reset_mapping(&mut self) {
        self.mapping.reset();
    }
}

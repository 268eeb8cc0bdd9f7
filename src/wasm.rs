use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::color::Color;
use crate::error::RecolorError;
use crate::hues::Palette;
use crate::pipeline::{Pipeline, RenderOptions};
use crate::raster::Raster;

fn js_err(e: RecolorError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn palette_array(palette: &Palette) -> Array {
    let out = Array::new();
    for hex in palette.to_hex() {
        out.push(&JsValue::from_str(&hex));
    }
    out
}

/// Browser-facing recoloring session. The page feeds it canvas `ImageData`
/// bytes and palette edits; it keeps the palette between renders.
#[wasm_bindgen]
#[derive(Default)]
pub struct Recolorer {
    pipeline: Pipeline,
    options: RenderOptions,
}

#[wasm_bindgen]
impl Recolorer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Recolorer {
        Recolorer::default()
    }

    /// Enable k-means with `k` clusters, or disable quantization.
    pub fn set_quantize(&mut self, enabled: bool, k: u32) {
        self.options.quantize = enabled;
        self.options.k = k;
        self.options.fixed_palette = None;
    }

    /// Quantize against a fixed list of hex colors instead of clustering.
    pub fn set_fixed_palette(&mut self, palette: Array) -> Result<(), JsValue> {
        let mut colors = Vec::new();
        for val in palette.iter() {
            let s = val
                .as_string()
                .ok_or_else(|| JsValue::from_str("Palette values must be strings"))?;
            let color = Color::from_hex(&s).map_err(|e| js_err(e.into()))?;
            colors.push(color);
        }
        self.options.quantize = true;
        self.options.fixed_palette = Some(colors);
        Ok(())
    }

    pub fn set_pixelate(&mut self, enabled: bool, factor: u32, stretch: bool) {
        self.options.pixelate = enabled;
        self.options.pixel_factor = factor;
        self.options.stretch = stretch;
    }

    pub fn set_remap_hues(&mut self, enabled: bool) {
        self.options.remap_hues = enabled;
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.options.seed = seed;
    }

    /// Render RGBA bytes. Returns `{ width, height, pixels, palette }` where
    /// `pixels` is opaque RGBA and `palette` a list of `RRGGBB` strings.
    pub fn render(&mut self, rgba: Vec<u8>, width: u32, height: u32) -> Result<Object, JsValue> {
        let raster = Raster::from_rgba_bytes(width, height, &rgba).map_err(js_err)?;
        let out = self.pipeline.render(&raster, &self.options).map_err(js_err)?;

        let pixels = Uint8Array::from(out.to_rgba_bytes().as_slice());
        let result = Object::new();
        Reflect::set(&result, &JsValue::from_str("width"), &JsValue::from(out.width()))?;
        Reflect::set(&result, &JsValue::from_str("height"), &JsValue::from(out.height()))?;
        Reflect::set(&result, &JsValue::from_str("pixels"), &pixels)?;
        Reflect::set(&result, &JsValue::from_str("palette"), &self.palette())?;
        Ok(result)
    }

    pub fn palette(&self) -> Array {
        palette_array(self.pipeline.palette())
    }

    /// Current replacement for each palette entry, in palette order.
    pub fn replacements(&self) -> Array {
        let out = Array::new();
        for (_, to) in self.pipeline.mapping().entries() {
            out.push(&JsValue::from_str(&to.to_hex()));
        }
        out
    }

    pub fn recolor(&mut self, original: &str, replacement: &str) -> Result<(), JsValue> {
        let original = Color::from_hex(original).map_err(|e| js_err(e.into()))?;
        let replacement = Color::from_hex(replacement).map_err(|e| js_err(e.into()))?;
        self.pipeline.recolor(original, replacement).map_err(js_err)
    }

    pub fn reset_mapping(&mut self) {
        self.pipeline.reset_mapping();
    }
}

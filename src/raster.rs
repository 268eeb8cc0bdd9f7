use image::RgbImage;

use crate::color::Color;
use crate::error::RecolorError;

/// Row-major grid of colors. The constructor guarantees
/// `pixels.len() == width * height`, and the buffer is never resized after.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Raster {
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> Result<Self, RecolorError> {
        if Some(pixels.len()) != area(width, height) {
            return Err(RecolorError::DimensionMismatch {
                len: pixels.len(),
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A zero-sized raster.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self::from_fn(width, height, |_, _| color)
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Color) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Packed `RGB` bytes, 3 per pixel.
    pub fn from_rgb_bytes(width: u32, height: u32, raw: &[u8]) -> Result<Self, RecolorError> {
        Self::from_packed(width, height, raw, 3)
    }

    /// Packed `RGBA` bytes, 4 per pixel. Alpha is dropped.
    pub fn from_rgba_bytes(width: u32, height: u32, raw: &[u8]) -> Result<Self, RecolorError> {
        Self::from_packed(width, height, raw, 4)
    }

    fn from_packed(width: u32, height: u32, raw: &[u8], stride: usize) -> Result<Self, RecolorError> {
        if raw.len() % stride != 0 {
            return Err(RecolorError::RaggedBuffer {
                len: raw.len(),
                stride,
            });
        }
        let pixels = raw
            .chunks_exact(stride)
            .map(|chunk| Color::new(chunk[0], chunk[1], chunk[2]))
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<Color> {
        self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// New raster of the same size with `f` applied to every pixel.
    pub fn map(&self, f: impl FnMut(Color) -> Color) -> Self {
        Self {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().copied().map(f).collect(),
        }
    }

    /// Opaque `RGBA` bytes, ready for a canvas `ImageData`.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for c in &self.pixels {
            out.extend_from_slice(&[c.r, c.g, c.b, 255]);
        }
        out
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            self.pixels[y as usize * self.width as usize + x as usize].into()
        })
    }
}

impl From<&RgbImage> for Raster {
    fn from(img: &RgbImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            pixels: img.pixels().map(|p| Color::from(*p)).collect(),
        }
    }
}

impl From<RgbImage> for Raster {
    fn from(img: RgbImage) -> Self {
        Self::from(&img)
    }
}

fn area(width: u32, height: u32) -> Option<usize> {
    (width as usize).checked_mul(height as usize)
}

use image::imageops::{self, FilterType};
use tracing::debug;

use crate::color::Color;
use crate::error::RecolorError;
use crate::raster::Raster;

/// Blocky mosaic: area-average `raster` down to a `factor × factor` grid,
/// then blow it back up with nearest-neighbour sampling.
///
/// With `stretch` the result is `width × width`, otherwise it keeps the
/// source size.
pub fn pixelate(raster: &Raster, factor: u32, stretch: bool) -> Result<Raster, RecolorError> {
    check_factor(factor, raster.width(), raster.height())?;
    if raster.is_empty() {
        return Ok(Raster::empty());
    }

    let (in_w, in_h) = raster.dimensions();
    let (out_w, out_h) = if stretch { (in_w, in_w) } else { (in_w, in_h) };
    debug!(factor, stretch, in_w, in_h, out_w, out_h, "pixelating");

    let grid = downscale_area(raster, factor, factor);
    Ok(upscale_nearest(&grid, out_w, out_h))
}

/// `factor` must be at least 1 and no larger than the longer side. An empty
/// raster only needs the lower bound.
pub fn check_factor(factor: u32, width: u32, height: u32) -> Result<(), RecolorError> {
    let max = width.max(height);
    let too_large = width > 0 && height > 0 && factor > max;
    if factor < 1 || too_large {
        return Err(RecolorError::InvalidPixelFactor { factor, max });
    }
    Ok(())
}

/// Source pixels covering each output cell along one axis, with the length
/// of the overlap as weight.
fn area_weights(in_len: u32, out_len: u32) -> Vec<Vec<(usize, f32)>> {
    let scale = in_len as f32 / out_len as f32;
    (0..out_len)
        .map(|o| {
            let start = o as f32 * scale;
            let end = (o as f32 + 1.0) * scale;
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(in_len);
            (first..last)
                .filter_map(|i| {
                    let overlap = end.min(i as f32 + 1.0) - start.max(i as f32);
                    (overlap > 1e-6).then_some((i as usize, overlap))
                })
                .collect()
        })
        .collect()
}

fn downscale_area(raster: &Raster, out_w: u32, out_h: u32) -> Raster {
    let (in_w, in_h) = raster.dimensions();

    // Fast path – no scaling required.
    if out_w == in_w && out_h == in_h {
        return raster.clone();
    }

    let pixels = raster.pixels();
    let rows = area_weights(in_h, out_h);
    let cols = area_weights(in_w, out_w);

    // --------------------------------------------------------
    // First pass: vertical reduction, kept in float
    // --------------------------------------------------------
    let mut vertical: Vec<[f32; 3]> = vec![[0.0; 3]; in_w as usize * out_h as usize];
    for (y_out, taps) in rows.iter().enumerate() {
        let total: f32 = taps.iter().map(|&(_, w)| w).sum();
        for x in 0..in_w as usize {
            let mut acc = [0.0f32; 3];
            for &(y, w) in taps {
                let c = pixels[y * in_w as usize + x];
                acc[0] += c.r as f32 * w;
                acc[1] += c.g as f32 * w;
                acc[2] += c.b as f32 * w;
            }
            vertical[y_out * in_w as usize + x] = acc.map(|v| v / total);
        }
    }

    // --------------------------------------------------------
    // Second pass: horizontal reduction
    // --------------------------------------------------------
    Raster::from_fn(out_w, out_h, |x_out, y_out| {
        let taps = &cols[x_out as usize];
        let total: f32 = taps.iter().map(|&(_, w)| w).sum();
        let mut acc = [0.0f32; 3];
        for &(x, w) in taps {
            let v = vertical[y_out as usize * in_w as usize + x];
            acc[0] += v[0] * w;
            acc[1] += v[1] * w;
            acc[2] += v[2] * w;
        }
        let [r, g, b] = acc.map(|v| (v / total).round().clamp(0.0, 255.0) as u8);
        Color::new(r, g, b)
    })
}

fn upscale_nearest(raster: &Raster, out_w: u32, out_h: u32) -> Raster {
    let img = raster.to_rgb_image();
    Raster::from(imageops::resize(&img, out_w, out_h, FilterType::Nearest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hues::extract;

    fn gray(v: u8) -> Color {
        Color::new(v, v, v)
    }

    fn noise(width: u32, height: u32) -> Raster {
        Raster::from_fn(width, height, |x, y| {
            let v = (x * 37 + y * 91 + x * y * 13) % 256;
            Color::new(v as u8, (255 - v) as u8, ((x + y) * 11 % 256) as u8)
        })
    }

    #[test]
    fn rejects_bad_factor() {
        let raster = noise(8, 5);
        assert_eq!(
            pixelate(&raster, 0, false),
            Err(RecolorError::InvalidPixelFactor { factor: 0, max: 8 })
        );
        assert!(pixelate(&raster, 9, false).is_err());
        assert!(pixelate(&raster, 8, false).is_ok());
        assert!(pixelate(&Raster::empty(), 0, false).is_err());
        assert!(pixelate(&Raster::empty(), 4, false).unwrap().is_empty());
    }

    #[test]
    fn keeps_dimensions_without_stretch() {
        let out = pixelate(&noise(12, 7), 3, false).unwrap();
        assert_eq!(out.dimensions(), (12, 7));
    }

    #[test]
    fn stretch_makes_square_of_width() {
        let out = pixelate(&noise(12, 7), 3, true).unwrap();
        assert_eq!(out.dimensions(), (12, 12));
        let tall = pixelate(&noise(4, 9), 2, true).unwrap();
        assert_eq!(tall.dimensions(), (4, 4));
    }

    #[test]
    fn factor_one_collapses_to_mean() {
        let raster = Raster::new(2, 2, vec![gray(0), gray(100), gray(200), gray(100)]).unwrap();
        let out = pixelate(&raster, 1, false).unwrap();
        assert_eq!(out, Raster::filled(2, 2, gray(100)));
    }

    #[test]
    fn area_average_of_blocks() {
        // 4x4 with four solid 2x2 quadrants pixelates to itself at factor 2.
        let colors = [gray(10), gray(50), gray(90), gray(130)];
        let raster = Raster::from_fn(4, 4, |x, y| colors[(y / 2 * 2 + x / 2) as usize]);
        assert_eq!(pixelate(&raster, 2, false).unwrap(), raster);
    }

    #[test]
    fn blocks_mix_neighbours() {
        let raster = Raster::new(4, 1, vec![gray(0), gray(200), gray(210), gray(220)]).unwrap();
        let out = pixelate(&raster, 2, false).unwrap();
        assert_eq!(out.pixels(), &[gray(100), gray(100), gray(215), gray(215)]);
    }

    #[test]
    fn output_colors_come_from_grid() {
        let raster = noise(20, 13);
        let grid = extract(&downscale_area(&raster, 5, 5));
        let out = pixelate(&raster, 5, false).unwrap();
        assert!(extract(&out).iter().all(|c| grid.contains(c)));
        assert!(extract(&out).len() <= 25);
    }

    #[test]
    fn weights_cover_whole_axis() {
        for (in_len, out_len) in [(10, 3), (3, 10), (7, 7), (128, 1)] {
            let taps = area_weights(in_len, out_len);
            let sum: f32 = taps.iter().flatten().map(|&(_, w)| w).sum();
            assert!((sum - in_len as f32).abs() < 1e-3, "{in_len}->{out_len}: {sum}");
        }
    }
}

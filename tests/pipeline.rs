use image_recolor_wasm::{
    Color, Pipeline, Raster, RecolorError, RenderOptions, extract, pixelate, quantize, remap,
};
use pretty_assertions::assert_eq;

const RED: Color = Color::new(255, 0, 0);
const GREEN: Color = Color::new(0, 255, 0);
const BLUE: Color = Color::new(0, 0, 255);

fn gray(v: u8) -> Color {
    Color::new(v, v, v)
}

fn checkerboard() -> Raster {
    Raster::from_fn(4, 4, |x, y| if (x + y) % 2 == 0 { RED } else { GREEN })
}

#[test]
fn checkerboard_end_to_end() {
    let raster = checkerboard();

    let (quantized, palette) = quantize(&raster, 2).unwrap();
    let mut centers: Vec<Color> = palette.colors().to_vec();
    centers.sort();
    assert_eq!(centers, vec![GREEN, RED]);

    let palette = extract(&quantized);
    assert_eq!(palette.colors(), &[RED, GREEN]);

    let mut pipeline = Pipeline::new();
    let mut options = RenderOptions {
        quantize: true,
        k: 2,
        ..RenderOptions::default()
    };
    pipeline.render(&raster, &options).unwrap();
    assert_eq!(pipeline.palette().colors(), &[RED, GREEN]);
    pipeline.recolor(RED, BLUE).unwrap();

    options.remap_hues = true;
    let out = pipeline.render(&raster, &options).unwrap();
    let expected = Raster::from_fn(4, 4, |x, y| if (x + y) % 2 == 0 { BLUE } else { GREEN });
    assert_eq!(out, expected);
}

#[test]
fn stage_order_matters() {
    // Quantizing first groups 200..220 together before the blocks average
    // across the 0/200 boundary; pixelating first averages raw values.
    let raster = Raster::new(4, 1, vec![gray(0), gray(200), gray(210), gray(220)]).unwrap();

    let (q, _) = quantize(&raster, 2).unwrap();
    let quantize_then_pixelate = pixelate(&q, 2, false).unwrap();

    let p = pixelate(&raster, 2, false).unwrap();
    let (pixelate_then_quantize, _) = quantize(&p, 2).unwrap();

    assert_eq!(quantize_then_pixelate.pixels(), &[gray(105), gray(105), gray(210), gray(210)]);
    assert_eq!(pixelate_then_quantize.pixels(), &[gray(100), gray(100), gray(215), gray(215)]);

    let mut pipeline = Pipeline::new();
    let options = RenderOptions {
        quantize: true,
        k: 2,
        pixelate: true,
        pixel_factor: 2,
        ..RenderOptions::default()
    };
    assert_eq!(pipeline.render(&raster, &options).unwrap(), quantize_then_pixelate);
}

#[test]
fn remap_runs_after_pixelation() {
    // Blocks of a single quantized color survive pixelation unchanged, so the
    // recolor lookup still matches them.
    let raster = Raster::from_fn(8, 8, |x, _| if x < 4 { RED } else { GREEN });
    let mut pipeline = Pipeline::new();
    let mut options = RenderOptions {
        quantize: true,
        k: 2,
        pixelate: true,
        pixel_factor: 2,
        ..RenderOptions::default()
    };
    pipeline.render(&raster, &options).unwrap();
    pipeline.recolor(GREEN, BLUE).unwrap();

    options.remap_hues = true;
    let out = pipeline.render(&raster, &options).unwrap();
    assert_eq!(out, Raster::from_fn(8, 8, |x, _| if x < 4 { RED } else { BLUE }));
}

#[test]
fn stretch_and_aspect() {
    let raster = Raster::from_fn(10, 6, |x, y| gray((x * 20 + y) as u8));
    let mut pipeline = Pipeline::new();
    let mut options = RenderOptions {
        pixelate: true,
        pixel_factor: 3,
        ..RenderOptions::default()
    };
    assert_eq!(pipeline.render(&raster, &options).unwrap().dimensions(), (10, 6));
    options.stretch = true;
    assert_eq!(pipeline.render(&raster, &options).unwrap().dimensions(), (10, 10));
}

#[test]
fn full_remap_and_back() {
    let raster = Raster::from_fn(6, 5, |x, y| [RED, GREEN, BLUE][((x + 2 * y) % 3) as usize]);
    let mut mapping = image_recolor_wasm::PaletteMapping::identity(extract(&raster));
    assert_eq!(remap(&raster, &mapping), raster);

    mapping.set(RED, GREEN).unwrap();
    mapping.set(GREEN, BLUE).unwrap();
    mapping.set(BLUE, RED).unwrap();
    let rotated = remap(&raster, &mapping);
    assert_ne!(rotated, raster);
    assert_eq!(remap(&rotated, &mapping.inverted().unwrap()), raster);
}

#[test]
fn invalid_parameters_are_rejected_up_front() {
    let raster = checkerboard();
    let mut pipeline = Pipeline::new();

    let zero_k = RenderOptions {
        quantize: true,
        k: 0,
        ..RenderOptions::default()
    };
    assert_eq!(
        pipeline.render(&raster, &zero_k),
        Err(RecolorError::InvalidClusterCount { k: 0, max: 256 })
    );

    let zero_factor = RenderOptions {
        pixelate: true,
        pixel_factor: 0,
        ..RenderOptions::default()
    };
    assert_eq!(
        pipeline.render(&raster, &zero_factor),
        Err(RecolorError::InvalidPixelFactor { factor: 0, max: 4 })
    );
    assert!(pipeline.palette().is_empty());
}

#[test]
fn rgba_buffers_round_trip_through_render() {
    let mut rgba = Vec::new();
    for i in 0..12u8 {
        rgba.extend_from_slice(&[i * 20, 255 - i * 20, 7, 128]);
    }
    let raster = Raster::from_rgba_bytes(4, 3, &rgba).unwrap();
    let out = Pipeline::new().render(&raster, &RenderOptions::default()).unwrap();
    let bytes = out.to_rgba_bytes();
    assert_eq!(bytes.len(), rgba.len());
    assert!(bytes.chunks(4).all(|p| p[3] == 255));
    assert_eq!(&bytes[4..7], &rgba[4..7]);
}

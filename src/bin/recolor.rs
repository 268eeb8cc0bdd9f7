use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use image::{DynamicImage, ImageFormat};
use image_recolor_wasm::{Color, Pipeline, Raster, RenderOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Quantize, pixelate and recolor images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON file with render options; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of k-means colors (enables quantization)
    #[arg(short = 'k', long)]
    n_colors: Option<u32>,

    /// Comma-separated hex colors to quantize against (skips k-means)
    #[arg(short = 'c', long)]
    palette: Option<String>,

    /// Pixelation grid size (enables pixelation)
    #[arg(short = 'f', long)]
    pixel_factor: Option<u32>,

    /// Stretch the pixelated output to a square of the input width
    #[arg(long)]
    stretch: bool,

    /// Palette edit as FROM=TO hex pair, repeatable (enables hue remapping)
    #[arg(short = 'r', long = "recolor")]
    recolor: Vec<String>,

    /// Seed for k-means restarts
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,

    /// Output filename prefix (ignored when --out-dir supplied)
    #[arg(short = 'p', long, default_value = "recolored_")]
    prefix: String,
}

fn parse_edit(s: &str) -> Result<(Color, Color)> {
    let (from, to) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("recolor edit must look like FROM=TO, got {s:?}"))?;
    Ok((from.parse()?, to.parse()?))
}

fn build_options(args: &Args) -> Result<RenderOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => RenderOptions::default(),
    };

    if let Some(k) = args.n_colors {
        options.quantize = true;
        options.k = k;
    }
    if let Some(list) = &args.palette {
        let colors = list
            .split(',')
            .map(|s| s.parse::<Color>())
            .collect::<Result<Vec<_>, _>>()
            .context("invalid --palette")?;
        options.quantize = true;
        options.fixed_palette = Some(colors);
    }
    if let Some(factor) = args.pixel_factor {
        options.pixelate = true;
        options.pixel_factor = factor;
    }
    if args.stretch {
        options.stretch = true;
    }
    if !args.recolor.is_empty() {
        options.remap_hues = true;
    }
    if let Some(seed) = args.seed {
        options.seed = seed;
    }
    if !args.recolor.is_empty() && !options.quantize {
        bail!("--recolor edits refer to the quantized palette; pass -k, -c or a config with quantize enabled");
    }
    Ok(options)
}

fn output_path(args: &Args, input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    match &args.out_dir {
        Some(dir) => dir.join(format!("{stem}.png")),
        None => PathBuf::from(format!("{}{}.png", args.prefix, stem)),
    }
}

fn process(args: &Args, options: &RenderOptions, edits: &[(Color, Color)], input: &Path) -> Result<serde_json::Value> {
    let img = image::open(input).with_context(|| format!("decoding {}", input.display()))?;
    let raster = Raster::from(img.to_rgb8());

    let mut pipeline = Pipeline::new();
    if !edits.is_empty() {
        // First pass publishes the palette the edits refer to.
        let discover = RenderOptions {
            pixelate: false,
            remap_hues: false,
            ..options.clone()
        };
        pipeline.render(&raster, &discover)?;
        for &(from, to) in edits {
            pipeline
                .recolor(from, to)
                .with_context(|| format!("recolor {from} -> {to}"))?;
        }
    }
    let out = pipeline.render(&raster, options).context("render failed")?;

    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(out.to_rgb_image())
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .context("PNG encode failed")?;

    let out_path = output_path(args, input);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out_path, buf)?;
    tracing::info!(path = %out_path.display(), "saved");

    Ok(serde_json::json!({
        "input": input.display().to_string(),
        "output": out_path.display().to_string(),
        "width": out.width(),
        "height": out.height(),
        "palette": pipeline.palette().to_hex(),
    }))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_recolor_wasm=info,recolor_cli=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Args::parse();
    let options = build_options(&args)?;
    let edits = args
        .recolor
        .iter()
        .map(|s| parse_edit(s))
        .collect::<Result<Vec<_>>>()?;

    for input in &args.inputs {
        let summary = process(&args, &options, &edits, input)?;
        println!("{summary}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recolor_without_quantize_is_rejected() {
        let args = Args::parse_from(["recolor-cli", "in.png", "-r", "FF0000=0000FF"]);
        let err = build_options(&args).unwrap_err();
        assert!(err.to_string().contains("--recolor"));
    }

    #[test]
    fn recolor_with_k_enables_quantize_and_remap() {
        let args = Args::parse_from(["recolor-cli", "in.png", "-k", "4", "-r", "FF0000=0000FF"]);
        let options = build_options(&args).unwrap();
        assert!(options.quantize);
        assert!(options.remap_hues);
        assert_eq!(options.k, 4);
    }

    #[test]
    fn parses_edit_pairs() {
        assert_eq!(
            parse_edit("#ff0000=0000FF").unwrap(),
            (Color::new(255, 0, 0), Color::new(0, 0, 255))
        );
        assert!(parse_edit("ff0000").is_err());
    }
}

use kmeans_colors::{Calculate, Kmeans, get_kmeans};
use palette::Srgb;
use tracing::debug;

use crate::color::Color;
use crate::error::RecolorError;
use crate::hues::{Palette, extract};
use crate::raster::Raster;

/// Upper bound on `k`; cluster labels are stored as bytes.
pub const MAX_CLUSTERS: u32 = 256;

const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_MAX_ITERATIONS: usize = 20;
const DEFAULT_CONVERGENCE: f32 = 1e-4;

/// Outcome of clustering: one label per pixel plus the rounded centers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantizationResult {
    pub labels: Vec<usize>,
    pub centers: Vec<Color>,
    pub k: usize,
}

impl QuantizationResult {
    /// Rebuild a raster of the given size with each pixel set to its center.
    pub fn apply(&self, width: u32, height: u32) -> Result<Raster, RecolorError> {
        let pixels = self.labels.iter().map(|&l| self.centers[l]).collect();
        Raster::new(width, height, pixels)
    }
}

/// k-means color quantizer in RGB space with k-means++ seeding.
///
/// Each of `attempts` runs uses its own seed derived from `seed`; the run with
/// the lowest total squared distance to its centers wins.
#[derive(Clone, Debug)]
pub struct Quantizer {
    k: u32,
    seed: u64,
    attempts: u32,
    max_iterations: usize,
    convergence: f32,
}

impl Quantizer {
    pub fn new(k: u32) -> Result<Self, RecolorError> {
        check_cluster_count(k)?;
        Ok(Self {
            k,
            seed: 0,
            attempts: DEFAULT_ATTEMPTS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence: DEFAULT_CONVERGENCE,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    /// Cluster the pixels of `raster`.
    ///
    /// When the raster holds fewer distinct colors than `k`, the effective
    /// cluster count drops to that number and every color becomes its own
    /// center.
    pub fn cluster(&self, raster: &Raster) -> QuantizationResult {
        if raster.is_empty() {
            return QuantizationResult {
                labels: Vec::new(),
                centers: Vec::new(),
                k: 0,
            };
        }

        let points: Vec<Srgb<f32>> = raster.pixels().iter().map(|c| c.to_srgb()).collect();
        let distinct = extract(raster).len();
        let k = (self.k as usize).min(distinct);

        let mut best = self.attempt(&points, k, self.seed);
        for attempt in 1..self.attempts {
            let candidate = self.attempt(&points, k, self.seed.wrapping_add(attempt as u64));
            if candidate.0 < best.0 {
                best = candidate;
            }
        }
        let (distortion, run) = best;
        debug!(k, distinct, distortion, "k-means finished");

        QuantizationResult {
            labels: run.indices.iter().map(|&i| i as usize).collect(),
            centers: run.centroids.iter().map(|&c| Color::from_srgb(c)).collect(),
            k,
        }
    }

    fn attempt(&self, points: &[Srgb<f32>], k: usize, seed: u64) -> (f32, Kmeans<Srgb<f32>>) {
        let run = get_kmeans(k, self.max_iterations, self.convergence, false, points, seed);
        let distortion = distortion(points, &run);
        debug!(seed, distortion, "k-means attempt");
        (distortion, run)
    }

    /// Replace every pixel by its cluster center and collect the resulting palette.
    pub fn quantize(&self, raster: &Raster) -> Result<(Raster, Palette), RecolorError> {
        let result = self.cluster(raster);
        let out = result.apply(raster.width(), raster.height())?;
        let palette = extract(&out);
        Ok((out, palette))
    }
}

/// Quantize `raster` to at most `k` colors with the default settings.
pub fn quantize(raster: &Raster, k: u32) -> Result<(Raster, Palette), RecolorError> {
    Quantizer::new(k)?.quantize(raster)
}

/// Map every pixel to the closest entry of a fixed palette.
pub fn map_to_palette(raster: &Raster, colors: &[Color]) -> Result<(Raster, Palette), RecolorError> {
    if colors.is_empty() {
        return Err(RecolorError::EmptyPalette);
    }
    let lookup: Palette = colors.iter().copied().collect();
    let out = raster.map(|c| {
        if lookup.contains(c) {
            c
        } else {
            c.nearest_in(lookup.colors())
                .and_then(|i| lookup.get(i))
                .unwrap_or(c)
        }
    });
    let palette = extract(&out);
    Ok((out, palette))
}

pub fn check_cluster_count(k: u32) -> Result<(), RecolorError> {
    if !(1..=MAX_CLUSTERS).contains(&k) {
        return Err(RecolorError::InvalidClusterCount {
            k,
            max: MAX_CLUSTERS,
        });
    }
    Ok(())
}

fn distortion(points: &[Srgb<f32>], run: &Kmeans<Srgb<f32>>) -> f32 {
    points
        .iter()
        .zip(&run.indices)
        .map(|(p, &i)| <Srgb<f32> as Calculate>::difference(p, &run.centroids[i as usize]))
        .sum()
}

//! Palette discovery and user-driven recoloring.
//!
//! [`extract`] collects the distinct colors of a raster in the order they are
//! first met (row-major). A [`PaletteMapping`] pairs each of those colors with
//! a replacement, and [`remap`] pushes a raster through that mapping.

use std::collections::HashMap;

use crate::color::Color;
use crate::error::RecolorError;
use crate::raster::Raster;

/// Distinct colors in first-encountered order.
#[derive(Clone, Debug, Default)]
pub struct Palette {
    colors: Vec<Color>,
    index: HashMap<Color, usize>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `color` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, color: Color) -> bool {
        if self.index.contains_key(&color) {
            return false;
        }
        self.index.insert(color, self.colors.len());
        self.colors.push(color);
        true
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        self.colors.iter().copied()
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    pub fn position(&self, color: Color) -> Option<usize> {
        self.index.get(&color).copied()
    }

    pub fn contains(&self, color: Color) -> bool {
        self.index.contains_key(&color)
    }

    pub fn to_hex(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.to_hex()).collect()
    }
}

impl PartialEq for Palette {
    fn eq(&self, other: &Self) -> bool {
        self.colors == other.colors
    }
}

impl Eq for Palette {}

impl FromIterator<Color> for Palette {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        let mut palette = Palette::new();
        for c in iter {
            palette.insert(c);
        }
        palette
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = Color;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Color>>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter().copied()
    }
}

/// Distinct colors of `raster`, scanning top-to-bottom, left-to-right.
pub fn extract(raster: &Raster) -> Palette {
    raster.pixels().iter().copied().collect()
}

/// Replacement color for every entry of a palette. Starts as the identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaletteMapping {
    palette: Palette,
    replacements: Vec<Color>,
}

impl PaletteMapping {
    pub fn identity(palette: Palette) -> Self {
        let replacements = palette.colors().to_vec();
        Self {
            palette,
            replacements,
        }
    }

    /// The source colors this mapping is keyed on.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    pub fn set(&mut self, original: Color, replacement: Color) -> Result<(), RecolorError> {
        let index = self
            .palette
            .position(original)
            .ok_or(RecolorError::UnknownColor(original))?;
        self.replacements[index] = replacement;
        Ok(())
    }

    pub fn set_index(&mut self, index: usize, replacement: Color) -> Result<(), RecolorError> {
        let len = self.replacements.len();
        let slot = self
            .replacements
            .get_mut(index)
            .ok_or(RecolorError::IndexOutOfRange { index, len })?;
        *slot = replacement;
        Ok(())
    }

    /// Replacement for `color`, or `None` when it is not a palette entry.
    pub fn get(&self, color: Color) -> Option<Color> {
        self.palette.position(color).map(|i| self.replacements[i])
    }

    pub fn replacement(&self, index: usize) -> Option<Color> {
        self.replacements.get(index).copied()
    }

    pub fn reset(&mut self) {
        self.replacements.copy_from_slice(self.palette.colors());
    }

    pub fn is_identity(&self) -> bool {
        self.replacements == self.palette.colors()
    }

    /// `(original, replacement)` pairs in palette order.
    pub fn entries(&self) -> impl Iterator<Item = (Color, Color)> + '_ {
        self.palette.iter().zip(self.replacements.iter().copied())
    }

    /// Mapping that undoes this one. Two entries sharing a replacement
    /// cannot be told apart afterwards, so that case is rejected.
    pub fn inverted(&self) -> Result<PaletteMapping, RecolorError> {
        let mut palette = Palette::new();
        for &target in &self.replacements {
            if !palette.insert(target) {
                return Err(RecolorError::NotInvertible(target));
            }
        }
        Ok(PaletteMapping {
            palette,
            replacements: self.palette.colors().to_vec(),
        })
    }
}

/// Push every pixel through `mapping`. Colors without an entry stay as they are.
pub fn remap(raster: &Raster, mapping: &PaletteMapping) -> Raster {
    if mapping.is_identity() {
        return raster.clone();
    }
    raster.map(|c| mapping.get(c).unwrap_or(c))
}

//! Discrete color palettes for particles.
//!
//! Unlike a gradient, a particle palette is an ordered list of swatches and
//! each particle picks exactly one of them at random when it is created.

use crate::color::Rgba;
use crate::error::BackdropError;
use crate::prng::RandomSource;

/// Names accepted by [`Palette::from_name`], in display order.
const PALETTE_NAMES: &[&str] = &["twilight", "ocean", "neon", "ember", "mono"];

/// A non-empty ordered list of colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgba>,
}

impl Palette {
    /// Creates a palette from a list of colors. Requires at least one color.
    pub fn new(colors: Vec<Rgba>) -> Result<Self, BackdropError> {
        if colors.is_empty() {
            return Err(BackdropError::InvalidPalette(
                "palette requires at least 1 color".to_string(),
            ));
        }
        Ok(Self { colors })
    }

    /// Creates a palette by parsing CSS color strings (see [`Rgba::parse`]).
    pub fn from_css(colors: &[&str]) -> Result<Self, BackdropError> {
        let parsed = colors
            .iter()
            .map(|c| Rgba::parse(c))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(parsed)
    }

    /// Looks up a built-in palette by name.
    pub fn from_name(name: &str) -> Result<Self, BackdropError> {
        match name {
            "twilight" => Ok(Self::twilight()),
            "ocean" => Ok(Self::ocean()),
            "neon" => Ok(Self::neon()),
            "ember" => Ok(Self::ember()),
            "mono" => Ok(Self::mono()),
            other => Err(BackdropError::UnknownPalette(other.to_string())),
        }
    }

    /// Returns the names of all built-in palettes.
    pub fn list_names() -> &'static [&'static str] {
        PALETTE_NAMES
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false for a constructed palette.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// Returns the color at `index`, wrapping around the palette length.
    pub fn get(&self, index: usize) -> Rgba {
        self.colors[index % self.colors.len()]
    }

    /// Picks a swatch index uniformly at random.
    pub fn pick_index<R: RandomSource + ?Sized>(&self, rng: &mut R) -> usize {
        rng.next_index(self.colors.len())
    }

    // -- Built-in palettes --

    /// Translucent indigo, purple, lavender and indigo again: the default.
    pub fn twilight() -> Self {
        Self::builtin(&[
            "rgba(167, 139, 250, 0.5)",
            "rgba(192, 132, 252, 0.5)",
            "rgba(245, 243, 255, 0.5)",
            "rgba(129, 140, 248, 0.5)",
        ])
    }

    /// Deep blues to cyan.
    pub fn ocean() -> Self {
        Self::builtin(&[
            "rgba(0, 95, 115, 0.5)",
            "rgba(10, 147, 150, 0.5)",
            "rgba(148, 210, 189, 0.5)",
        ])
    }

    /// Saturated pinks, greens and cyan.
    pub fn neon() -> Self {
        Self::builtin(&[
            "rgba(255, 0, 255, 0.5)",
            "rgba(0, 255, 65, 0.5)",
            "rgba(0, 255, 255, 0.5)",
        ])
    }

    /// Reds through gold.
    pub fn ember() -> Self {
        Self::builtin(&[
            "rgba(204, 0, 0, 0.5)",
            "rgba(255, 69, 0, 0.5)",
            "rgba(255, 140, 0, 0.5)",
            "rgba(255, 215, 0, 0.5)",
        ])
    }

    /// Soft greys.
    pub fn mono() -> Self {
        Self::builtin(&["rgba(192, 192, 192, 0.5)", "rgba(255, 255, 255, 0.5)"])
    }

    fn builtin(colors: &[&str]) -> Self {
        Self::from_css(colors).expect("built-in palette colors are valid")
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::twilight()
    }
}

//! PNG output of a [`RasterSurface`].
//!
//! Feature-gated behind `png` (default on) so the WASM crate can depend on
//! this crate without pulling in `image`.

use std::path::Path;

use backdrop_core::BackdropError;
use tracing::debug;

use crate::raster::RasterSurface;

/// Writes the surface's pixels as an RGBA PNG.
pub fn write_png(surface: &RasterSurface, path: &Path) -> Result<(), BackdropError> {
    let img = image::RgbaImage::from_raw(
        surface.width(),
        surface.height(),
        surface.pixels().to_vec(),
    )
    .ok_or_else(|| BackdropError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| BackdropError::Io(e.to_string()))?;
    debug!(path = %path.display(), "png written");
    Ok(())
}

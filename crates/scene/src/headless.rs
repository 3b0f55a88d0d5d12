//! Headless replay of a [`Seed`] onto a [`RasterSurface`].
//!
//! Simulated time advances by [`FRAME_MS`] per frame and the page scrolls by
//! `seed.scroll_step` before each tick, so a seed always produces the same
//! pixels.

use backdrop_blobs::BlobTransform;
use backdrop_core::{AnimationScheduler, BackdropError, Seed};
use tracing::debug;

use crate::backdrop::Backdrop;
use crate::config::BackdropConfig;
use crate::host::HostWindow;
use crate::raster::RasterSurface;

/// Simulated frame interval: one refresh at 60 Hz.
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// What a headless run leaves behind.
#[derive(Debug, Clone)]
pub struct HeadlessRun {
    pub surface: RasterSurface,
    /// Blob translations after the last frame.
    pub transforms: Vec<BlobTransform>,
    pub frames: usize,
    /// Simulated time of the last frame.
    pub elapsed_ms: f64,
    pub scroll_offset: f64,
}

/// Mounts a backdrop for `seed`, ticks it `seed.frames` times and unmounts.
pub fn run_headless(seed: &Seed) -> Result<HeadlessRun, BackdropError> {
    seed.validate()?;
    let config = BackdropConfig::from_json(&seed.params)?;
    run_with_config(seed, config, RasterSurface::new(seed.viewport()))
}

/// Like [`run_headless`] with an explicit config and target surface.
pub fn run_with_config(
    seed: &Seed,
    config: BackdropConfig,
    surface: RasterSurface,
) -> Result<HeadlessRun, BackdropError> {
    seed.validate()?;
    let host = HostWindow::new(seed.viewport());
    let scheduler = AnimationScheduler::new();
    let backdrop = Backdrop::mount(&host, &scheduler, Some(surface), config, seed.seed);

    let mut now = 0.0;
    for frame in 0..seed.frames {
        now = frame as f64 * FRAME_MS;
        if seed.scroll_step != 0.0 {
            host.scroll_to((frame + 1) as f64 * seed.scroll_step, now);
        }
        scheduler.tick(now);
    }

    let transforms = backdrop.blob_transforms();
    let surface = backdrop
        .unmount()
        .ok_or_else(|| BackdropError::Io("raster surface was not returned".into()))?;
    debug!(frames = seed.frames, elapsed_ms = now, "headless run finished");
    Ok(HeadlessRun {
        surface,
        transforms,
        frames: seed.frames,
        elapsed_ms: now,
        scroll_offset: host.scroll_offset(),
    })
}

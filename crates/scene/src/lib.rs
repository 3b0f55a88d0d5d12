#![deny(unsafe_code)]
//! Assembles the particle field and the scroll-driven blobs into one
//! mountable backdrop.
//!
//! - [`host`]: the window-like owner of resize and scroll signals
//! - [`config`]: the JSON params object split into per-component params
//! - [`backdrop`]: mount/unmount lifecycle over a host and a scheduler
//! - [`raster`]: CPU RGBA surface for headless runs
//! - [`headless`]: frame loop replaying a [`backdrop_core::Seed`]
//! - [`snapshot`]: PNG output (feature `png`)

pub mod backdrop;
pub mod config;
pub mod headless;
pub mod host;
pub mod raster;
#[cfg(feature = "png")]
pub mod snapshot;

pub use backdrop::Backdrop;
pub use config::BackdropConfig;
pub use headless::{run_headless, HeadlessRun, FRAME_MS};
pub use host::{HostWindow, ScrollEvent};
pub use raster::RasterSurface;

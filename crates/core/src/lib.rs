#![deny(unsafe_code)]
//! Core types for the backdrop animation.
//!
//! Provides the [`Viewport`]/[`ViewportTracker`] pair, the cancellable
//! [`AnimationScheduler`], host event [`Signal`]s, the [`Surface`] drawing
//! trait, [`Rgba`] colors and [`Palette`]s, the injectable [`RandomSource`]
//! with its [`Xorshift64`] default, [`Ease`] curves, param helpers and the
//! reproducible run description [`Seed`].

pub mod color;
pub mod ease;
pub mod error;
pub mod palette;
pub mod params;
pub mod prng;
pub mod scheduler;
pub mod seed;
pub mod signal;
pub mod surface;
pub mod viewport;

pub use color::Rgba;
pub use ease::Ease;
pub use error::BackdropError;
pub use palette::Palette;
pub use prng::{RandomSource, Xorshift64};
pub use scheduler::{AnimationScheduler, CancelToken, FrameTime};
pub use seed::Seed;
pub use signal::{ListenerId, Signal};
pub use surface::{DrawCommand, RecordingSurface, Surface};
pub use viewport::{Viewport, ViewportTracker};

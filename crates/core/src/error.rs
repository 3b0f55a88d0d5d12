//! Error types for the backdrop core.
//!
//! Only construction and configuration paths can fail. Per-frame work never
//! returns an error: a missing surface or a zero-sized viewport simply draws
//! nothing for that frame.

use thiserror::Error;

/// Errors produced while building or configuring backdrop components.
#[derive(Debug, Error)]
pub enum BackdropError {
    /// Width or height was zero (or overflowed) where a drawable area was required.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed from the given colors.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// A palette name did not match any built-in palette.
    #[error("unknown palette: {0}")]
    UnknownPalette(String),

    /// A params string was not valid JSON.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// A seed file described a run that cannot be replayed.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// Writing an artifact (snapshot, seed file) failed.
    #[error("i/o error: {0}")]
    Io(String),
}

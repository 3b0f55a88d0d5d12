//! Reproducible description of a headless backdrop run.
//!
//! A [`Seed`] captures everything needed to replay a run bit-for-bit: the
//! viewport, the params object, the PRNG seed, how many frames to advance,
//! and how far the simulated page scrolls per frame.

use crate::error::BackdropError;
use crate::viewport::Viewport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub width: u32,
    pub height: u32,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    pub seed: u64,
    #[serde(default)]
    pub frames: usize,
    #[serde(default)]
    pub scroll_step: f64,
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Seed {
    /// Creates a seed with empty params, zero frames and no scrolling.
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        Self {
            width,
            height,
            params: empty_params(),
            seed,
            frames: 0,
            scroll_step: 0.0,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    /// Rejects zero-sized viewports and non-finite scroll steps.
    pub fn validate(&self) -> Result<(), BackdropError> {
        if self.viewport().is_degenerate() {
            return Err(BackdropError::InvalidDimensions);
        }
        if !self.scroll_step.is_finite() {
            return Err(BackdropError::InvalidSeed(format!(
                "scroll_step must be finite, got {}",
                self.scroll_step
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_has_empty_params_and_no_frames() {
        let s = Seed::new(800, 600, 42);
        assert_eq!(s.viewport(), Viewport::new(800, 600));
        assert_eq!(s.params, serde_json::json!({}));
        assert_eq!(s.frames, 0);
        assert_eq!(s.scroll_step, 0.0);
    }

    #[test]
    fn json_round_trip_with_params() {
        let mut s = Seed::new(1280, 720, 7);
        s.params = serde_json::json!({"count": 80, "palette": "ocean"});
        s.frames = 300;
        s.scroll_step = 2.5;
        let json = serde_json::to_string_pretty(&s).unwrap();
        let restored: Seed = serde_json::from_str(&json).unwrap();
        assert_eq!(s, restored);
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let s: Seed = serde_json::from_str(r#"{"width": 10, "height": 20, "seed": 1}"#).unwrap();
        assert_eq!(s, Seed::new(10, 20, 1));
    }

    #[test]
    fn validate_rejects_zero_dimensions() {
        assert!(Seed::new(0, 600, 1).validate().is_err());
        assert!(Seed::new(800, 0, 1).validate().is_err());
        assert!(Seed::new(800, 600, 1).validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_finite_scroll_step() {
        let mut s = Seed::new(8, 8, 1);
        s.scroll_step = f64::INFINITY;
        assert!(s.validate().is_err());
    }
}

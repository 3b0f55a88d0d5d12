//! Easing curves for time-based transitions.

use serde::{Deserialize, Serialize};

/// An easing curve mapping normalized time in [0, 1] to progress in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    OutQuad,
    #[default]
    OutCubic,
    InOutCubic,
}

impl Ease {
    /// Evaluates the curve. `t` is clamped to [0, 1]; NaN maps to 0.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }

    /// Parses a snake_case curve name (`"linear"`, `"out_quad"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "linear" => Some(Self::Linear),
            "out_quad" => Some(Self::OutQuad),
            "out_cubic" | "ease_out" => Some(Self::OutCubic),
            "in_out_cubic" => Some(Self::InOutCubic),
            _ => None,
        }
    }
}

//! The flat JSON params object shared by every backdrop component.
//!
//! Particle keys, blob keys and the palette selection all live in one
//! object. Unknown keys are ignored and wrongly typed values fall back to
//! their defaults; only the palette can fail, because a named palette that
//! does not exist or a color that does not parse has no sensible fallback.

use backdrop_blobs::{BlobParams, ScrollBlobTransformer};
use backdrop_core::params::param_string;
use backdrop_core::{BackdropError, Palette, RecordingSurface};
use backdrop_particles::{ParticleField, ParticleParams};
use serde_json::{json, Value};

const DEFAULT_PALETTE: &str = "twilight";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackdropConfig {
    pub particles: ParticleParams,
    pub blobs: BlobParams,
    pub palette: Palette,
}

impl BackdropConfig {
    /// Splits a params object into component params.
    ///
    /// A `colors` array of CSS color strings takes precedence over the
    /// `palette` name.
    pub fn from_json(params: &Value) -> Result<Self, BackdropError> {
        let palette = match params.get("colors").and_then(Value::as_array) {
            Some(items) => {
                let css = items
                    .iter()
                    .map(|c| {
                        c.as_str().ok_or_else(|| {
                            BackdropError::InvalidColor(format!("expected a color string, got {c}"))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Palette::from_css(&css)?
            }
            None => Palette::from_name(&param_string(params, "palette", DEFAULT_PALETTE))?,
        };
        Ok(Self {
            particles: ParticleParams::from_json(params),
            blobs: BlobParams::from_json(params),
            palette,
        })
    }

    /// Parses a JSON string; an empty string yields the defaults.
    pub fn from_json_str(params: &str) -> Result<Self, BackdropError> {
        if params.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(params)
            .map_err(|e| BackdropError::InvalidParams(e.to_string()))?;
        Self::from_json(&value)
    }

    /// Schema of every recognized key, merged across components.
    pub fn param_schema() -> Value {
        let mut schema = ParticleField::<RecordingSurface>::param_schema();
        if let (Some(all), Value::Object(blobs)) =
            (schema.as_object_mut(), ScrollBlobTransformer::param_schema())
        {
            all.extend(blobs);
            all.insert(
                "palette".to_string(),
                json!({
                    "type": "string",
                    "default": DEFAULT_PALETTE,
                    "options": Palette::list_names(),
                    "description": "Built-in particle palette"
                }),
            );
            all.insert(
                "colors".to_string(),
                json!({
                    "type": "array",
                    "description": "Custom particle colors as CSS strings; overrides palette"
                }),
            );
        }
        schema
    }
}

#![deny(unsafe_code)]
//! Scroll-driven blob transforms.
//!
//! Each blob drifts on an ellipse parameterized by the page's scroll offset:
//!
//! ```text
//! x = base.x + sin(scroll / period + phase) * amplitude.x
//! y = base.y + cos(scroll / period + phase) * amplitude.y
//! ```
//!
//! with `phase = index * phase_step`, so siblings never move in lockstep.
//! A scroll event does not snap blobs to their new targets; it starts an
//! eased transition from wherever each blob is currently displayed.

use backdrop_core::params::{param_f64, param_points, param_string};
use backdrop_core::Ease;
use glam::DVec2;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, trace};

/// Default scroll distance per radian of drift.
const DEFAULT_PERIOD: f64 = 120.0;
/// Default horizontal drift amplitude in pixels.
const DEFAULT_AMPLITUDE_X: f64 = 280.0;
/// Default vertical drift amplitude in pixels.
const DEFAULT_AMPLITUDE_Y: f64 = 50.0;
/// Default phase difference between consecutive blobs, in radians.
const DEFAULT_PHASE_STEP: f64 = 0.6;
/// Default transition length after a scroll event.
const DEFAULT_TRANSITION_MS: f64 = 1200.0;
/// Default base offsets: two blobs anchored top, two bottom.
const DEFAULT_BASES: [DVec2; 4] = [
    DVec2::new(-4.0, 0.0),
    DVec2::new(-4.0, 0.0),
    DVec2::new(20.0, -8.0),
    DVec2::new(20.0, -8.0),
];

/// Tunable constants of the blob drift.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobParams {
    /// Scroll distance per radian (K). Must be non-zero.
    pub period: f64,
    pub amplitude: DVec2,
    pub phase_step: f64,
    pub transition_ms: f64,
    pub ease: Ease,
    /// One base offset per blob; the blob count follows this list.
    pub bases: Vec<DVec2>,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            amplitude: DVec2::new(DEFAULT_AMPLITUDE_X, DEFAULT_AMPLITUDE_Y),
            phase_step: DEFAULT_PHASE_STEP,
            transition_ms: DEFAULT_TRANSITION_MS,
            ease: Ease::default(),
            bases: DEFAULT_BASES.to_vec(),
        }
    }
}

impl BlobParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    ///
    /// A zero period and a negative transition length are replaced by their
    /// defaults; an unknown easing name selects the default curve.
    pub fn from_json(params: &Value) -> Self {
        let period = param_f64(params, "period", DEFAULT_PERIOD);
        let transition_ms = param_f64(params, "transition_ms", DEFAULT_TRANSITION_MS);
        let ease = param_string(params, "easing", "");
        Self {
            period: if period == 0.0 { DEFAULT_PERIOD } else { period },
            amplitude: DVec2::new(
                param_f64(params, "amplitude_x", DEFAULT_AMPLITUDE_X),
                param_f64(params, "amplitude_y", DEFAULT_AMPLITUDE_Y),
            ),
            phase_step: param_f64(params, "phase_step", DEFAULT_PHASE_STEP),
            transition_ms: if transition_ms < 0.0 {
                DEFAULT_TRANSITION_MS
            } else {
                transition_ms
            },
            ease: Ease::from_name(&ease).unwrap_or_default(),
            bases: param_points(params, "blobs", &DEFAULT_BASES),
        }
    }
}

/// A blob descriptor. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Blob {
    pub index: usize,
    pub base: DVec2,
    pub phase: f64,
}

impl Blob {
    /// Where this blob should sit for a given scroll offset.
    pub fn target(&self, scroll: f64, period: f64, amplitude: DVec2) -> DVec2 {
        self.base + drift(scroll, self.phase, period, amplitude)
    }
}

/// The sinusoidal drift offset. Bounded by `amplitude` for every finite input.
pub fn drift(scroll: f64, phase: f64, period: f64, amplitude: DVec2) -> DVec2 {
    let angle = scroll / period + phase;
    DVec2::new(angle.sin() * amplitude.x, angle.cos() * amplitude.y)
}

/// The translation to apply to one blob element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlobTransform {
    pub index: usize,
    pub translate: DVec2,
}

impl BlobTransform {
    /// Formats as a CSS transform, e.g. `translate(-4.00px, 50.00px)`.
    pub fn to_css(&self) -> String {
        format!(
            "translate({:.2}px, {:.2}px)",
            self.translate.x, self.translate.y
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: DVec2,
    to: DVec2,
    start_ms: f64,
}

impl Transition {
    fn at_rest(position: DVec2) -> Self {
        Self {
            from: position,
            to: position,
            start_ms: f64::NEG_INFINITY,
        }
    }

    fn sample(&self, now_ms: f64, duration_ms: f64, ease: Ease) -> DVec2 {
        let elapsed = now_ms - self.start_ms;
        if duration_ms <= 0.0 || elapsed >= duration_ms {
            return self.to;
        }
        self.from.lerp(self.to, ease.apply(elapsed / duration_ms))
    }

    fn is_settled(&self, now_ms: f64, duration_ms: f64) -> bool {
        now_ms - self.start_ms >= duration_ms
    }
}

/// Computes eased per-blob translations from a stream of scroll offsets.
///
/// All blobs start at rest on their scroll-0 targets. Time is supplied by
/// the caller in milliseconds, so the transformer runs identically in a
/// browser, a headless loop, or a test.
#[derive(Debug, Clone)]
pub struct ScrollBlobTransformer {
    blobs: Vec<Blob>,
    params: BlobParams,
    transitions: Vec<Transition>,
    scroll: f64,
}

impl ScrollBlobTransformer {
    pub fn new(params: BlobParams) -> Self {
        let blobs: Vec<Blob> = params
            .bases
            .iter()
            .enumerate()
            .map(|(index, &base)| Blob {
                index,
                base,
                phase: index as f64 * params.phase_step,
            })
            .collect();
        let transitions = blobs
            .iter()
            .map(|b| Transition::at_rest(b.target(0.0, params.period, params.amplitude)))
            .collect();
        debug!(blobs = blobs.len(), period = params.period, "blob transformer created");
        Self {
            blobs,
            params,
            transitions,
            scroll: 0.0,
        }
    }

    /// Places every blob at rest on its target for `offset`, as if the page
    /// had been scrolled there long ago. Non-finite offsets are ignored.
    pub fn settled_at(mut self, offset: f64) -> Self {
        if !offset.is_finite() {
            return self;
        }
        let (period, amplitude) = (self.params.period, self.params.amplitude);
        self.transitions = self
            .blobs
            .iter()
            .map(|b| Transition::at_rest(b.target(offset, period, amplitude)))
            .collect();
        self.scroll = offset;
        self
    }

    /// Feeds a scroll offset observed at `now_ms`.
    ///
    /// Every blob starts a new transition from its currently displayed
    /// position towards the target for `offset`. Non-finite offsets are
    /// ignored.
    pub fn on_scroll(&mut self, offset: f64, now_ms: f64) {
        if !offset.is_finite() {
            trace!(offset, "ignoring non-finite scroll offset");
            return;
        }
        let (duration, ease) = (self.params.transition_ms, self.params.ease);
        for (blob, transition) in self.blobs.iter().zip(self.transitions.iter_mut()) {
            let current = transition.sample(now_ms, duration, ease);
            *transition = Transition {
                from: current,
                to: blob.target(offset, self.params.period, self.params.amplitude),
                start_ms: now_ms,
            };
        }
        self.scroll = offset;
        trace!(offset, now_ms, "blob targets updated");
    }

    /// Displayed translation of every blob at `now_ms`.
    pub fn sample(&self, now_ms: f64) -> Vec<BlobTransform> {
        let (duration, ease) = (self.params.transition_ms, self.params.ease);
        self.blobs
            .iter()
            .zip(&self.transitions)
            .map(|(blob, t)| BlobTransform {
                index: blob.index,
                translate: t.sample(now_ms, duration, ease),
            })
            .collect()
    }

    /// Final translations for `scroll`, without easing.
    pub fn targets(&self, scroll: f64) -> Vec<BlobTransform> {
        self.blobs
            .iter()
            .map(|blob| BlobTransform {
                index: blob.index,
                translate: blob.target(scroll, self.params.period, self.params.amplitude),
            })
            .collect()
    }

    /// True once every transition has reached its target.
    pub fn is_settled(&self, now_ms: f64) -> bool {
        self.transitions
            .iter()
            .all(|t| t.is_settled(now_ms, self.params.transition_ms))
    }

    /// The last accepted scroll offset.
    pub fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    /// Current parameter values as a JSON object.
    pub fn params(&self) -> Value {
        let ease = serde_json::to_value(self.params.ease).unwrap_or(Value::Null);
        let bases: Vec<[f64; 2]> = self.params.bases.iter().map(|b| [b.x, b.y]).collect();
        json!({
            "period": self.params.period,
            "amplitude_x": self.params.amplitude.x,
            "amplitude_y": self.params.amplitude.y,
            "phase_step": self.params.phase_step,
            "transition_ms": self.params.transition_ms,
            "easing": ease,
            "blobs": bases,
        })
    }

    /// Schema describing every parameter, its type, range and default.
    pub fn param_schema() -> Value {
        json!({
            "period": {
                "type": "number",
                "default": DEFAULT_PERIOD,
                "min": 10.0,
                "max": 1000.0,
                "description": "Scroll distance per radian of drift; must be non-zero"
            },
            "amplitude_x": {
                "type": "number",
                "default": DEFAULT_AMPLITUDE_X,
                "min": 0.0,
                "max": 1000.0,
                "description": "Horizontal drift in pixels"
            },
            "amplitude_y": {
                "type": "number",
                "default": DEFAULT_AMPLITUDE_Y,
                "min": 0.0,
                "max": 1000.0,
                "description": "Vertical drift in pixels"
            },
            "phase_step": {
                "type": "number",
                "default": DEFAULT_PHASE_STEP,
                "min": 0.0,
                "max": 6.283,
                "description": "Phase offset between consecutive blobs, radians"
            },
            "transition_ms": {
                "type": "number",
                "default": DEFAULT_TRANSITION_MS,
                "min": 0.0,
                "max": 5000.0,
                "description": "Length of the eased move after a scroll event"
            },
            "easing": {
                "type": "string",
                "default": "out_cubic",
                "enum": ["linear", "out_quad", "out_cubic", "in_out_cubic"],
                "description": "Interpolation curve of the transition"
            },
            "blobs": {
                "type": "array",
                "default": DEFAULT_BASES.iter().map(|b| [b.x, b.y]).collect::<Vec<_>>(),
                "description": "Base offset [x, y] of each blob; the blob count follows"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx(a: DVec2, b: DVec2) -> bool {
        (a - b).abs().max_element() < EPSILON
    }

    fn single_blob_at_origin() -> ScrollBlobTransformer {
        ScrollBlobTransformer::new(BlobParams {
            bases: vec![DVec2::ZERO],
            ..BlobParams::default()
        })
    }

    #[test]
    fn settled_at_rests_on_that_offset() {
        let t = ScrollBlobTransformer::new(BlobParams::default()).settled_at(300.0);
        assert_eq!(t.sample(0.0), t.targets(300.0));
        assert!(t.is_settled(0.0));
        assert_eq!(t.scroll_offset(), 300.0);

        let unchanged = ScrollBlobTransformer::new(BlobParams::default()).settled_at(f64::NAN);
        assert_eq!(unchanged.scroll_offset(), 0.0);
    }

    #[test]
    fn schema_defaults_match_params() {
        let schema = ScrollBlobTransformer::param_schema();
        let params = BlobParams::default();
        assert_eq!(schema["period"]["default"], params.period);
        assert_eq!(schema["transition_ms"]["default"], params.transition_ms);
        assert_eq!(schema["blobs"]["default"].as_array().unwrap().len(), params.bases.len());
        assert_eq!(
            Ease::from_name(schema["easing"]["default"].as_str().unwrap()),
            Some(params.ease)
        );
    }

    #[test]
    fn blob_zero_at_scroll_zero_sits_at_amplitude_y() {
        let t = single_blob_at_origin();
        let target = t.targets(0.0)[0].translate;
        assert!(approx(target, DVec2::new(0.0, 50.0)), "{target:?}");
    }

    #[test]
    fn initial_state_is_at_rest_on_scroll_zero_targets() {
        let t = ScrollBlobTransformer::new(BlobParams::default());
        assert!(t.is_settled(0.0));
        assert_eq!(t.sample(0.0), t.targets(0.0));
    }

    #[test]
    fn default_blobs_have_increasing_phases() {
        let t = ScrollBlobTransformer::new(BlobParams::default());
        let phases: Vec<f64> = t.blobs().iter().map(|b| b.phase).collect();
        assert_eq!(phases.len(), 4);
        for (i, phase) in phases.iter().enumerate() {
            assert!((phase - i as f64 * 0.6).abs() < EPSILON);
        }
        assert_eq!(t.blobs()[2].base, DVec2::new(20.0, -8.0));
    }

    #[test]
    fn siblings_with_same_base_are_desynchronized() {
        let t = ScrollBlobTransformer::new(BlobParams::default());
        let targets = t.targets(300.0);
        assert!(!approx(targets[0].translate, targets[1].translate));
    }

    #[test]
    fn transition_reaches_target_exactly_at_its_end() {
        let mut t = single_blob_at_origin();
        t.on_scroll(240.0, 1000.0);
        let target = t.targets(240.0)[0].translate;
        assert_eq!(t.sample(1000.0 + DEFAULT_TRANSITION_MS)[0].translate, target);
        assert_eq!(t.sample(99_999.0)[0].translate, target);
        assert!(t.is_settled(1000.0 + DEFAULT_TRANSITION_MS));
        assert!(!t.is_settled(1500.0));
    }

    #[test]
    fn transition_starts_from_displayed_position() {
        let mut t = single_blob_at_origin();
        let start = t.sample(0.0)[0].translate;
        t.on_scroll(500.0, 100.0);
        assert!(approx(t.sample(100.0)[0].translate, start));

        let target = t.targets(500.0)[0].translate;
        let mid = t.sample(700.0)[0].translate;
        assert!(!approx(mid, start) && !approx(mid, target));
    }

    #[test]
    fn retarget_mid_transition_is_continuous() {
        let mut t = single_blob_at_origin();
        t.on_scroll(500.0, 0.0);
        let displayed = t.sample(400.0)[0].translate;
        t.on_scroll(-200.0, 400.0);
        assert!(approx(t.sample(400.0)[0].translate, displayed));
    }

    #[test]
    fn linear_transition_is_halfway_at_half_time() {
        let mut t = ScrollBlobTransformer::new(BlobParams {
            bases: vec![DVec2::ZERO],
            ease: Ease::Linear,
            transition_ms: 1000.0,
            ..BlobParams::default()
        });
        let from = t.sample(0.0)[0].translate;
        t.on_scroll(180.0, 0.0);
        let to = t.targets(180.0)[0].translate;
        assert!(approx(t.sample(500.0)[0].translate, (from + to) / 2.0));
    }

    #[test]
    fn zero_duration_snaps() {
        let mut t = ScrollBlobTransformer::new(BlobParams {
            transition_ms: 0.0,
            ..BlobParams::default()
        });
        t.on_scroll(77.0, 5.0);
        assert_eq!(t.sample(5.0), t.targets(77.0));
    }

    #[test]
    fn non_finite_scroll_is_ignored() {
        let mut t = single_blob_at_origin();
        t.on_scroll(f64::NAN, 0.0);
        t.on_scroll(f64::INFINITY, 0.0);
        assert_eq!(t.scroll_offset(), 0.0);
        assert!(t.is_settled(0.0));
    }

    #[test]
    fn css_transform_format() {
        let tr = BlobTransform {
            index: 0,
            translate: DVec2::new(-4.0, 50.0),
        };
        assert_eq!(tr.to_css(), "translate(-4.00px, 50.00px)");
    }

    #[test]
    fn from_json_reads_overrides_and_repairs_period() {
        let p = BlobParams::from_json(&json!({
            "period": 0,
            "amplitude_x": 100,
            "transition_ms": -5,
            "easing": "linear",
            "blobs": [[1, 2]]
        }));
        assert_eq!(p.period, DEFAULT_PERIOD);
        assert_eq!(p.amplitude, DVec2::new(100.0, DEFAULT_AMPLITUDE_Y));
        assert_eq!(p.transition_ms, DEFAULT_TRANSITION_MS);
        assert_eq!(p.ease, Ease::Linear);
        assert_eq!(p.bases, vec![DVec2::new(1.0, 2.0)]);
    }

    #[test]
    fn params_round_trip_through_json() {
        let t = ScrollBlobTransformer::new(BlobParams::default());
        assert_eq!(BlobParams::from_json(&t.params()), BlobParams::default());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn targets_stay_within_amplitude_of_base(scroll in -1e9_f64..1e9) {
                let t = ScrollBlobTransformer::new(BlobParams::default());
                for (blob, tr) in t.blobs().iter().zip(t.targets(scroll)) {
                    let off = tr.translate - blob.base;
                    prop_assert!(off.x.abs() <= DEFAULT_AMPLITUDE_X + EPSILON);
                    prop_assert!(off.y.abs() <= DEFAULT_AMPLITUDE_Y + EPSILON);
                }
            }

            #[test]
            fn eased_positions_stay_between_endpoints(
                scroll in -5000.0_f64..5000.0,
                at in 0.0_f64..2000.0,
            ) {
                let mut t = single_blob_at_origin();
                let from = t.sample(0.0)[0].translate;
                t.on_scroll(scroll, 0.0);
                let to = t.targets(scroll)[0].translate;
                let p = t.sample(at)[0].translate;
                let (lo, hi) = (from.min(to), from.max(to));
                prop_assert!(p.x >= lo.x - EPSILON && p.x <= hi.x + EPSILON);
                prop_assert!(p.y >= lo.y - EPSILON && p.y <= hi.y + EPSILON);
            }
        }
    }
}

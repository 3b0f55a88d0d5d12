#![deny(unsafe_code)]
//! Particle field: drifting points joined by proximity lines.
//!
//! A [`ParticleField`] owns a fixed number of particles and a drawing
//! [`Surface`]. Each [`step`](ParticleField::step) clears the surface, strokes
//! a line between every pair of particles closer than the connection
//! distance, fills each particle as a circle and then moves it by its
//! velocity, wrapping around the viewport edges.
//!
//! The pairwise pass is O(n²) in the particle count. That is the cost center
//! of the whole backdrop and the reason the default count stays at 120;
//! counts in the low hundreds keep a step well inside one display frame.

use backdrop_core::params::{param_f64, param_string, param_usize};
use backdrop_core::{Palette, RandomSource, Rgba, Surface, Viewport, Xorshift64};
use glam::DVec2;
use serde_json::{json, Value};
use tracing::{debug, trace};

/// Default number of particles.
const DEFAULT_COUNT: usize = 120;
/// Default distance below which two particles are connected.
const DEFAULT_CONNECTION_DISTANCE: f64 = 120.0;
/// Default bound on each velocity component, in units per frame.
const DEFAULT_MAX_SPEED: f64 = 0.2;
/// Default lower bound of the particle radius.
const DEFAULT_MIN_RADIUS: f64 = 1.0;
/// Default upper bound of the particle radius.
const DEFAULT_MAX_RADIUS: f64 = 3.5;
/// Default line opacity for two coincident particles.
const DEFAULT_MAX_LINE_OPACITY: f64 = 0.08;
/// Default connection line width.
const DEFAULT_LINE_WIDTH: f64 = 0.4;
/// Upper bound on `count`; the connection pass is quadratic in it.
pub const MAX_COUNT: usize = 400;
/// Upper bound on `line_width`.
pub const MAX_LINE_WIDTH: f64 = 4.0;

/// What happens to existing particles when the viewport changes size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResizePolicy {
    /// Keep positions as they are. Particles left outside a shrunken
    /// viewport are pulled back in by their next wrap check, so they may sit
    /// outside the visible area for one frame.
    #[default]
    Retain,
    /// Draw a fresh particle set for the new viewport, count unchanged.
    Reseed,
}

impl ResizePolicy {
    pub fn name(self) -> &'static str {
        match self {
            Self::Retain => "retain",
            Self::Reseed => "reseed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "retain" => Some(Self::Retain),
            "reseed" => Some(Self::Reseed),
            _ => None,
        }
    }
}

/// Tunable constants of a particle field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleParams {
    /// Number of particles, fixed for the lifetime of the field.
    pub count: usize,
    /// Pairs strictly closer than this are connected.
    pub connection_distance: f64,
    /// Each velocity component is drawn from `[-max_speed, max_speed)`.
    pub max_speed: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Line opacity at distance 0, falling linearly to 0 at the threshold.
    pub max_line_opacity: f64,
    pub line_width: f64,
    pub resize_policy: ResizePolicy,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            connection_distance: DEFAULT_CONNECTION_DISTANCE,
            max_speed: DEFAULT_MAX_SPEED,
            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
            max_line_opacity: DEFAULT_MAX_LINE_OPACITY,
            line_width: DEFAULT_LINE_WIDTH,
            resize_policy: ResizePolicy::Retain,
        }
    }
}

impl ParticleParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    ///
    /// Negative speeds are taken by magnitude and a reversed radius range is
    /// swapped, so any input yields a usable field. `count` is capped at
    /// [`MAX_COUNT`] and `line_width` is clamped to `[0, MAX_LINE_WIDTH]`.
    pub fn from_json(params: &Value) -> Self {
        let min_radius = param_f64(params, "min_radius", DEFAULT_MIN_RADIUS);
        let max_radius = param_f64(params, "max_radius", DEFAULT_MAX_RADIUS);
        let policy = param_string(params, "resize_policy", ResizePolicy::Retain.name());
        Self {
            count: param_usize(params, "count", DEFAULT_COUNT).min(MAX_COUNT),
            connection_distance: param_f64(
                params,
                "connection_distance",
                DEFAULT_CONNECTION_DISTANCE,
            ),
            max_speed: param_f64(params, "max_speed", DEFAULT_MAX_SPEED).abs(),
            min_radius: min_radius.min(max_radius),
            max_radius: min_radius.max(max_radius),
            max_line_opacity: param_f64(params, "max_line_opacity", DEFAULT_MAX_LINE_OPACITY)
                .clamp(0.0, 1.0),
            line_width: param_f64(params, "line_width", DEFAULT_LINE_WIDTH)
                .clamp(0.0, MAX_LINE_WIDTH),
            resize_policy: ResizePolicy::from_name(&policy).unwrap_or_default(),
        }
    }

    /// Opacity of the line joining two particles `distance` apart.
    ///
    /// Linear from `max_line_opacity` at 0 down to 0 at the threshold.
    pub fn connection_opacity(&self, distance: f64) -> f64 {
        if self.connection_distance <= 0.0 {
            return 0.0;
        }
        (self.max_line_opacity * (1.0 - distance / self.connection_distance)).max(0.0)
    }
}

/// A simulated point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: DVec2,
    /// Constant for the particle's lifetime.
    pub velocity: DVec2,
    pub radius: f64,
    pub color: Rgba,
}

impl Particle {
    /// Draws a particle uniformly inside `extent`.
    pub fn random<R: RandomSource + ?Sized>(
        extent: DVec2,
        params: &ParticleParams,
        palette: &Palette,
        rng: &mut R,
    ) -> Self {
        let position = DVec2::new(rng.next_range(0.0, extent.x), rng.next_range(0.0, extent.y));
        let radius = rng.next_range(params.min_radius, params.max_radius);
        let color = palette.get(palette.pick_index(rng));
        let velocity = DVec2::new(
            rng.next_range(-params.max_speed, params.max_speed),
            rng.next_range(-params.max_speed, params.max_speed),
        );
        Self {
            position,
            velocity,
            radius,
            color,
        }
    }

    /// Moves by one frame of velocity and wraps into `[0, extent]`.
    pub fn advance(&mut self, extent: DVec2) {
        let next = self.position + self.velocity;
        self.position = DVec2::new(wrap_axis(next.x, extent.x), wrap_axis(next.y, extent.y));
    }
}

/// Wraps a coordinate that left `[0, extent]` around to the opposite edge.
///
/// In-range values (including both edges) are returned untouched. Leaving by
/// `d` past one edge re-enters `d` inside the other, so a particle at 0
/// moving by -0.5 in a 100-wide viewport lands on 99.5. Values far outside
/// (after the viewport shrank) are folded back in one step. `extent` must be
/// positive.
pub fn wrap_axis(value: f64, extent: f64) -> f64 {
    if (0.0..=extent).contains(&value) {
        value
    } else {
        value.rem_euclid(extent)
    }
}

/// A pair of particles closer than the connection distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
}

/// Yields every unordered pair `(a < b)` strictly closer than `threshold`.
pub fn connections(
    particles: &[Particle],
    threshold: f64,
) -> impl Iterator<Item = Connection> + '_ {
    let n = particles.len();
    (0..n).flat_map(move |a| {
        (a + 1..n).filter_map(move |b| {
            let distance = particles[a].position.distance(particles[b].position);
            (distance < threshold).then_some(Connection { a, b, distance })
        })
    })
}

/// A fixed-size set of particles rendered onto an exclusively owned surface.
///
/// The random source is owned so that [`ResizePolicy::Reseed`] stays
/// reproducible: a field built from a seeded [`Xorshift64`] replays exactly.
pub struct ParticleField<S: Surface, R: RandomSource = Xorshift64> {
    surface: Option<S>,
    viewport: Viewport,
    particles: Vec<Particle>,
    params: ParticleParams,
    palette: Palette,
    rng: R,
    frames: u64,
    /// False until particles were drawn inside a non-degenerate viewport.
    seeded: bool,
}

impl<S: Surface, R: RandomSource> ParticleField<S, R> {
    /// Creates a field sized to `viewport` with `params.count` random particles.
    ///
    /// A `None` surface means the host could not provide a drawing context.
    /// That is not an error: the field is inert, holds no particles and
    /// every step draws nothing.
    ///
    /// At a zero-sized viewport seeding is deferred to the first resize to a
    /// real size, whatever the [`ResizePolicy`].
    pub fn new(
        viewport: Viewport,
        surface: Option<S>,
        params: ParticleParams,
        palette: Palette,
        mut rng: R,
    ) -> Self {
        let seeded = surface.is_some() && !viewport.is_degenerate();
        let particles = if seeded {
            seed_particles(viewport, &params, &palette, &mut rng)
        } else {
            if surface.is_none() {
                debug!("no drawing surface acquired; particle field is inert");
            }
            Vec::new()
        };
        Self::assemble(viewport, surface, particles, params, palette, rng, seeded)
    }

    /// Creates a field from an explicit particle set (replays, tests).
    ///
    /// `params.count` is overwritten with the length of `particles`.
    pub fn from_particles(
        viewport: Viewport,
        surface: Option<S>,
        particles: Vec<Particle>,
        mut params: ParticleParams,
        palette: Palette,
        rng: R,
    ) -> Self {
        params.count = particles.len();
        let particles = if surface.is_some() { particles } else { Vec::new() };
        Self::assemble(viewport, surface, particles, params, palette, rng, true)
    }

    fn assemble(
        viewport: Viewport,
        mut surface: Option<S>,
        particles: Vec<Particle>,
        params: ParticleParams,
        palette: Palette,
        rng: R,
        seeded: bool,
    ) -> Self {
        if let Some(surface) = surface.as_mut() {
            surface.resize(viewport);
        }
        debug!(
            width = viewport.width,
            height = viewport.height,
            count = particles.len(),
            "particle field created"
        );
        Self {
            surface,
            viewport,
            particles,
            params,
            palette,
            rng,
            frames: 0,
            seeded,
        }
    }

    /// Renders one frame and advances the simulation.
    ///
    /// Connections are drawn from the positions *before* this frame's move;
    /// each particle is then filled and moved in turn. Without a surface or
    /// with a zero-sized viewport this is a no-op.
    pub fn step(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if self.viewport.is_degenerate() {
            return;
        }
        let extent = self.viewport.extent();
        surface.clear();

        let mut drawn = 0usize;
        for c in connections(&self.particles, self.params.connection_distance) {
            let alpha = self.params.connection_opacity(c.distance);
            surface.stroke_line(
                self.particles[c.a].position,
                self.particles[c.b].position,
                self.params.line_width,
                Rgba::WHITE.with_alpha(alpha),
            );
            drawn += 1;
        }

        for particle in &mut self.particles {
            surface.fill_circle(particle.position, particle.radius, particle.color);
            particle.advance(extent);
        }

        self.frames += 1;
        trace!(frame = self.frames, connections = drawn, "particle step");
    }

    /// Adopts a new viewport size.
    ///
    /// The surface is resized to exactly `viewport`. Particle count never
    /// changes once seeded; positions are kept or redrawn per
    /// [`ResizePolicy`]. A field that was never seeded is seeded on its
    /// first non-degenerate viewport.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.resize(viewport);
        let reseed = !self.seeded || self.params.resize_policy == ResizePolicy::Reseed;
        if reseed && !viewport.is_degenerate() {
            self.particles = seed_particles(viewport, &self.params, &self.palette, &mut self.rng);
            self.seeded = true;
        }
        debug!(
            width = viewport.width,
            height = viewport.height,
            policy = self.params.resize_policy.name(),
            "particle field resized"
        );
    }

    /// Releases the drawing surface. The field cannot draw afterwards.
    pub fn teardown(mut self) -> Option<S> {
        debug!(frames = self.frames, "particle field torn down");
        self.surface.take()
    }

    /// Pairs that the next step would connect.
    pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
        connections(&self.particles, self.params.connection_distance)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// True when no surface was acquired.
    pub fn is_inert(&self) -> bool {
        self.surface.is_none()
    }

    /// Number of steps that actually rendered.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Current parameter values as a JSON object.
    pub fn params(&self) -> Value {
        json!({
            "count": self.params.count,
            "connection_distance": self.params.connection_distance,
            "max_speed": self.params.max_speed,
            "min_radius": self.params.min_radius,
            "max_radius": self.params.max_radius,
            "max_line_opacity": self.params.max_line_opacity,
            "line_width": self.params.line_width,
            "resize_policy": self.params.resize_policy.name(),
        })
    }

    /// Schema describing every parameter, its type, range and default.
    pub fn param_schema() -> Value {
        json!({
            "count": {
                "type": "integer",
                "default": DEFAULT_COUNT,
                "min": 0,
                "max": MAX_COUNT,
                "description": "Number of particles; the connection pass is quadratic in this"
            },
            "connection_distance": {
                "type": "number",
                "default": DEFAULT_CONNECTION_DISTANCE,
                "min": 0.0,
                "max": 400.0,
                "description": "Pairs closer than this are joined by a line"
            },
            "max_speed": {
                "type": "number",
                "default": DEFAULT_MAX_SPEED,
                "min": 0.0,
                "max": 2.0,
                "description": "Bound on each velocity component, units per frame"
            },
            "min_radius": {
                "type": "number",
                "default": DEFAULT_MIN_RADIUS,
                "min": 0.0,
                "max": 10.0,
                "description": "Smallest particle radius"
            },
            "max_radius": {
                "type": "number",
                "default": DEFAULT_MAX_RADIUS,
                "min": 0.0,
                "max": 10.0,
                "description": "Largest particle radius"
            },
            "max_line_opacity": {
                "type": "number",
                "default": DEFAULT_MAX_LINE_OPACITY,
                "min": 0.0,
                "max": 1.0,
                "description": "Line opacity at distance 0"
            },
            "line_width": {
                "type": "number",
                "default": DEFAULT_LINE_WIDTH,
                "min": 0.0,
                "max": MAX_LINE_WIDTH,
                "description": "Connection line width"
            },
            "resize_policy": {
                "type": "string",
                "default": ResizePolicy::Retain.name(),
                "enum": ["retain", "reseed"],
                "description": "Keep or redraw particles when the viewport changes"
            }
        })
    }
}

fn seed_particles<R: RandomSource + ?Sized>(
    viewport: Viewport,
    params: &ParticleParams,
    palette: &Palette,
    rng: &mut R,
) -> Vec<Particle> {
    let extent = viewport.extent();
    (0..params.count)
        .map(|_| Particle::random(extent, params, palette, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_core::RecordingSurface;

    type TestField = ParticleField<RecordingSurface>;

    fn field(width: u32, height: u32, seed: u64) -> TestField {
        let viewport = Viewport::new(width, height);
        ParticleField::new(
            viewport,
            Some(RecordingSurface::new(viewport)),
            ParticleParams::default(),
            Palette::twilight(),
            Xorshift64::new(seed),
        )
    }

    fn particle(x: f64, y: f64, vx: f64, vy: f64) -> Particle {
        Particle {
            position: DVec2::new(x, y),
            velocity: DVec2::new(vx, vy),
            radius: 1.0,
            color: Rgba::WHITE,
        }
    }

    fn field_of(width: u32, height: u32, threshold: f64, particles: Vec<Particle>) -> TestField {
        let viewport = Viewport::new(width, height);
        let params = ParticleParams {
            connection_distance: threshold,
            ..ParticleParams::default()
        };
        ParticleField::from_particles(
            viewport,
            Some(RecordingSurface::new(viewport)),
            particles,
            params,
            Palette::twilight(),
            Xorshift64::new(1),
        )
    }

    fn positions(f: &TestField) -> Vec<DVec2> {
        f.particles().iter().map(|p| p.position).collect()
    }

    // ---- Construction ----

    #[test]
    fn new_creates_default_count_inside_viewport() {
        let f = field(800, 600, 42);
        assert_eq!(f.particles().len(), 120);
        for p in f.particles() {
            assert!((0.0..800.0).contains(&p.position.x), "{p:?}");
            assert!((0.0..600.0).contains(&p.position.y), "{p:?}");
        }
    }

    #[test]
    fn new_sizes_surface_to_viewport() {
        let viewport = Viewport::new(320, 200);
        let f: TestField = ParticleField::new(
            viewport,
            Some(RecordingSurface::new(Viewport::new(1, 1))),
            ParticleParams::default(),
            Palette::twilight(),
            Xorshift64::new(3),
        );
        assert_eq!(f.surface().unwrap().size(), viewport);
    }

    #[test]
    fn velocities_radii_and_colors_respect_params() {
        let f = field(500, 500, 9);
        let palette = Palette::twilight();
        for p in f.particles() {
            assert!(p.velocity.x.abs() <= DEFAULT_MAX_SPEED, "{p:?}");
            assert!(p.velocity.y.abs() <= DEFAULT_MAX_SPEED, "{p:?}");
            assert!((DEFAULT_MIN_RADIUS..DEFAULT_MAX_RADIUS).contains(&p.radius));
            assert!(palette.colors().contains(&p.color));
        }
    }

    #[test]
    fn missing_surface_gives_inert_field() {
        let mut f: TestField = ParticleField::new(
            Viewport::new(800, 600),
            None,
            ParticleParams::default(),
            Palette::twilight(),
            Xorshift64::new(1),
        );
        assert!(f.is_inert());
        assert!(f.particles().is_empty());
        f.step();
        f.resize(Viewport::new(10, 10));
        assert_eq!(f.frame_count(), 0);
        assert!(f.teardown().is_none());
    }

    // ---- Step ----

    #[test]
    fn particle_wraps_past_top_left_corner() {
        let mut f = field_of(100, 100, 60.0, vec![particle(0.0, 0.0, -0.5, -0.5)]);
        f.step();
        let p = f.particles()[0].position;
        assert!((p.x - 99.5).abs() < 1e-9, "x = {}", p.x);
        assert!((p.y - 99.5).abs() < 1e-9, "y = {}", p.y);
    }

    #[test]
    fn particle_wraps_past_bottom_right_corner() {
        let mut f = field_of(100, 100, 60.0, vec![particle(100.0, 99.9, 0.5, 0.3)]);
        f.step();
        let p = f.particles()[0].position;
        assert!((p.x - 0.5).abs() < 1e-9, "x = {}", p.x);
        assert!((p.y - 0.2).abs() < 1e-9, "y = {}", p.y);
    }

    #[test]
    fn pair_at_50_is_connected_at_threshold_60() {
        let pair = vec![particle(0.0, 0.0, 0.0, 0.0), particle(50.0, 0.0, 0.0, 0.0)];
        let f = field_of(200, 200, 60.0, pair);
        let found: Vec<Connection> = f.connections().collect();
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].a, found[0].b), (0, 1));
        assert!((found[0].distance - 50.0).abs() < 1e-12);
    }

    #[test]
    fn pair_at_70_is_not_connected_at_threshold_60() {
        let pair = vec![particle(0.0, 0.0, 0.0, 0.0), particle(70.0, 0.0, 0.0, 0.0)];
        let mut f = field_of(200, 200, 60.0, pair);
        assert_eq!(f.connections().count(), 0);
        f.step();
        assert_eq!(f.surface().unwrap().lines().count(), 0);
    }

    #[test]
    fn pair_exactly_at_threshold_is_not_connected() {
        let pair = vec![particle(0.0, 0.0, 0.0, 0.0), particle(60.0, 0.0, 0.0, 0.0)];
        let f = field_of(200, 200, 60.0, pair);
        assert_eq!(f.connections().count(), 0);
    }

    #[test]
    fn lines_use_positions_before_the_move() {
        let mut f = field_of(
            200,
            200,
            60.0,
            vec![particle(10.0, 10.0, 1.0, 0.0), particle(40.0, 10.0, -1.0, 0.0)],
        );
        f.step();
        let lines: Vec<_> = f.surface().unwrap().lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, DVec2::new(10.0, 10.0));
        assert_eq!(lines[0].1, DVec2::new(40.0, 10.0));
        assert_eq!(positions(&f), vec![DVec2::new(11.0, 10.0), DVec2::new(39.0, 10.0)]);
    }

    #[test]
    fn line_opacity_falls_linearly_to_zero() {
        let params = ParticleParams::default();
        assert!((params.connection_opacity(0.0) - 0.08).abs() < 1e-12);
        assert!((params.connection_opacity(60.0) - 0.04).abs() < 1e-12);
        assert!(params.connection_opacity(120.0).abs() < 1e-12);
        assert_eq!(params.connection_opacity(500.0), 0.0);
    }

    #[test]
    fn each_step_clears_then_draws_every_particle() {
        let mut f = field(400, 300, 5);
        f.step();
        f.step();
        let surface = f.surface().unwrap();
        assert_eq!(surface.clear_count(), 2);
        assert_eq!(surface.circles().count(), 120);
        assert_eq!(surface.lines().count(), connections_after_one_step(5));
    }

    /// Connection count the second step of `field(400, 300, seed)` draws.
    fn connections_after_one_step(seed: u64) -> usize {
        let mut f = field(400, 300, seed);
        f.step();
        f.connections().count()
    }

    #[test]
    fn degenerate_viewport_step_is_a_no_op() {
        let mut f = field_of(0, 100, 60.0, vec![particle(5.0, 5.0, 1.0, 1.0)]);
        f.step();
        assert_eq!(f.surface().unwrap().clear_count(), 0);
        assert_eq!(positions(&f), vec![DVec2::new(5.0, 5.0)]);
        assert_eq!(f.frame_count(), 0);

        f.resize(Viewport::new(100, 100));
        f.step();
        assert_eq!(positions(&f), vec![DVec2::new(6.0, 6.0)]);
    }

    #[test]
    fn same_seed_replays_identically() {
        let mut a = field(640, 480, 77);
        let mut b = field(640, 480, 77);
        for _ in 0..200 {
            a.step();
            b.step();
        }
        let bits = |f: &TestField| {
            f.particles()
                .iter()
                .flat_map(|p| [p.position.x.to_bits(), p.position.y.to_bits()])
                .collect::<Vec<_>>()
        };
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn different_seeds_differ() {
        assert_ne!(positions(&field(640, 480, 1)), positions(&field(640, 480, 2)));
    }

    // ---- Resize / teardown ----

    #[test]
    fn resize_reassigns_surface_and_keeps_particles() {
        let mut f = field(800, 600, 11);
        let before = positions(&f);
        f.resize(Viewport::new(400, 300));
        assert_eq!(f.surface().unwrap().size(), Viewport::new(400, 300));
        assert_eq!(f.viewport(), Viewport::new(400, 300));
        assert_eq!(f.particles().len(), 120);
        assert_eq!(positions(&f), before);
    }

    #[test]
    fn particles_outside_shrunken_viewport_return_on_next_step() {
        let mut f = field(800, 600, 12);
        f.resize(Viewport::new(400, 300));
        f.step();
        for p in f.particles() {
            assert!((0.0..=400.0).contains(&p.position.x), "{p:?}");
            assert!((0.0..=300.0).contains(&p.position.y), "{p:?}");
        }
    }

    #[test]
    fn reseed_policy_redraws_inside_new_viewport() {
        let viewport = Viewport::new(800, 600);
        let params = ParticleParams {
            resize_policy: ResizePolicy::Reseed,
            ..ParticleParams::default()
        };
        let mut f: TestField = ParticleField::new(
            viewport,
            Some(RecordingSurface::new(viewport)),
            params,
            Palette::twilight(),
            Xorshift64::new(4),
        );
        f.resize(Viewport::new(100, 50));
        assert_eq!(f.particles().len(), 120);
        for p in f.particles() {
            assert!(p.position.x < 100.0 && p.position.y < 50.0, "{p:?}");
        }
    }

    #[test]
    fn zero_sized_field_seeds_on_first_real_size() {
        let mut f = field(0, 0, 9);
        assert!(f.particles().is_empty());
        f.step();
        f.resize(Viewport::new(0, 300));
        assert!(f.particles().is_empty());

        f.resize(Viewport::new(800, 600));
        assert_eq!(f.particles().len(), 120);
        let all_pairs = 120 * 119 / 2;
        assert!(f.connections().count() < all_pairs / 2);
        assert!(f.particles().iter().any(|p| p.position.x > 400.0));
        assert!(f.particles().iter().any(|p| p.position.y > 300.0));

        let before = positions(&f);
        f.resize(Viewport::new(640, 480));
        assert_eq!(positions(&f), before);
    }

    #[test]
    fn teardown_returns_the_surface() {
        let mut f = field(64, 64, 1);
        f.step();
        let surface = f.teardown().unwrap();
        assert_eq!(surface.clear_count(), 1);
    }

    // ---- Params ----

    #[test]
    fn from_json_reads_overrides_and_defaults() {
        let p = ParticleParams::from_json(&json!({
            "count": 30,
            "connection_distance": 90,
            "resize_policy": "reseed"
        }));
        assert_eq!(p.count, 30);
        assert_eq!(p.connection_distance, 90.0);
        assert_eq!(p.resize_policy, ResizePolicy::Reseed);
        assert_eq!(p.max_speed, DEFAULT_MAX_SPEED);
    }

    #[test]
    fn from_json_repairs_bad_ranges() {
        let p = ParticleParams::from_json(&json!({
            "max_speed": -0.3,
            "min_radius": 4.0,
            "max_radius": 2.0,
            "resize_policy": "stretch"
        }));
        assert_eq!(p.max_speed, 0.3);
        assert_eq!((p.min_radius, p.max_radius), (2.0, 4.0));
        assert_eq!(p.resize_policy, ResizePolicy::Retain);
    }

    #[test]
    fn from_json_clamps_count_and_line_width() {
        let p = ParticleParams::from_json(&json!({ "count": 100_000, "line_width": -2.0 }));
        assert_eq!(p.count, MAX_COUNT);
        assert_eq!(p.line_width, 0.0);

        let p = ParticleParams::from_json(&json!({ "line_width": 50.0 }));
        assert_eq!(p.line_width, MAX_LINE_WIDTH);
        assert_eq!(TestField::param_schema()["count"]["max"], json!(MAX_COUNT));
    }

    #[test]
    fn params_round_trip_through_json() {
        let f = field(10, 10, 1);
        assert_eq!(ParticleParams::from_json(&f.params()), ParticleParams::default());
    }

    #[test]
    fn schema_lists_every_param() {
        let schema = TestField::param_schema();
        let params = field(10, 10, 1).params();
        for key in params.as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "schema missing {key}");
        }
    }

    // ---- Properties ----

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(48))]

            #[test]
            fn positions_stay_in_bounds_and_count_is_fixed(
                seed: u64,
                width in 1_u32..400,
                height in 1_u32..400,
                steps in 1_usize..60,
            ) {
                let mut f = field(width, height, seed);
                for _ in 0..steps {
                    f.step();
                    prop_assert_eq!(f.particles().len(), 120);
                    for p in f.particles() {
                        prop_assert!(p.position.x >= 0.0 && p.position.x <= width as f64, "{:?}", p);
                        prop_assert!(p.position.y >= 0.0 && p.position.y <= height as f64, "{:?}", p);
                    }
                }
            }

            #[test]
            fn connected_iff_closer_than_threshold(
                points in prop::collection::vec((0.0_f64..300.0, 0.0_f64..300.0), 2..25),
                threshold in 1.0_f64..200.0,
            ) {
                let particles: Vec<Particle> = points
                    .iter()
                    .map(|&(x, y)| particle(x, y, 0.0, 0.0))
                    .collect();
                let found: Vec<(usize, usize)> = connections(&particles, threshold)
                    .map(|c| (c.a, c.b))
                    .collect();
                for a in 0..particles.len() {
                    for b in a + 1..particles.len() {
                        let d = particles[a].position.distance(particles[b].position);
                        prop_assert_eq!(found.contains(&(a, b)), d < threshold);
                    }
                }
            }

            #[test]
            fn wrap_axis_lands_in_range(value in -1e5_f64..1e5, extent in 1.0_f64..2000.0) {
                let w = wrap_axis(value, extent);
                prop_assert!((0.0..=extent).contains(&w), "{} -> {}", value, w);
            }
        }
    }
}

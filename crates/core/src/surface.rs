//! The drawing surface abstraction and an in-memory recording surface.
//!
//! A [`Surface`] is the minimal 2D raster API the particle field needs:
//! resize, clear, stroke a line, fill a circle. Browser hosts back it with a
//! canvas 2D context, headless runs with a CPU pixel buffer, and tests with
//! [`RecordingSurface`], which keeps the draw calls of the current frame.

use glam::DVec2;
use serde::Serialize;

use crate::color::Rgba;
use crate::viewport::Viewport;

/// A 2D raster target exclusively owned by one drawing component.
pub trait Surface {
    /// Current pixel dimensions.
    fn size(&self) -> Viewport;

    /// Reassigns the pixel dimensions. Contents after a resize are unspecified.
    fn resize(&mut self, viewport: Viewport);

    /// Clears every pixel to transparent.
    fn clear(&mut self);

    /// Strokes a straight line segment.
    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba);

    /// Fills a circle.
    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba);
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn size(&self) -> Viewport {
        (**self).size()
    }

    fn resize(&mut self, viewport: Viewport) {
        (**self).resize(viewport)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba) {
        (**self).stroke_line(from, to, width, color)
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        (**self).fill_circle(center, radius, color)
    }
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Line {
        from: DVec2,
        to: DVec2,
        width: f64,
        color: Rgba,
    },
    Circle {
        center: DVec2,
        radius: f64,
        color: Rgba,
    },
}

/// A surface that records draw calls instead of rasterizing them.
///
/// `clear` discards the recorded calls, so after a step the recording holds
/// exactly that frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: Viewport,
    commands: Vec<DrawCommand>,
    clears: usize,
    resizes: usize,
}

impl RecordingSurface {
    pub fn new(size: Viewport) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Draw calls since the last clear, in issue order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Recorded lines as `(from, to, color)`.
    pub fn lines(&self) -> impl Iterator<Item = (DVec2, DVec2, Rgba)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::Line {
                from, to, color, ..
            } => Some((from, to, color)),
            DrawCommand::Circle { .. } => None,
        })
    }

    /// Recorded circles as `(center, radius, color)`.
    pub fn circles(&self) -> impl Iterator<Item = (DVec2, f64, Rgba)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => Some((center, radius, color)),
            DrawCommand::Line { .. } => None,
        })
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn resize_count(&self) -> usize {
        self.resizes
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Viewport {
        self.size
    }

    fn resize(&mut self, viewport: Viewport) {
        self.size = viewport;
        self.resizes += 1;
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }
}

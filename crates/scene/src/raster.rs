//! CPU raster surface for headless rendering.
//!
//! Pixels are RGBA8 with straight alpha, row-major, four bytes per pixel, so
//! the buffer can be handed to `image::RgbaImage` or a canvas `ImageData`
//! unchanged. Shapes are composited source-over with a one-pixel coverage
//! ramp at their edges.

use backdrop_core::{Rgba, Surface, Viewport};
use glam::DVec2;

/// An in-memory pixel buffer implementing [`Surface`].
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSurface {
    size: Viewport,
    background: Rgba,
    pixels: Vec<u8>,
}

impl RasterSurface {
    /// Creates a transparent buffer.
    pub fn new(size: Viewport) -> Self {
        Self::with_background(size, Rgba::TRANSPARENT)
    }

    /// Creates a buffer that clears to `background` instead of transparent.
    pub fn with_background(size: Viewport, background: Rgba) -> Self {
        let mut surface = Self {
            size,
            background,
            pixels: Vec::new(),
        };
        surface.reallocate();
        surface
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// The raw RGBA8 buffer, `width * height * 4` bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Reads one pixel, `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = self.index(x, y);
        let mut px = [0; 4];
        px.copy_from_slice(&self.pixels[i..i + 4]);
        Some(px)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.size.width as usize + x as usize) * 4
    }

    fn reallocate(&mut self) {
        let len = self.size.width as usize * self.size.height as usize;
        let fill = self.background.to_rgba8();
        self.pixels = fill.repeat(len);
    }

    /// Composites `color` over one pixel with the given coverage in [0, 1].
    fn blend(&mut self, x: u32, y: u32, color: Rgba, coverage: f64) {
        let src_a = color.a * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let i = self.index(x, y);
        let dst = &mut self.pixels[i..i + 4];
        let dst_a = dst[3] as f64 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        for (channel, src) in dst[..3].iter_mut().zip([color.r, color.g, color.b]) {
            let d = *channel as f64 / 255.0;
            let out = (src * src_a + d * dst_a * (1.0 - src_a)) / out_a;
            *channel = (out * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Pixel range covering `[lo, hi]` on an axis of `extent` pixels.
    fn span(lo: f64, hi: f64, extent: u32) -> std::ops::Range<u32> {
        let start = lo.floor().max(0.0) as u32;
        let end = (hi.ceil().max(0.0) as u32).min(extent);
        start..end.max(start)
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> Viewport {
        self.size
    }

    fn resize(&mut self, viewport: Viewport) {
        self.size = viewport;
        self.reallocate();
    }

    fn clear(&mut self) {
        let fill = self.background.to_rgba8();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&fill);
        }
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba) {
        if !(from.is_finite() && to.is_finite()) || width <= 0.0 {
            return;
        }
        let half = width / 2.0;
        let reach = half + 1.0;
        let (lo, hi) = (from.min(to) - reach, from.max(to) + reach);
        let segment = to - from;
        let length_sq = segment.length_squared();
        // Hairlines cover less than a pixel; scale coverage by width.
        let intensity = width.min(1.0);
        for y in Self::span(lo.y, hi.y, self.size.height) {
            for x in Self::span(lo.x, hi.x, self.size.width) {
                let p = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let t = if length_sq > 0.0 {
                    ((p - from).dot(segment) / length_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let distance = p.distance(from + segment * t);
                let coverage = (half.max(0.5) + 0.5 - distance).clamp(0.0, 1.0) * intensity;
                self.blend(x, y, color, coverage);
            }
        }
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        if !center.is_finite() || radius <= 0.0 {
            return;
        }
        let reach = radius + 1.0;
        for y in Self::span(center.y - reach, center.y + reach, self.size.height) {
            for x in Self::span(center.x - reach, center.x + reach, self.size.width) {
                let p = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let coverage = radius + 0.5 - p.distance(center);
                self.blend(x, y, color, coverage);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_matches_size() {
        let s = RasterSurface::new(Viewport::new(8, 4));
        assert_eq!(s.pixels().len(), 8 * 4 * 4);
        assert!(s.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn resize_reallocates_exactly() {
        let mut s = RasterSurface::new(Viewport::new(800, 600));
        s.resize(Viewport::new(400, 300));
        assert_eq!(s.size(), Viewport::new(400, 300));
        assert_eq!(s.pixels().len(), 400 * 300 * 4);
    }

    #[test]
    fn opaque_circle_covers_its_center() {
        let mut s = RasterSurface::new(Viewport::new(20, 20));
        let red = Rgba::from_rgb8(255, 0, 0, 1.0);
        s.fill_circle(DVec2::new(10.0, 10.0), 3.0, red);
        assert_eq!(s.pixel(10, 10), Some([255, 0, 0, 255]));
        assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn translucent_fill_keeps_straight_alpha() {
        let mut s = RasterSurface::new(Viewport::new(10, 10));
        let c = Rgba::from_rgb8(167, 139, 250, 0.5);
        s.fill_circle(DVec2::new(5.0, 5.0), 3.0, c);
        assert_eq!(s.pixel(5, 5), Some([167, 139, 250, 128]));
    }

    #[test]
    fn overlapping_translucent_fills_accumulate_alpha() {
        let mut s = RasterSurface::new(Viewport::new(10, 10));
        let c = Rgba::from_rgb8(255, 255, 255, 0.5);
        s.fill_circle(DVec2::new(5.0, 5.0), 3.0, c);
        s.fill_circle(DVec2::new(5.0, 5.0), 3.0, c);
        // 0.5 over 0.5 gives 0.75
        let [_, _, _, a] = s.pixel(5, 5).unwrap();
        assert!((191..=192).contains(&a), "alpha {a}");
    }

    #[test]
    fn line_touches_pixels_along_its_path() {
        let mut s = RasterSurface::new(Viewport::new(20, 5));
        s.stroke_line(
            DVec2::new(0.0, 2.5),
            DVec2::new(20.0, 2.5),
            1.0,
            Rgba::WHITE,
        );
        for x in 0..20 {
            assert_eq!(s.pixel(x, 2).unwrap()[3], 255, "x = {x}");
            assert_eq!(s.pixel(x, 0).unwrap()[3], 0, "x = {x}");
        }
    }

    #[test]
    fn shapes_outside_are_clipped() {
        let mut s = RasterSurface::new(Viewport::new(10, 10));
        s.fill_circle(DVec2::new(-50.0, -50.0), 3.0, Rgba::WHITE);
        s.stroke_line(
            DVec2::new(100.0, 100.0),
            DVec2::new(200.0, 150.0),
            1.0,
            Rgba::WHITE,
        );
        s.fill_circle(DVec2::new(f64::NAN, 1.0), 3.0, Rgba::WHITE);
        assert!(s.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn clear_restores_background() {
        let bg = Rgba::from_rgb8(10, 10, 30, 1.0);
        let mut s = RasterSurface::with_background(Viewport::new(4, 4), bg);
        s.fill_circle(DVec2::new(2.0, 2.0), 2.0, Rgba::WHITE);
        s.clear();
        assert!(s.pixels().chunks_exact(4).all(|px| px == bg.to_rgba8()));
    }

    #[test]
    fn pixel_out_of_bounds_is_none() {
        let s = RasterSurface::new(Viewport::new(2, 2));
        assert_eq!(s.pixel(2, 0), None);
        assert_eq!(s.pixel(0, 2), None);
    }
}

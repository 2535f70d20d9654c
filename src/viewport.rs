use crate::foundation::core::{Affine, Point, Size, Vec2};

/// Zoom + pan mapping from design space to screen pixels.
///
/// A design point `p` lands on screen at `pan + zoom * p` (scale first, then translate).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl Viewport {
    /// Smallest zoom reachable through [`Viewport::zoom_at`].
    pub const MIN_ZOOM: f64 = 1e-6;
    /// Largest zoom reachable through [`Viewport::zoom_at`].
    pub const MAX_ZOOM: f64 = 1e6;

    /// Viewport with an explicit zoom and pan. Non-positive or non-finite zoom falls back to 1.
    pub fn new(zoom: f64, pan: Vec2) -> Self {
        let zoom = if zoom.is_finite() && zoom > 0.0 {
            zoom
        } else {
            1.0
        };
        Self { zoom, pan }
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current pan offset in screen pixels.
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Replace the pan offset.
    pub fn set_pan(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    /// Fit a `design` of the given size into `panel`, centered, with `padding` design units of
    /// margin so edge stitches stay visible.
    ///
    /// Returns `false` (and leaves the viewport untouched) when the design has no extent yet.
    pub fn fit(&mut self, panel: Size, design: Size, padding: f64) -> bool {
        if design.width == 0.0 || design.height == 0.0 {
            return false;
        }
        let width_ratio = panel.width / (design.width + padding);
        let height_ratio = panel.height / (design.height + padding);
        let zoom = width_ratio.min(height_ratio);
        if !(zoom.is_finite() && zoom > 0.0) {
            return false;
        }
        self.zoom = zoom;
        self.pan = Vec2::new(
            (panel.width - zoom * design.width) / 2.0,
            (panel.height - zoom * design.height) / 2.0,
        );
        true
    }

    /// Translate by `delta` screen pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Multiply the zoom by `factor` while keeping the design point under `cursor` in place.
    ///
    /// A step that would take zoom further out of `MIN_ZOOM..=MAX_ZOOM` is ignored; steps back
    /// toward the range always apply.
    pub fn zoom_at(&mut self, cursor: Point, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let zoom = self.zoom * factor;
        let too_small = zoom < Self::MIN_ZOOM && factor < 1.0;
        let too_large = zoom > Self::MAX_ZOOM && factor > 1.0;
        if too_small || too_large || !zoom.is_finite() {
            return;
        }
        let anchor = self.to_design(cursor);

        let before = self.to_screen(anchor);
        let zoomed = Self {
            zoom,
            pan: self.pan,
        };
        let after = zoomed.to_screen(anchor);

        let pan = self.pan - (after - before);
        if !pan.is_finite() {
            return;
        }
        self.pan = pan;
        self.zoom = zoom;
    }

    /// Design space to screen.
    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(self.pan.x + self.zoom * p.x, self.pan.y + self.zoom * p.y)
    }

    /// Screen to design space; the exact inverse of [`Viewport::to_screen`].
    pub fn to_design(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.zoom, (p.y - self.pan.y) / self.zoom)
    }

    /// The same mapping as an affine matrix for drawing surfaces.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }
}

#[cfg(test)]
#[path = "../tests/unit/viewport/viewport.rs"]
mod tests;

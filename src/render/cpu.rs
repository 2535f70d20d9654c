use std::path::Path;

use crate::foundation::core::{Affine, Canvas, Line, Point, Rgba8};
use crate::foundation::error::{NeedleError, NeedleResult};
use crate::plan::index::Pen;
use crate::render::pass::DrawSurface;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**; the flag makes that explicit at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA of the pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    /// Encode as PNG at `path`.
    pub fn save_png(&self, path: &Path) -> NeedleResult<()> {
        image::save_buffer_with_format(
            path,
            &self.to_straight_rgba(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| NeedleError::render(format!("write png '{}': {e}", path.display())))
    }
}

/// CPU raster surface powered by `vello_cpu`.
///
/// Call [`CpuSurface::begin_frame`], draw through [`DrawSurface`], then [`CpuSurface::finish`].
pub struct CpuSurface {
    width: u16,
    height: u16,
    background: Rgba8,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    transform: Affine,
    pen: Pen,
}

impl CpuSurface {
    /// Surface of `canvas` size, cleared to `background` at the start of each frame.
    pub fn new(canvas: Canvas, background: Rgba8) -> NeedleResult<Self> {
        if canvas.is_empty() {
            return Err(NeedleError::render("surface must be at least 1x1"));
        }
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| NeedleError::render("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| NeedleError::render("surface height exceeds u16"))?;
        let mut surface = Self {
            width,
            height,
            background,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
            transform: Affine::IDENTITY,
            pen: Pen {
                color: Rgba8::BLACK,
                width: 1.0,
            },
        };
        surface.begin_frame();
        Ok(surface)
    }

    /// Surface size.
    pub fn canvas(&self) -> Canvas {
        Canvas::new(u32::from(self.width), u32::from(self.height))
    }

    /// Discard queued drawing and start a frame on a cleared background.
    pub fn begin_frame(&mut self) {
        self.ctx.reset();
        self.transform = Affine::IDENTITY;

        let bg = self.background;
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
    }

    /// Rasterize everything drawn since [`CpuSurface::begin_frame`] and read it back.
    pub fn finish(&mut self) -> FrameRGBA {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    fn stroke(&mut self, transform: Affine, path: &vello_cpu::kurbo::BezPath) {
        let c = self.pen.color;
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
        self.ctx
            .set_stroke(vello_cpu::kurbo::Stroke::new(self.pen.width.max(0.0)));
        self.ctx.stroke_path(path);
    }
}

impl DrawSurface for CpuSurface {
    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn set_pen(&mut self, pen: Pen) {
        self.pen = pen;
    }

    fn draw_polyline(&mut self, points: &[Point]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(point_to_cpu(*first));
        for &p in rest {
            path.line_to(point_to_cpu(p));
        }
        self.stroke(self.transform, &path);
    }

    fn draw_screen_lines(&mut self, lines: &[Line]) {
        let mut path = vello_cpu::kurbo::BezPath::new();
        for line in lines {
            path.move_to(point_to_cpu(line.p0));
            path.line_to(point_to_cpu(line.p1));
        }
        if !lines.is_empty() {
            self.stroke(Affine::IDENTITY, &path);
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

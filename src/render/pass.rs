use crate::config::SimulatorOpts;
use crate::foundation::core::{Affine, Line, Point};
use crate::plan::index::{Pen, StitchIndex};
use crate::viewport::Viewport;

/// Drawing primitives the host surface provides.
pub trait DrawSurface {
    /// Transform applied to subsequent [`DrawSurface::draw_polyline`] calls.
    fn set_transform(&mut self, transform: Affine);
    /// Pen for subsequent draws.
    fn set_pen(&mut self, pen: Pen);
    /// Draw a connected polyline through `points` (in the current transform's space).
    fn draw_polyline(&mut self, points: &[Point]);
    /// Draw independent segments in screen pixels, ignoring the current transform.
    fn draw_screen_lines(&mut self, lines: &[Line]);
}

/// A traced run of stitches, borrowed from the index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Polyline<'a> {
    /// Segment pen.
    pub pen: Pen,
    /// Design-space points.
    pub points: &'a [Point],
}

/// Needle-position marker, sized in screen pixels so it ignores zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crosshair {
    /// Screen position of the current stitch.
    pub center: Point,
    /// Arm half-length in pixels.
    pub radius: f64,
    /// Marker pen (width in pixels).
    pub pen: Pen,
}

impl Crosshair {
    /// Horizontal then vertical arm.
    pub fn lines(&self) -> [Line; 2] {
        let Point { x, y } = self.center;
        let r = self.radius;
        [
            Line::new((x - r, y), (x + r, y)),
            Line::new((x, y - r), (x, y + r)),
        ]
    }
}

/// Everything drawn for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameScene<'a> {
    /// Design-to-screen transform for the polylines.
    pub transform: Affine,
    /// Polylines in draw order.
    pub polylines: Vec<Polyline<'a>>,
    /// Marker at the current stitch, absent when nothing is traced yet.
    pub crosshair: Option<Crosshair>,
}

impl FrameScene<'_> {
    /// A frame that draws nothing.
    pub fn empty() -> Self {
        Self {
            transform: Affine::IDENTITY,
            polylines: Vec::new(),
            crosshair: None,
        }
    }

    /// Number of stitch points the polylines cover.
    pub fn traced_points(&self) -> usize {
        self.polylines.iter().map(|p| p.points.len()).sum()
    }

    /// Replay the frame onto `surface`.
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        surface.set_transform(self.transform);
        for line in &self.polylines {
            surface.set_pen(line.pen);
            surface.draw_polyline(line.points);
        }
        if let Some(crosshair) = &self.crosshair {
            surface.set_pen(crosshair.pen);
            surface.draw_screen_lines(&crosshair.lines());
        }
    }
}

/// Build the frame showing stitches `1..=current`.
///
/// Whole segments are traced until the one containing `current`, which is cut after that stitch;
/// later segments are skipped. A cut segment with a single point draws no line but still places
/// the crosshair.
pub fn build_frame<'a>(
    index: &'a StitchIndex,
    current: usize,
    viewport: &Viewport,
    opts: &SimulatorOpts,
) -> FrameScene<'a> {
    if current == 0 {
        return FrameScene::empty();
    }

    let mut polylines = Vec::new();
    let mut marker = None;
    let mut drawn = 0usize;

    for segment in index.segments() {
        let points = segment.points.as_slice();
        if drawn + points.len() < current {
            drawn += points.len();
            polylines.push(Polyline {
                pen: segment.pen,
                points,
            });
            marker = points.last().copied();
            continue;
        }

        let cut = &points[..current - drawn];
        if cut.len() > 1 {
            polylines.push(Polyline {
                pen: segment.pen,
                points: cut,
            });
        }
        marker = cut.last().copied();
        break;
    }

    let crosshair = marker.map(|p| Crosshair {
        center: viewport.to_screen(p),
        radius: opts.crosshair_radius_px,
        pen: Pen {
            color: opts.crosshair_color,
            width: 1.0,
        },
    });

    FrameScene {
        transform: viewport.affine(),
        polylines,
        crosshair,
    }
}

/// One recorded [`DrawSurface`] call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    /// `set_transform`
    Transform(Affine),
    /// `set_pen`
    Pen(Pen),
    /// `draw_polyline`
    Polyline(Vec<Point>),
    /// `draw_screen_lines`
    ScreenLines(Vec<Line>),
}

/// A [`DrawSurface`] that keeps a log of calls instead of rasterizing.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Polylines recorded so far, in order.
    pub fn polylines(&self) -> impl Iterator<Item = &[Point]> {
        self.calls.iter().filter_map(|c| match c {
            DrawCall::Polyline(p) => Some(p.as_slice()),
            _ => None,
        })
    }

    /// Clear the log.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DrawSurface for RecordingSurface {
    fn set_transform(&mut self, transform: Affine) {
        self.calls.push(DrawCall::Transform(transform));
    }

    fn set_pen(&mut self, pen: Pen) {
        self.calls.push(DrawCall::Pen(pen));
    }

    fn draw_polyline(&mut self, points: &[Point]) {
        self.calls.push(DrawCall::Polyline(points.to_vec()));
    }

    fn draw_screen_lines(&mut self, lines: &[Line]) {
        self.calls.push(DrawCall::ScreenLines(lines.to_vec()));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pass.rs"]
mod tests;

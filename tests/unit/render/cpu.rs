use super::*;
use crate::config::SimulatorOpts;
use crate::plan::index::StitchIndex;
use crate::plan::model::{ColorBlock, Stitch, StitchPlan};
use crate::render::pass::build_frame;
use crate::viewport::Viewport;

fn corner_index(opts: &SimulatorOpts) -> StitchIndex {
    let plan = StitchPlan::new(vec![ColorBlock {
        color: Rgba8::rgb(200, 0, 0),
        stitches: vec![
            Stitch::new(0.0, 0.0),
            Stitch::new(100.0, 0.0),
            Stitch::new(100.0, 100.0),
        ],
    }]);
    StitchIndex::build(&plan, opts)
}

fn fitted(index: &StitchIndex, canvas: Canvas, opts: &SimulatorOpts) -> Viewport {
    let mut vp = Viewport::default();
    assert!(vp.fit(canvas.size(), index.design_size(), opts.padding));
    vp
}

#[test]
fn rejects_degenerate_surfaces() {
    assert!(CpuSurface::new(Canvas::new(0, 10), Rgba8::WHITE).is_err());
    assert!(CpuSurface::new(Canvas::new(70_000, 10), Rgba8::WHITE).is_err());
}

#[test]
fn blank_frame_is_background() {
    let mut surface = CpuSurface::new(Canvas::new(8, 4), Rgba8::rgb(18, 20, 28)).unwrap();
    let frame = surface.finish();
    assert_eq!(frame.data.len(), 8 * 4 * 4);
    assert_eq!(frame.pixel(3, 2), Some([18, 20, 28, 255]));
    assert_eq!(frame.pixel(8, 0), None);
}

#[test]
fn traced_stitches_are_painted() {
    let opts = SimulatorOpts {
        thread_width_mm: 2.0,
        ..SimulatorOpts::default()
    };
    let canvas = Canvas::new(120, 120);
    let index = corner_index(&opts);
    let vp = fitted(&index, canvas, &opts);

    let mut surface = CpuSurface::new(canvas, opts.background).unwrap();
    build_frame(&index, 3, &vp, &opts).draw(&mut surface);
    let frame = surface.finish();

    let on_top_edge = frame.pixel(60, 5).unwrap();
    assert!(on_top_edge[0] > 150 && on_top_edge[1] < 100, "{on_top_edge:?}");
    let on_right_edge = frame.pixel(114, 60).unwrap();
    assert!(on_right_edge[1] < 100, "{on_right_edge:?}");
    assert_eq!(frame.pixel(60, 60), Some([255, 255, 255, 255]));
}

#[test]
fn crosshair_marks_first_stitch() {
    let opts = SimulatorOpts::default();
    let canvas = Canvas::new(120, 120);
    let index = corner_index(&opts);
    let vp = fitted(&index, canvas, &opts);

    let mut surface = CpuSurface::new(canvas, opts.background).unwrap();
    build_frame(&index, 1, &vp, &opts).draw(&mut surface);
    let frame = surface.finish();

    let arm = frame.pixel(12, 5).unwrap();
    assert!(arm[0] < 200 && arm[0] == arm[1], "{arm:?}");
    assert_eq!(frame.pixel(60, 60), Some([255, 255, 255, 255]));
}

#[test]
fn begin_frame_discards_previous_drawing() {
    let opts = SimulatorOpts {
        thread_width_mm: 2.0,
        ..SimulatorOpts::default()
    };
    let canvas = Canvas::new(120, 120);
    let index = corner_index(&opts);
    let vp = fitted(&index, canvas, &opts);

    let mut surface = CpuSurface::new(canvas, opts.background).unwrap();
    build_frame(&index, 3, &vp, &opts).draw(&mut surface);
    surface.finish();
    surface.begin_frame();
    let frame = surface.finish();
    assert_eq!(frame.pixel(60, 5), Some([255, 255, 255, 255]));
}

#[test]
fn straight_alpha_conversion_unpremultiplies() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 32, 0, 128],
        premultiplied: true,
    };
    assert_eq!(frame.to_straight_rgba(), vec![128, 64, 0, 128]);
}

#[test]
fn fresh_frame_is_background_to_every_edge() {
    let bg = Rgba8::rgb(30, 60, 90);
    let mut surface = CpuSurface::new(Canvas::new(37, 19), bg).unwrap();
    let frame = surface.finish();
    assert!(
        frame
            .data
            .chunks_exact(4)
            .all(|px| px == [30, 60, 90, 255]),
    );

    surface.begin_frame();
    let again = surface.finish();
    assert_eq!(again.data, frame.data);
}

use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
}

fn close_pt(a: Point, b: Point) -> bool {
    close(a.x, b.x) && close(a.y, b.y)
}

#[test]
fn fit_centers_design_with_padding() {
    let mut vp = Viewport::default();
    assert!(vp.fit(Size::new(200.0, 100.0), Size::new(90.0, 40.0), 10.0));
    // min(200/100, 100/50) = 2
    assert!(close(vp.zoom(), 2.0));
    assert!(close(vp.pan().x, (200.0 - 180.0) / 2.0));
    assert!(close(vp.pan().y, (100.0 - 80.0) / 2.0));
}

#[test]
fn fit_is_noop_without_design_extent() {
    let mut vp = Viewport::new(3.0, Vec2::new(1.0, 2.0));
    assert!(!vp.fit(Size::new(200.0, 100.0), Size::new(0.0, 40.0), 10.0));
    assert!(!vp.fit(Size::new(200.0, 100.0), Size::new(40.0, 0.0), 10.0));
    assert_eq!(vp, Viewport::new(3.0, Vec2::new(1.0, 2.0)));
}

#[test]
fn to_design_inverts_to_screen() {
    let vp = Viewport::new(2.5, Vec2::new(-13.0, 7.25));
    for p in [
        Point::new(0.0, 0.0),
        Point::new(12.5, -3.0),
        Point::new(1e4, 3.3),
    ] {
        assert!(close_pt(vp.to_design(vp.to_screen(p)), p));
    }
    let p = Point::new(3.0, 4.0);
    assert!(close_pt(vp.affine() * p, vp.to_screen(p)));
}

#[test]
fn zoom_at_keeps_point_under_cursor() {
    let mut vp = Viewport::new(1.7, Vec2::new(20.0, 30.0));
    let cursor = Point::new(123.0, 45.0);
    let anchor = vp.to_design(cursor);
    vp.zoom_at(cursor, 1.03);
    assert!(close(vp.zoom(), 1.7 * 1.03));
    assert!(close_pt(vp.to_screen(anchor), cursor));
}

#[test]
fn zoom_in_then_out_restores_viewport() {
    let original = Viewport::new(0.8, Vec2::new(15.0, -4.0));
    let mut vp = original;
    let cursor = Point::new(64.0, 48.0);
    for _ in 0..25 {
        vp.zoom_at(cursor, 1.03);
    }
    for _ in 0..25 {
        vp.zoom_at(cursor, 1.0 / 1.03);
    }
    assert!(close(vp.zoom(), original.zoom()));
    assert!((vp.pan() - original.pan()).hypot() < 1e-9);
}

#[test]
fn pan_by_accumulates_and_bad_zoom_is_ignored() {
    let mut vp = Viewport::default();
    vp.pan_by(Vec2::new(3.0, -2.0));
    vp.pan_by(Vec2::new(1.0, 1.0));
    assert_eq!(vp.pan(), Vec2::new(4.0, -1.0));

    let before = vp;
    vp.zoom_at(Point::new(1.0, 1.0), 0.0);
    vp.zoom_at(Point::new(1.0, 1.0), f64::NAN);
    assert_eq!(vp, before);
}

#[test]
fn long_wheel_runs_stay_within_zoom_range() {
    let cursor = Point::new(200.0, 150.0);
    for factor in [0.97, 1.03] {
        let mut vp = Viewport::new(1.0, Vec2::new(12.0, -8.0));
        for _ in 0..30_000 {
            vp.zoom_at(cursor, factor);
        }
        assert!(vp.zoom() >= Viewport::MIN_ZOOM && vp.zoom() <= Viewport::MAX_ZOOM);
        assert!(vp.pan().is_finite(), "{factor}: {:?}", vp.pan());
        let anchor = vp.to_design(cursor);
        assert!(anchor.is_finite());
        assert!((vp.to_screen(anchor) - cursor).hypot() < 1e-3);
    }
}

#[test]
fn zoom_recovers_after_hitting_the_floor() {
    let cursor = Point::new(50.0, 50.0);
    let mut vp = Viewport::default();
    for _ in 0..10_000 {
        vp.zoom_at(cursor, 0.97);
    }
    let floor = vp.zoom();
    vp.zoom_at(cursor, 1.03);
    assert!(close(vp.zoom(), floor * 1.03));
}

#[test]
fn fitted_zoom_beyond_the_range_can_still_zoom_back() {
    let cursor = Point::new(10.0, 10.0);
    let mut vp = Viewport::new(5e6, Vec2::ZERO);
    vp.zoom_at(cursor, 1.03);
    assert_eq!(vp.zoom(), 5e6);
    vp.zoom_at(cursor, 0.97);
    assert!(close(vp.zoom(), 5e6 * 0.97));
}

use super::*;
use crate::plan::model::ColorBlock;

fn block(color: Rgba8, stitches: Vec<Stitch>) -> ColorBlock {
    ColorBlock { color, stitches }
}

fn line(n: usize, y: f64) -> Vec<Stitch> {
    (0..n).map(|i| Stitch::new(i as f64, y)).collect()
}

fn assert_partition(index: &StitchIndex) {
    assert_eq!(index.positions().len(), index.num_stitches() + 1);
    assert_eq!(index.commands().len(), index.num_stitches() + 1);
    let flat: Vec<Point> = index
        .segments()
        .iter()
        .flat_map(|s| s.points.iter().copied())
        .collect();
    assert_eq!(flat.as_slice(), &index.positions()[1..]);
}

#[test]
fn classify_uses_flag_priority() {
    let s = Stitch::new(0.0, 0.0).with_jump().with_trim().with_stop();
    assert_eq!(Command::classify(&s), Command::Trim);
    let s = Stitch::new(0.0, 0.0).with_color_change().with_jump();
    assert_eq!(Command::classify(&s), Command::Jump);
    let s = Stitch::new(0.0, 0.0).with_color_change().with_stop();
    assert_eq!(Command::classify(&s), Command::Stop);
    let s = Stitch::new(0.0, 0.0).with_color_change();
    assert_eq!(Command::classify(&s), Command::ColorChange);
    assert_eq!(Command::classify(&Stitch::new(0.0, 0.0)), Command::Stitch);
}

#[test]
fn trims_stops_and_color_changes_split_segments() {
    let mut stitches = line(6, 0.0);
    stitches[1].trim = true;
    stitches[3].stop = true;
    // Jumps do not split.
    stitches[4].jump = true;
    let plan = StitchPlan::new(vec![
        block(Rgba8::rgb(200, 0, 0), stitches),
        block(Rgba8::rgb(0, 0, 200), {
            let mut s = line(3, 5.0);
            s[2].color_change = true;
            s
        }),
    ]);

    let index = StitchIndex::build(&plan, &SimulatorOpts::default());
    assert_eq!(index.num_stitches(), 9);
    let lens: Vec<usize> = index.segments().iter().map(Segment::len).collect();
    assert_eq!(lens, vec![2, 2, 2, 3]);
    assert_eq!(index.segments()[3].pen.color, Rgba8::rgb(0, 0, 200));
    assert_eq!(index.command_at(2), Some(Command::Trim));
    assert_eq!(index.command_at(5), Some(Command::Jump));
    assert_eq!(index.command_at(9), Some(Command::ColorChange));
    assert_partition(&index);
}

#[test]
fn split_on_last_stitch_emits_no_empty_segment() {
    let mut stitches = line(3, 0.0);
    stitches[2].trim = true;
    let plan = StitchPlan::new(vec![block(Rgba8::BLACK, stitches), block(Rgba8::BLACK, vec![])]);
    let index = StitchIndex::build(&plan, &SimulatorOpts::default());
    assert_eq!(index.segments().len(), 1);
    assert!(index.segments().iter().all(|s| !s.is_empty()));
    assert_partition(&index);
}

#[test]
fn positions_are_relative_to_bounding_box() {
    let plan = StitchPlan::new(vec![block(
        Rgba8::BLACK,
        vec![Stitch::new(10.0, 20.0), Stitch::new(30.0, 25.0)],
    )]);
    let index = StitchIndex::build(&plan, &SimulatorOpts::default());
    assert_eq!(index.position(1), Some(Point::new(0.0, 0.0)));
    assert_eq!(index.position(2), Some(Point::new(20.0, 5.0)));
    assert_eq!(index.position(0), None);
    assert_eq!(index.position(3), None);
    assert_eq!(index.design_size(), Size::new(20.0, 5.0));
}

#[test]
fn empty_plan_yields_zero_stitches() {
    let index = StitchIndex::build(&StitchPlan::default(), &SimulatorOpts::default());
    assert!(index.is_empty());
    assert_eq!(index.positions().len(), 1);
    assert_eq!(index.commands().len(), 1);
    assert!(index.segments().is_empty());
    assert_eq!(index.design_size(), Size::ZERO);
    assert_eq!(index.command_at(1), None);
}

#[test]
fn pens_are_visible_on_white_and_sized_from_opts() {
    let plan = StitchPlan::new(vec![block(Rgba8::WHITE, line(2, 0.0))]);
    let opts = SimulatorOpts::default();
    let index = StitchIndex::build(&plan, &opts);
    let pen = index.segments()[0].pen;
    assert_ne!(pen.color, Rgba8::WHITE);
    assert!((pen.width - 0.1 * 96.0 / 25.4).abs() < 1e-12);
}

#[test]
fn histogram_counts_real_stitches_only() {
    let mut stitches = line(4, 0.0);
    stitches[0].jump = true;
    stitches[3].trim = true;
    let plan = StitchPlan::new(vec![block(Rgba8::BLACK, stitches)]);
    let index = StitchIndex::build(&plan, &SimulatorOpts::default());
    let h = index.command_histogram();
    assert_eq!(h[0], (Command::Stitch, 2));
    assert_eq!(h[1], (Command::Jump, 1));
    assert_eq!(h[2], (Command::Trim, 1));
}

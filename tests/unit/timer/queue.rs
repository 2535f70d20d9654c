use super::*;
use crate::config::SimulatorOpts;
use crate::foundation::core::Rgba8;
use crate::playback::Playback;
use crate::plan::index::StitchIndex;
use crate::plan::model::{ColorBlock, Stitch, StitchPlan};
use std::sync::Arc;

fn tickets(n: usize) -> Vec<TickTicket> {
    // Each stop/go cycle yields a ticket from a fresh epoch.
    let plan = StitchPlan::new(vec![ColorBlock {
        color: Rgba8::BLACK,
        stitches: vec![Stitch::new(0.0, 0.0), Stitch::new(1.0, 1.0)],
    }]);
    let mut pb = Playback::new(30);
    pb.load(Arc::new(StitchIndex::build(&plan, &SimulatorOpts::default())), 1);
    (0..n)
        .map(|_| {
            let t = pb.go().unwrap();
            pb.stop();
            t
        })
        .collect()
}

#[test]
fn fires_in_deadline_order() {
    let t = tickets(3);
    let mut q = TimerQueue::new();
    q.schedule(Duration::from_millis(30), t[0]);
    q.schedule(Duration::from_millis(10), t[1]);
    q.schedule(Duration::from_millis(20), t[2]);
    assert_eq!(q.len(), 3);

    assert_eq!(q.advance_to_next(), Some(t[1]));
    assert_eq!(q.now(), Duration::from_millis(10));
    assert_eq!(q.advance_to_next(), Some(t[2]));
    assert_eq!(q.advance_to_next(), Some(t[0]));
    assert_eq!(q.now(), Duration::from_millis(30));
    assert!(q.advance_to_next().is_none());
}

#[test]
fn equal_deadlines_fire_fifo() {
    let t = tickets(3);
    let mut q = TimerQueue::new();
    for &ticket in &t {
        q.schedule(Duration::from_millis(5), ticket);
    }
    let order: Vec<_> = std::iter::from_fn(|| q.advance_to_next()).collect();
    assert_eq!(order, t);
}

#[test]
fn pop_due_respects_the_clock() {
    let t = tickets(1);
    let mut q = TimerQueue::new();
    q.schedule(Duration::from_millis(50), t[0]);
    assert!(q.pop_due().is_none());
    q.advance_by(Duration::from_millis(49));
    assert!(q.pop_due().is_none());
    q.advance_by(Duration::from_millis(1));
    assert_eq!(q.pop_due(), Some(t[0]));
    assert!(q.is_empty());
}

#[test]
fn cancel_all_clears_pending() {
    let t = tickets(2);
    let mut q = TimerQueue::new();
    q.schedule(Duration::ZERO, t[0]);
    q.schedule(Duration::ZERO, t[1]);
    q.cancel_all();
    assert!(q.is_empty());
    assert_eq!(q.next_deadline(), None);
}

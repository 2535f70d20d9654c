use crate::foundation::core::{Point, Vec2};
use crate::viewport::Viewport;

/// Raw pointer input from the host surface, in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Primary button pressed; starts a drag.
    Down(Point),
    /// Pointer moved.
    Move(Point),
    /// Primary button released.
    Up,
    /// The host took the pointer capture away.
    CaptureLost,
    /// Wheel rotated at `position`; positive `delta` is forward (zoom in).
    Wheel {
        /// Cursor position.
        position: Point,
        /// Rotation amount; only the sign matters.
        delta: f64,
    },
}

/// An active drag-to-pan gesture.
///
/// Pans are computed from the captured origin rather than summed per move, so rounding never
/// accumulates over a long drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DragPan {
    start: Point,
    original_pan: Vec2,
}

impl DragPan {
    pub(crate) fn begin(start: Point, viewport: &Viewport) -> Self {
        Self {
            start,
            original_pan: viewport.pan(),
        }
    }

    pub(crate) fn pan_for(&self, position: Point) -> Vec2 {
        self.original_pan + (position - self.start)
    }
}

/// Keys the simulator reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Left arrow (also numpad).
    Left,
    /// Right arrow (also numpad).
    Right,
    /// Up arrow (also numpad).
    Up,
    /// Down arrow (also numpad).
    Down,
    /// Space bar.
    Space,
    /// A printable character.
    Char(char),
}

/// High-level control commands, whether from buttons or shortcuts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Play toward the last stitch.
    Forward,
    /// Play toward stitch 1.
    Reverse,
    /// Flip the playback direction.
    ToggleDirection,
    /// Double the speed.
    SpeedUp,
    /// Halve the speed.
    SlowDown,
    /// One stitch ahead.
    StepForward,
    /// One stitch back.
    StepBackward,
    /// Rewind and play.
    Restart,
    /// Pause when running, start when paused.
    TogglePause,
    /// Close the simulator.
    Quit,
}

impl Action {
    /// Keyboard shortcut mapping.
    pub fn for_key(key: Key) -> Option<Self> {
        let action = match key {
            Key::Right => Action::Forward,
            Key::Left => Action::Reverse,
            Key::Up => Action::SpeedUp,
            Key::Down => Action::SlowDown,
            Key::Space => Action::TogglePause,
            Key::Char('+' | '=') => Action::StepForward,
            Key::Char('-' | '_') => Action::StepBackward,
            Key::Char('r') => Action::Restart,
            Key::Char('p') => Action::TogglePause,
            Key::Char('q') => Action::Quit,
            Key::Char(_) => return None,
        };
        Some(action)
    }
}

/// What the host should do after an action was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action was applied.
    Handled,
    /// The user asked to close the simulator; playback is already stopped.
    Quit,
}

#[cfg(test)]
#[path = "../tests/unit/interact/interact.rs"]
mod tests;

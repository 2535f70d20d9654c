//! Needlepath animates an embroidery stitch plan the way a machine would sew it.
//!
//! The public API is session-oriented:
//!
//! - Parse a [`StitchPlan`] and load it into a [`PlaybackSession`]
//! - Deliver timer callbacks ([`TickTicket`]s) from a [`Scheduler`] to advance the needle
//! - Draw each frame onto a [`DrawSurface`], e.g. the raster [`CpuSurface`]
//! - Forward pointer and keyboard input for pan, zoom, scrubbing and speed control
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Simulator options.
pub mod config;
pub(crate) mod interact;
pub(crate) mod plan;
pub(crate) mod playback;
pub(crate) mod render;
pub(crate) mod session;
pub(crate) mod timer;
pub(crate) mod viewport;

pub use crate::foundation::core::{Affine, Canvas, Line, Point, Rect, Rgba8, Size, Vec2};
pub use crate::foundation::error::{NeedleError, NeedleResult};

pub use crate::config::SimulatorOpts;
pub use crate::interact::{Action, ActionOutcome, Key, PointerEvent};
pub use crate::plan::index::{Command, Pen, Segment, StitchIndex};
pub use crate::plan::model::{ColorBlock, Stitch, StitchPlan};
pub use crate::playback::{Direction, Playback, PlaybackEvent, TickTicket};
pub use crate::render::cpu::{CpuSurface, FrameRGBA};
pub use crate::render::pass::{
    Crosshair, DrawCall, DrawSurface, FrameScene, Polyline, RecordingSurface, build_frame,
};
pub use crate::session::{PlaybackSession, SessionStatus};
pub use crate::timer::{Scheduler, TimerQueue};
pub use crate::viewport::Viewport;

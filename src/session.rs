use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::SimulatorOpts;
use crate::foundation::core::Canvas;
use crate::foundation::error::NeedleResult;
use crate::interact::{Action, ActionOutcome, DragPan, Key, PointerEvent};
use crate::plan::index::{Command, StitchIndex};
use crate::plan::model::StitchPlan;
use crate::playback::{Direction, Playback, PlaybackEvent, TickTicket};
use crate::render::pass::{DrawSurface, FrameScene, build_frame};
use crate::timer::Scheduler;
use crate::viewport::Viewport;

/// Snapshot for status labels and the scrub slider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionStatus {
    /// Current 1-based stitch (0 without stitches).
    pub stitch: usize,
    /// Stitches in the loaded plan.
    pub num_stitches: usize,
    /// Classification of the current stitch.
    pub command: Option<Command>,
    /// Speed in stitches per second.
    pub speed: u32,
    /// Playback direction.
    pub direction: Direction,
    /// Whether the tick loop is active.
    pub running: bool,
}

impl SessionStatus {
    /// Speed label, signed by direction.
    pub fn speed_label(&self) -> String {
        let signed = i64::from(self.speed) * self.direction.sign();
        format!("Speed: {signed} stitches/sec")
    }

    /// Command label for the current stitch, empty when there is none.
    pub fn command_label(&self) -> &'static str {
        self.command.map_or("", Command::label)
    }
}

/// One playback session: the loaded plan, its viewport, and the animation state.
///
/// Every entry point takes `&mut self`; the host calls them from a single logical thread,
/// interleaving timer callbacks ([`PlaybackSession::on_tick`]) with input events.
pub struct PlaybackSession<S: Scheduler> {
    opts: SimulatorOpts,
    scheduler: S,
    playback: Playback,
    viewport: Viewport,
    panel: Canvas,
    drag: Option<DragPan>,
}

impl<S: Scheduler> PlaybackSession<S> {
    /// Empty session drawing into a panel of `panel` size.
    pub fn new(opts: SimulatorOpts, panel: Canvas, scheduler: S) -> NeedleResult<Self> {
        opts.validate()?;
        Ok(Self {
            playback: Playback::new(opts.target_fps),
            opts,
            scheduler,
            viewport: Viewport::default(),
            panel,
            drag: None,
        })
    }

    /// Session options.
    pub fn opts(&self) -> &SimulatorOpts {
        &self.opts
    }

    /// The scheduler, so the host can deliver due tickets.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutable scheduler access.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Animation state.
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// Current viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Drawable size.
    pub fn panel(&self) -> Canvas {
        self.panel
    }

    /// Loaded stitch index.
    pub fn index(&self) -> Option<&Arc<StitchIndex>> {
        self.playback.index()
    }

    /// Return `true` while a drag gesture is active.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Drain queued playback notifications.
    pub fn take_events(&mut self) -> Vec<PlaybackEvent> {
        self.playback.take_events()
    }

    /// Status label snapshot.
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            stitch: self.playback.current_stitch(),
            num_stitches: self.playback.num_stitches(),
            command: self.playback.current_command(),
            speed: self.playback.speed(),
            direction: self.playback.direction(),
            running: self.playback.is_running(),
        }
    }

    /// Load a plan: index it, fit it to the panel, rewind to stitch 1 and start playing.
    #[tracing::instrument(skip_all, fields(stitches = plan.num_stitches()))]
    pub fn load(&mut self, plan: &StitchPlan) {
        let index = Arc::new(StitchIndex::build(plan, &self.opts));
        let speed = self.opts.initial_speed(index.num_stitches());
        self.drag = None;
        self.playback.load(Arc::clone(&index), speed);
        self.fit_viewport();
        tracing::debug!(
            stitches = index.num_stitches(),
            speed,
            zoom = self.viewport.zoom(),
            "plan loaded"
        );
        self.go();
    }

    /// Drop the plan. Pending ticks become no-ops.
    pub fn unload(&mut self) {
        self.drag = None;
        self.playback.unload();
    }

    /// Stop animating because the view is closing.
    pub fn close(&mut self) {
        self.drag = None;
        self.playback.stop();
    }

    /// The drawable area changed size; refit the design.
    pub fn resize(&mut self, panel: Canvas) {
        self.panel = panel;
        self.fit_viewport();
    }

    fn fit_viewport(&mut self) {
        let Some(index) = self.playback.index() else {
            return;
        };
        let design = index.design_size();
        self.viewport
            .fit(self.panel.size(), design, self.opts.padding);
    }

    fn schedule_first(&mut self, ticket: Option<TickTicket>) {
        if let Some(ticket) = ticket {
            self.scheduler.schedule(Duration::ZERO, ticket);
        }
    }

    /// Start animating.
    pub fn go(&mut self) {
        let ticket = self.playback.go();
        self.schedule_first(ticket);
    }

    /// Pause; any scheduled tick is invalidated.
    pub fn stop(&mut self) {
        self.playback.stop();
    }

    /// Rewind to the start of the current direction and play.
    pub fn restart(&mut self) {
        let ticket = self.playback.restart();
        self.schedule_first(ticket);
    }

    /// Play toward the last stitch, if there is room.
    pub fn forward(&mut self) {
        let ticket = self.playback.forward();
        self.schedule_first(ticket);
    }

    /// Play toward stitch 1, if there is room.
    pub fn reverse(&mut self) {
        let ticket = self.playback.reverse();
        self.schedule_first(ticket);
    }

    /// Flip direction and resume when the new direction has room.
    pub fn toggle_direction(&mut self) {
        let ticket = self.playback.toggle_direction();
        self.schedule_first(ticket);
    }

    /// Change direction without starting or stopping.
    pub fn set_direction(&mut self, direction: Direction) {
        self.playback.set_direction(direction);
    }

    /// Set the speed in stitches per second (floored at 1).
    pub fn set_speed(&mut self, speed: f64) {
        self.playback.set_speed(speed);
    }

    /// Double the speed.
    pub fn speed_up(&mut self) {
        self.playback.speed_up();
    }

    /// Halve the speed.
    pub fn slow_down(&mut self) {
        self.playback.slow_down();
    }

    /// Scrub to stitch `n` (clamped).
    pub fn set_current_stitch(&mut self, n: i64) {
        self.playback.set_current_stitch(n);
    }

    /// Move `delta` stitches.
    pub fn step(&mut self, delta: i64) {
        self.playback.step(delta);
    }

    /// Timer callback: advance and reschedule.
    ///
    /// Returns `false` for a stale ticket, which changes nothing and needs no redraw.
    pub fn on_tick(&mut self, ticket: TickTicket) -> bool {
        if !self.playback.accepts(ticket) {
            return false;
        }
        if let Some(delay) = self.playback.advance(ticket) {
            self.scheduler.schedule(delay, ticket);
        }
        true
    }

    /// Build the current frame without drawing it.
    pub fn frame(&self) -> Option<FrameScene<'_>> {
        let index = self.playback.index()?;
        Some(build_frame(
            index,
            self.playback.current_stitch(),
            &self.viewport,
            &self.opts,
        ))
    }

    /// Draw the current frame onto `surface` and feed the time it took back into frame pacing.
    ///
    /// Returns `false` (drawing nothing) when no plan is loaded.
    pub fn render(&mut self, surface: &mut dyn DrawSurface) -> bool {
        let Some(index) = self.playback.index().cloned() else {
            return false;
        };
        let started = Instant::now();
        build_frame(
            &index,
            self.playback.current_stitch(),
            &self.viewport,
            &self.opts,
        )
        .draw(surface);
        self.playback.record_frame_duration(started.elapsed());
        true
    }

    /// Apply a pointer event. Returns `true` when the view needs a redraw.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down(position) => {
                self.drag = Some(DragPan::begin(position, &self.viewport));
                false
            }
            PointerEvent::Move(position) => {
                let Some(drag) = self.drag else {
                    return false;
                };
                self.viewport.set_pan(drag.pan_for(position));
                true
            }
            PointerEvent::Up | PointerEvent::CaptureLost => {
                self.drag = None;
                false
            }
            PointerEvent::Wheel { position, delta } => {
                let factor = if delta > 0.0 {
                    self.opts.wheel_zoom_in
                } else if delta < 0.0 {
                    self.opts.wheel_zoom_out
                } else {
                    return false;
                };
                self.viewport.zoom_at(position, factor);
                true
            }
        }
    }

    /// Apply a control action.
    pub fn apply(&mut self, action: Action) -> ActionOutcome {
        match action {
            Action::Forward => self.forward(),
            Action::Reverse => self.reverse(),
            Action::ToggleDirection => self.toggle_direction(),
            Action::SpeedUp => self.speed_up(),
            Action::SlowDown => self.slow_down(),
            Action::StepForward => self.step(1),
            Action::StepBackward => self.step(-1),
            Action::Restart => self.restart(),
            Action::TogglePause => {
                if self.playback.is_running() {
                    self.stop();
                } else {
                    self.go();
                }
            }
            Action::Quit => {
                self.close();
                return ActionOutcome::Quit;
            }
        }
        ActionOutcome::Handled
    }

    /// Apply a keyboard shortcut. Unbound keys return `None`.
    pub fn handle_key(&mut self, key: Key) -> Option<ActionOutcome> {
        Action::for_key(key).map(|action| self.apply(action))
    }
}

#[cfg(test)]
#[path = "../tests/unit/session/session.rs"]
mod tests;

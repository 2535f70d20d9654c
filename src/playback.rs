use std::sync::Arc;
use std::time::Duration;

use crate::plan::index::{Command, StitchIndex};

// Keeps `speed * (1 / speed)` from flooring to zero when the product lands a hair below 1.
const INCREMENT_EPSILON: f64 = 1e-9;

/// Playback direction along the stitch sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward the last stitch.
    #[default]
    Forward,
    /// Toward stitch 1.
    Reverse,
}

impl Direction {
    /// `+1` or `-1`.
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// Notifications for the surrounding UI (labels, slider, start/pause button).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The current stitch was set (possibly to the same value).
    CurrentStitch {
        /// 1-based stitch number.
        stitch: usize,
        /// Classification of that stitch.
        command: Command,
    },
    /// Playback transitioned to running.
    Started,
    /// Playback transitioned to stopped.
    Stopped,
}

/// Proof that a tick was scheduled while playback was running.
///
/// The epoch changes whenever playback stops or a plan is (un)loaded, so a timer that fires
/// afterwards carries a stale ticket and does nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TickTicket {
    epoch: u64,
}

impl TickTicket {
    /// Epoch the ticket was issued in.
    pub fn epoch(self) -> u64 {
        self.epoch
    }
}

/// Animation position, speed and direction.
///
/// All mutation happens through `&mut self` from one logical thread: timer ticks and UI commands
/// are interleaved, never concurrent.
#[derive(Debug)]
pub struct Playback {
    index: Option<Arc<StitchIndex>>,
    current: usize,
    direction: Direction,
    speed: u32,
    running: bool,
    target_frame_period: f64,
    last_frame_duration: Duration,
    epoch: u64,
    events: Vec<PlaybackEvent>,
}

impl Playback {
    /// Idle playback with no plan, capping rendering at `target_fps` frames per second.
    pub fn new(target_fps: u32) -> Self {
        Self {
            index: None,
            current: 0,
            direction: Direction::Forward,
            speed: 1,
            running: false,
            target_frame_period: 1.0 / f64::from(target_fps.max(1)),
            last_frame_duration: Duration::ZERO,
            epoch: 0,
            events: Vec::new(),
        }
    }

    /// Take a new plan: back to stitch 1, forward, stopped. Call [`Playback::go`] to animate.
    pub fn load(&mut self, index: Arc<StitchIndex>, speed: u32) {
        self.halt();
        self.epoch = self.epoch.wrapping_add(1);
        self.direction = Direction::Forward;
        self.last_frame_duration = Duration::ZERO;
        self.speed = speed.max(1);
        self.current = if index.is_empty() { 0 } else { 1 };
        self.index = Some(index);
        self.notify_current();
    }

    /// Drop the plan; any pending tick becomes stale.
    pub fn unload(&mut self) {
        self.halt();
        self.epoch = self.epoch.wrapping_add(1);
        self.index = None;
        self.current = 0;
    }

    /// Loaded stitch index, if any.
    pub fn index(&self) -> Option<&Arc<StitchIndex>> {
        self.index.as_ref()
    }

    /// Return `true` once a plan is loaded (even an empty one).
    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    /// Number of stitches in the loaded plan (0 when nothing is loaded).
    pub fn num_stitches(&self) -> usize {
        self.index.as_ref().map_or(0, |i| i.num_stitches())
    }

    /// Current 1-based stitch; 0 iff the plan is empty or absent.
    pub fn current_stitch(&self) -> usize {
        self.current
    }

    /// Classification of the current stitch.
    pub fn current_command(&self) -> Option<Command> {
        self.index.as_ref()?.command_at(self.current)
    }

    /// Current direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current speed in stitches per second.
    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Return `true` while the tick loop is active.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Time spent in the most recent render pass.
    pub fn last_frame_duration(&self) -> Duration {
        self.last_frame_duration
    }

    /// Drain queued notifications.
    pub fn take_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start animating. Returns the ticket for the first tick, or `None` when nothing changed
    /// (no plan, an empty plan, or already running).
    pub fn go(&mut self) -> Option<TickTicket> {
        if self.num_stitches() == 0 || self.running {
            return None;
        }
        self.running = true;
        self.events.push(PlaybackEvent::Started);
        tracing::debug!(stitch = self.current, speed = self.speed, "playback started");
        Some(TickTicket { epoch: self.epoch })
    }

    /// Stop animating and invalidate any scheduled tick.
    pub fn stop(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if self.halt() {
            tracing::debug!(stitch = self.current, "playback stopped");
        }
    }

    fn halt(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.events.push(PlaybackEvent::Stopped);
        true
    }

    /// Change direction without starting or stopping.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Play toward the last stitch, if there is room to move.
    pub fn forward(&mut self) -> Option<TickTicket> {
        self.set_direction(Direction::Forward);
        self.start_if_not_at_end()
    }

    /// Play toward stitch 1, if there is room to move.
    pub fn reverse(&mut self) -> Option<TickTicket> {
        self.set_direction(Direction::Reverse);
        self.start_if_not_at_end()
    }

    /// Flip direction; resumes if the new direction has room.
    pub fn toggle_direction(&mut self) -> Option<TickTicket> {
        match self.direction {
            Direction::Forward => self.reverse(),
            Direction::Reverse => self.forward(),
        }
    }

    fn start_if_not_at_end(&mut self) -> Option<TickTicket> {
        let has_room = match self.direction {
            Direction::Forward => self.current < self.num_stitches(),
            Direction::Reverse => self.current > 1,
        };
        if has_room { self.go() } else { None }
    }

    /// Set the speed in stitches per second, truncated and floored at 1.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = if speed.is_finite() {
            speed.clamp(1.0, f64::from(u32::MAX)) as u32
        } else if speed > 0.0 {
            u32::MAX
        } else {
            1
        };
    }

    /// Double the speed.
    pub fn speed_up(&mut self) {
        self.set_speed(f64::from(self.speed) * 2.0);
    }

    /// Halve the speed, never below 1 stitch per second.
    pub fn slow_down(&mut self) {
        self.set_speed(f64::from(self.speed) / 2.0);
    }

    /// Jump to stitch `n`, clamped into the plan. Stops when the new position is the end of the
    /// sequence in the current direction.
    pub fn set_current_stitch(&mut self, n: i64) {
        let total = self.num_stitches();
        if total == 0 {
            return;
        }
        let max = i64::try_from(total).unwrap_or(i64::MAX);
        self.move_to(n.clamp(1, max) as usize);
        self.stop_if_at_end();
    }

    /// Move `delta` stitches from the current one.
    pub fn step(&mut self, delta: i64) {
        let current = i64::try_from(self.current).unwrap_or(i64::MAX);
        self.set_current_stitch(current.saturating_add(delta));
    }

    /// Rewind to the start of the current direction and play.
    pub fn restart(&mut self) -> Option<TickTicket> {
        let total = self.num_stitches();
        if total == 0 {
            return None;
        }
        self.move_to(match self.direction {
            Direction::Forward => 1,
            Direction::Reverse => total,
        });
        self.go()
    }

    // Observers only hear about actual changes.
    fn move_to(&mut self, stitch: usize) {
        if stitch != self.current {
            self.current = stitch;
            self.notify_current();
        }
    }

    fn stop_if_at_end(&mut self) {
        let at_end = match self.direction {
            Direction::Forward => self.current == self.num_stitches(),
            Direction::Reverse => self.current == 1,
        };
        if at_end {
            self.stop();
        }
    }

    fn notify_current(&mut self) {
        if let Some(command) = self.current_command() {
            self.events.push(PlaybackEvent::CurrentStitch {
                stitch: self.current,
                command,
            });
        }
    }

    /// Record how long the last render pass took, to pace the following ticks.
    pub fn record_frame_duration(&mut self, took: Duration) {
        self.last_frame_duration = took;
    }

    /// Seconds between ticks: no faster than the frame cap, than rendering allows, or than one
    /// stitch per tick at the current speed.
    pub fn frame_period(&self) -> f64 {
        self.target_frame_period
            .max(self.last_frame_duration.as_secs_f64())
            .max(1.0 / f64::from(self.speed.max(1)))
    }

    /// Stitches to advance in a tick lasting `frame_period` seconds.
    pub fn stitch_increment(&self, frame_period: f64) -> u64 {
        (f64::from(self.speed) * frame_period + INCREMENT_EPSILON).floor() as u64
    }

    /// Return `true` when `ticket` belongs to the live tick chain.
    pub fn accepts(&self, ticket: TickTicket) -> bool {
        ticket.epoch == self.epoch && self.running
    }

    /// Run one tick. Returns the delay before the next tick with the same ticket, or `None` when
    /// the ticket is stale or playback stopped during this tick.
    pub fn advance(&mut self, ticket: TickTicket) -> Option<Duration> {
        if !self.accepts(ticket) {
            tracing::trace!(
                ticket = ticket.epoch,
                epoch = self.epoch,
                "dropping stale tick"
            );
            return None;
        }

        let period = self.frame_period();
        let increment = i64::try_from(self.stitch_increment(period)).unwrap_or(i64::MAX);
        let current = i64::try_from(self.current).unwrap_or(i64::MAX);
        self.set_current_stitch(
            current.saturating_add(self.direction.sign().saturating_mul(increment)),
        );
        tracing::trace!(stitch = self.current, period, increment, "tick");

        if self.running {
            Some(Duration::from_secs_f64(period))
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/playback/playback.rs"]
mod tests;

use crate::config::SimulatorOpts;
use crate::foundation::core::{Point, Rgba8, Size};
use crate::plan::model::{Stitch, StitchPlan};

/// What the machine does at a stitch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Regular stitch.
    Stitch,
    /// Move without sewing.
    Jump,
    /// Thread cut.
    Trim,
    /// Machine pause.
    Stop,
    /// Thread color switch.
    ColorChange,
}

impl Command {
    /// All commands, in label order.
    pub const ALL: [Command; 5] = [
        Command::Stitch,
        Command::Jump,
        Command::Trim,
        Command::Stop,
        Command::ColorChange,
    ];

    /// Classify a stitch. When several flags are set, TRIM > JUMP > STOP > COLOR_CHANGE.
    pub fn classify(stitch: &Stitch) -> Self {
        if stitch.trim {
            Command::Trim
        } else if stitch.jump {
            Command::Jump
        } else if stitch.stop {
            Command::Stop
        } else if stitch.color_change {
            Command::ColorChange
        } else {
            Command::Stitch
        }
    }

    /// Human-facing label shown next to the stitch counter.
    pub fn label(self) -> &'static str {
        match self {
            Command::Stitch => "STITCH",
            Command::Jump => "JUMP",
            Command::Trim => "TRIM",
            Command::Stop => "STOP",
            Command::ColorChange => "COLOR CHANGE",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Stroke settings for one segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pen {
    /// Stroke color.
    pub color: Rgba8,
    /// Stroke width in the units of the current transform.
    pub width: f64,
}

/// A contiguous run of stitches drawn with one pen.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// Pen for the whole run.
    pub pen: Pen,
    /// Design-space points, in sewing order.
    pub points: Vec<Point>,
}

impl Segment {
    /// Number of stitches in the run.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return `true` when the run holds no stitches.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Flattened, immutable view of a loaded stitch plan.
///
/// Stitch numbers are 1-based to match the human-facing counter: slot 0 of `positions` and
/// `commands` is a placeholder and never refers to a real stitch. Positions are shifted so the
/// design's bounding box starts at the origin.
#[derive(Clone, Debug)]
pub struct StitchIndex {
    positions: Vec<Point>,
    commands: Vec<Command>,
    segments: Vec<Segment>,
    design_size: Size,
}

/// Open segment being filled while walking a color block.
struct SegmentAccumulator {
    pen: Pen,
    open: Vec<Point>,
}

impl SegmentAccumulator {
    fn new(pen: Pen) -> Self {
        Self {
            pen,
            open: Vec::new(),
        }
    }

    fn push(&mut self, p: Point) {
        self.open.push(p);
    }

    /// Emit the open run (if any) and start a fresh one.
    fn close(&mut self, out: &mut Vec<Segment>) {
        if self.open.is_empty() {
            return;
        }
        out.push(Segment {
            pen: self.pen,
            points: std::mem::take(&mut self.open),
        });
    }
}

impl StitchIndex {
    /// Flatten `plan` into positions, commands and pen segments.
    #[tracing::instrument(skip_all, fields(blocks = plan.blocks.len()))]
    pub fn build(plan: &StitchPlan, opts: &SimulatorOpts) -> Self {
        let bbox = plan.bounding_box();
        let origin = bbox.map(|r| r.origin()).unwrap_or(Point::ZERO);
        let design_size = bbox.map(|r| r.size()).unwrap_or(Size::ZERO);

        let n = plan.num_stitches();
        let mut positions = Vec::with_capacity(n + 1);
        let mut commands = Vec::with_capacity(n + 1);
        positions.push(Point::ZERO);
        commands.push(Command::Stitch);

        let mut segments = Vec::new();
        let width = opts.thread_width();

        for block in &plan.blocks {
            let pen = Pen {
                color: block.color.visible_on_white(),
                width,
            };
            let mut acc = SegmentAccumulator::new(pen);

            for stitch in &block.stitches {
                let p = Point::new(stitch.x - origin.x, stitch.y - origin.y);
                positions.push(p);
                commands.push(Command::classify(stitch));
                acc.push(p);

                if stitch.trim || stitch.stop || stitch.color_change {
                    acc.close(&mut segments);
                }
            }
            acc.close(&mut segments);
        }

        tracing::debug!(
            stitches = n,
            segments = segments.len(),
            "built stitch index"
        );

        Self {
            positions,
            commands,
            segments,
            design_size,
        }
    }

    /// Number of real stitches.
    pub fn num_stitches(&self) -> usize {
        self.positions.len() - 1
    }

    /// Return `true` when the plan has no stitches.
    pub fn is_empty(&self) -> bool {
        self.num_stitches() == 0
    }

    /// All positions including the placeholder at slot 0.
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// All commands including the placeholder at slot 0.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Pen segments in sewing order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Width and height of the design's bounding box.
    pub fn design_size(&self) -> Size {
        self.design_size
    }

    /// Position of 1-based stitch `n`.
    pub fn position(&self, n: usize) -> Option<Point> {
        if n == 0 {
            return None;
        }
        self.positions.get(n).copied()
    }

    /// Command of 1-based stitch `n`.
    pub fn command_at(&self, n: usize) -> Option<Command> {
        if n == 0 {
            return None;
        }
        self.commands.get(n).copied()
    }

    /// How many stitches carry each command, in [`Command::ALL`] order.
    pub fn command_histogram(&self) -> [(Command, usize); 5] {
        Command::ALL.map(|c| (c, self.commands[1..].iter().filter(|&&x| x == c).count()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/index.rs"]
mod tests;

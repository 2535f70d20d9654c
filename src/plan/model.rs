use std::io::Read;

use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{NeedleError, NeedleResult};

/// One needle penetration, in design-space units.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stitch {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Cut the thread after this stitch.
    #[serde(default, skip_serializing_if = "is_false")]
    pub trim: bool,
    /// Move without stitching.
    #[serde(default, skip_serializing_if = "is_false")]
    pub jump: bool,
    /// Pause the machine.
    #[serde(default, skip_serializing_if = "is_false")]
    pub stop: bool,
    /// Switch to the next thread color.
    #[serde(default, skip_serializing_if = "is_false")]
    pub color_change: bool,
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl Stitch {
    /// A plain stitch at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Builder-style trim flag.
    pub fn with_trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Builder-style jump flag.
    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }

    /// Builder-style stop flag.
    pub fn with_stop(mut self) -> Self {
        self.stop = true;
        self
    }

    /// Builder-style color-change flag.
    pub fn with_color_change(mut self) -> Self {
        self.color_change = true;
        self
    }

    /// Position as a point.
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A run of stitches sewn with one thread color.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorBlock {
    /// Thread color.
    pub color: Rgba8,
    /// Stitches in sewing order.
    #[serde(default)]
    pub stitches: Vec<Stitch>,
}

/// A complete embroidery run as produced by the stitch plan provider.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StitchPlan {
    /// Color blocks in sewing order.
    #[serde(default)]
    pub blocks: Vec<ColorBlock>,
    /// Provider-supplied `[min_x, min_y, max_x, max_y]`. Computed from the stitches when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<[f64; 4]>,
}

impl StitchPlan {
    /// Build a plan from blocks, leaving the bounding box to be computed.
    pub fn new(blocks: Vec<ColorBlock>) -> Self {
        Self {
            blocks,
            bounding_box: None,
        }
    }

    /// Parse and validate a JSON plan.
    pub fn from_json_str(s: &str) -> NeedleResult<Self> {
        let plan: Self = serde_json::from_str(s).map_err(|e| NeedleError::serde(e.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    /// Parse and validate a JSON plan from a reader.
    pub fn from_reader(r: impl Read) -> NeedleResult<Self> {
        let plan: Self =
            serde_json::from_reader(r).map_err(|e| NeedleError::serde(e.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    /// Check that every coordinate is finite and the bounding box is well formed.
    pub fn validate(&self) -> NeedleResult<()> {
        for (bi, block) in self.blocks.iter().enumerate() {
            for (si, s) in block.stitches.iter().enumerate() {
                if !(s.x.is_finite() && s.y.is_finite()) {
                    return Err(NeedleError::validation(format!(
                        "block {bi} stitch {si} has a non-finite coordinate"
                    )));
                }
            }
        }
        if let Some([x0, y0, x1, y1]) = self.bounding_box {
            if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
                return Err(NeedleError::validation("bounding_box must be finite"));
            }
            if x0 > x1 || y0 > y1 {
                return Err(NeedleError::validation(
                    "bounding_box min must be <= max on both axes",
                ));
            }
        }
        Ok(())
    }

    /// Total stitches over all blocks.
    pub fn num_stitches(&self) -> usize {
        self.blocks.iter().map(|b| b.stitches.len()).sum()
    }

    /// Iterate every stitch in sewing order.
    pub fn stitches(&self) -> impl Iterator<Item = &Stitch> {
        self.blocks.iter().flat_map(|b| b.stitches.iter())
    }

    /// Bounding box of the design; `None` for a plan without stitches and without an explicit box.
    pub fn bounding_box(&self) -> Option<Rect> {
        if let Some([x0, y0, x1, y1]) = self.bounding_box {
            return Some(Rect::new(x0, y0, x1, y1));
        }
        let mut it = self.stitches();
        let first = it.next()?;
        let init = Rect::from_points(first.point(), first.point());
        Some(it.fold(init, |r, s| r.union_pt(s.point())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/model.rs"]
mod tests;

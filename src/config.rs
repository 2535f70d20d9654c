use crate::foundation::core::Rgba8;
use crate::foundation::error::{NeedleError, NeedleResult};

/// Tunables for a playback session.
///
/// `Default` gives the stock simulator behavior; [`SimulatorOpts::from_env`] overlays
/// `NEEDLEPATH_*` environment variables on top of it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimulatorOpts {
    /// Never render more frames per second than this.
    pub target_fps: u32,
    /// Initial playback speed in stitches per second.
    pub stitches_per_second: u32,
    /// If set, the speed is chosen on load so the whole plan plays in this many seconds.
    pub target_duration_secs: Option<f64>,
    /// Margin (design units) added to the design size when fitting it to the panel.
    pub padding: f64,
    /// Half-length of the crosshair arms, in screen pixels.
    pub crosshair_radius_px: f64,
    /// Zoom factor applied per forward wheel notch.
    pub wheel_zoom_in: f64,
    /// Zoom factor applied per backward wheel notch.
    pub wheel_zoom_out: f64,
    /// Drawn thread thickness in millimeters.
    ///
    /// Thinner than real thread (~0.4mm) so individual stitches stay distinguishable.
    pub thread_width_mm: f64,
    /// Design units per millimeter.
    pub pixels_per_mm: f64,
    /// Canvas background.
    pub background: Rgba8,
    /// Crosshair color.
    pub crosshair_color: Rgba8,
}

impl Default for SimulatorOpts {
    fn default() -> Self {
        Self {
            target_fps: 30,
            stitches_per_second: 16,
            target_duration_secs: None,
            padding: 10.0,
            crosshair_radius_px: 10.0,
            wheel_zoom_in: 1.03,
            wheel_zoom_out: 0.97,
            thread_width_mm: 0.1,
            pixels_per_mm: 96.0 / 25.4,
            background: Rgba8::WHITE,
            crosshair_color: Rgba8::rgb(128, 128, 128),
        }
    }
}

impl SimulatorOpts {
    /// Defaults overlaid with `NEEDLEPATH_TARGET_FPS`, `NEEDLEPATH_SPEED` and
    /// `NEEDLEPATH_TARGET_DURATION`. Unparsable or non-positive values are ignored.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values looked up through `lookup` (an environment accessor).
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(fps) = lookup("NEEDLEPATH_TARGET_FPS")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
        {
            self.target_fps = fps;
        }
        if let Some(speed) = lookup("NEEDLEPATH_SPEED")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
        {
            self.stitches_per_second = speed;
        }
        if let Some(secs) = lookup("NEEDLEPATH_TARGET_DURATION")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
        {
            self.target_duration_secs = Some(secs);
        }
        self
    }

    /// Reject option values the engine cannot work with.
    pub fn validate(&self) -> NeedleResult<()> {
        if self.target_fps == 0 {
            return Err(NeedleError::validation("target_fps must be > 0"));
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(NeedleError::validation("padding must be finite and >= 0"));
        }
        for (name, f) in [
            ("wheel_zoom_in", self.wheel_zoom_in),
            ("wheel_zoom_out", self.wheel_zoom_out),
        ] {
            if !(f.is_finite() && f > 0.0) {
                return Err(NeedleError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if !(self.crosshair_radius_px.is_finite() && self.crosshair_radius_px >= 0.0) {
            return Err(NeedleError::validation(
                "crosshair_radius_px must be finite and >= 0",
            ));
        }
        if let Some(secs) = self.target_duration_secs
            && !(secs.is_finite() && secs > 0.0)
        {
            return Err(NeedleError::validation(
                "target_duration_secs must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// Minimum time between two rendered frames.
    pub fn target_frame_period(&self) -> f64 {
        1.0 / f64::from(self.target_fps.max(1))
    }

    /// Pen width in design units.
    pub fn thread_width(&self) -> f64 {
        self.thread_width_mm * self.pixels_per_mm
    }

    /// Speed to start a freshly loaded plan with.
    pub fn initial_speed(&self, num_stitches: usize) -> u32 {
        match self.target_duration_secs {
            Some(secs) if secs > 0.0 => {
                let v = (num_stitches as f64 / secs).floor();
                v.clamp(1.0, f64::from(u32::MAX)) as u32
            }
            _ => self.stitches_per_second.max(1),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/opts.rs"]
mod tests;

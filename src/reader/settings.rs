//! Reader settings: frame rate, interpolation and timing.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::util::{Chrono, Error, Result};

/// Transform and point interpolation between stored samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Use the floor sample.
    #[default]
    Off,
    /// Blend the bracketing samples.
    Linear,
}

/// Which frame drives sampling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// The host's output frame.
    #[default]
    Original,
    /// [`ReadSettings::retime_frame`], e.g. a held or remapped frame.
    Retime,
}

/// Settings of one archive reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadSettings {
    pub fps: f64,
    pub interpolation: Interpolation,
    pub timing: Timing,
    /// First frame of the sampled range; later frames clamp to it.
    pub first_frame: i32,
    /// Last frame of the sampled range.
    pub last_frame: i32,
    /// Frame sampled in [`Timing::Retime`] mode.
    pub retime_frame: f64,
}

impl Default for ReadSettings {
    fn default() -> Self {
        Self {
            fps: 24.0,
            interpolation: Interpolation::Off,
            timing: Timing::Original,
            first_frame: 1,
            last_frame: 1,
            retime_frame: 1.0,
        }
    }
}

impl ReadSettings {
    /// Check values a reader cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(Error::InvalidSettings(format!(
                "fps must be positive, got {}",
                self.fps
            )));
        }
        if !self.retime_frame.is_finite() {
            return Err(Error::InvalidSettings("retime_frame is not finite".into()));
        }
        Ok(())
    }

    /// Load and validate settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let settings: Self = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn interpolate(&self) -> bool {
        self.interpolation == Interpolation::Linear
    }

    /// Frame actually sampled for `output_frame`, clamped into
    /// `[first_frame, last_frame]` (swapped if inverted).
    pub fn sample_frame(&self, output_frame: f64) -> f64 {
        let frame = match self.timing {
            Timing::Original => output_frame,
            Timing::Retime => self.retime_frame,
        };
        let lo = self.first_frame.min(self.last_frame) as f64;
        let hi = self.first_frame.max(self.last_frame) as f64;
        frame.clamp(lo, hi)
    }

    /// Archive time sampled for `output_frame`.
    pub fn sample_time(&self, output_frame: f64) -> Chrono {
        self.sample_frame(output_frame) / self.fps
    }

    /// Set the frame range from an archive time span.
    pub fn set_range_from_span(&mut self, span: (Chrono, Chrono)) {
        let (first, last) = frame_range(span, self.fps);
        self.first_frame = first;
        self.last_frame = last;
    }
}

/// Frames covering a time span, rounded to the nearest frame.
pub fn frame_range(span: (Chrono, Chrono), fps: f64) -> (i32, i32) {
    let to_frame = |t: Chrono| (t * fps + 0.5).floor() as i32;
    (to_frame(span.0), to_frame(span.1))
}

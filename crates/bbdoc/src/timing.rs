//! Frame count durations for the `frames` tag.

use std::fmt::{Display, Formatter};

const DEFAULT_FPS: f64 = 60.0;

/// A frame count at a frame rate, written as `N@FPS` in markup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCount {
    pub frames: i64,
    pub fps: f64,
}

impl FrameCount {
    /// Never fails. Unparsable frame counts are 0, missing, unparsable or non-positive frame rates
    /// are 60.
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split('@');
        let frames = parts
            .next()
            .and_then(|n| n.trim().parse::<i64>().ok())
            .unwrap_or(0);
        let fps = parts
            .next()
            .and_then(parse_invariant_f64)
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .unwrap_or(DEFAULT_FPS);

        FrameCount { frames, fps }
    }

    /// Duration in centiseconds, rounded half away from zero.
    pub fn centiseconds(&self) -> i64 {
        (self.frames as f64 / self.fps * 100.0).round() as i64
    }

    pub fn duration(&self) -> Duration {
        Duration(self.centiseconds())
    }

    /// `N Frames @FPS FPS`, used as the tooltip of the rendered duration.
    pub fn description(&self) -> String {
        format!("{} Frames @{} FPS", self.frames, self.fps)
    }
}

/// A duration in centiseconds, displayed as `[D:][H:]MM:SS[.cc]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub i64);

impl Display for Duration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 < 0 {
            f.write_str("-")?;
        }
        let total = self.0.unsigned_abs();
        let fraction = total % 100;
        let seconds = total / 100 % 60;
        let minutes = total / 6_000 % 60;
        let hours = total / 360_000 % 24;
        let days = total / 8_640_000;

        if days > 0 {
            write!(f, "{days}:{hours:02}:")?;
        } else if hours > 0 {
            write!(f, "{hours}:")?;
        }
        write!(f, "{minutes:02}:{seconds:02}")?;
        if fraction > 0 {
            write!(f, ".{fraction:02}")?;
        }
        Ok(())
    }
}

/// Parses a float the culture-invariant way: surrounding whitespace, a sign, an exponent and
/// `,` group separators in the integer part are accepted.
pub fn parse_invariant_f64(text: &str) -> Option<f64> {
    let text = text.trim();
    let split = text.find(&['.', 'e', 'E'][..]).unwrap_or(text.len());
    let (integer, rest) = text.split_at(split);
    if rest.contains(',') || integer.starts_with(',') {
        return None;
    }
    let cleaned: String = integer.chars().filter(|c| *c != ',').chain(rest.chars()).collect();
    if !cleaned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    cleaned.parse().ok()
}

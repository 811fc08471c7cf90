//! Watermark request types.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use fastmark_common::error::{FastmarkError, FastmarkResult};
use serde::{Deserialize, Serialize};

use crate::anchor::Anchor;

/// Appended to the source file stem to name the output.
pub const OUTPUT_SUFFIX: &str = "_watermark";

/// Container extension of every output file.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Overlay width relative to the video width, as `(numerator, denominator)`.
/// Levels 1..=5 map to 1, 1/1.2, 1/1.5, 1/2, 1/2.5.
const SHRINK_FACTORS: [(u32, u32); 5] = [(1, 1), (5, 6), (2, 3), (1, 2), (2, 5)];

/// Overlay size level: 1 is the biggest, 5 the smallest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SizeLevel(u8);

impl SizeLevel {
    pub const BIGGEST: SizeLevel = SizeLevel(1);
    pub const SMALLEST: SizeLevel = SizeLevel(5);

    pub fn new(level: u8) -> FastmarkResult<Self> {
        if (1..=5).contains(&level) {
            Ok(Self(level))
        } else {
            Err(FastmarkError::validation(format!(
                "Invalid size level {level}. Choose a level from 1 (biggest) to 5 (smallest)."
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Shrink factor applied to the video dimensions.
    pub fn factor(self) -> f64 {
        let (num, den) = SHRINK_FACTORS[self.0 as usize - 1];
        num as f64 / den as f64
    }

    /// `dimension * factor`, rounded toward zero.
    pub fn scale(self, dimension: u32) -> u32 {
        let (num, den) = SHRINK_FACTORS[self.0 as usize - 1];
        (dimension as u64 * num as u64 / den as u64) as u32
    }
}

impl Default for SizeLevel {
    fn default() -> Self {
        Self::BIGGEST
    }
}

impl TryFrom<u8> for SizeLevel {
    type Error = FastmarkError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<SizeLevel> for u8 {
    fn from(level: SizeLevel) -> Self {
        level.0
    }
}

impl fmt::Display for SizeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// When the overlay is shown, in whole seconds.
///
/// Without a duration the overlay covers the whole video and `start_secs`
/// has no effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_secs: u32,
    pub duration_secs: Option<u32>,
}

impl TimeWindow {
    /// Whole video.
    pub fn full() -> Self {
        Self::default()
    }

    /// A zero duration means the whole video.
    pub fn new(start_secs: u32, duration_secs: Option<u32>) -> Self {
        Self {
            start_secs,
            duration_secs: duration_secs.filter(|d| *d > 0),
        }
    }

    pub fn is_limited(&self) -> bool {
        self.duration_secs.is_some()
    }

    /// Exclusive end of the visible interval.
    pub fn end_secs(&self) -> Option<u32> {
        self.duration_secs
            .map(|d| self.start_secs.saturating_add(d))
    }

    /// Fit the window inside a video of the given length.
    ///
    /// Returns the adjusted window and whether the duration was shortened.
    /// A start at or past the end of the video is rejected. Unknown video
    /// length leaves the window unchanged.
    pub fn fit_to(self, video_duration_secs: Option<f64>) -> FastmarkResult<(Self, bool)> {
        let (Some(duration), Some(total)) = (self.duration_secs, video_duration_secs) else {
            return Ok((self, false));
        };
        if !total.is_finite() || total <= 0.0 {
            return Ok((self, false));
        }

        if self.start_secs as f64 >= total {
            return Err(FastmarkError::validation(format!(
                "Start time {}s is beyond the end of the video ({total:.2}s)",
                self.start_secs
            )));
        }

        let remaining = (total - self.start_secs as f64).ceil() as u32;
        if duration > remaining {
            Ok((
                Self {
                    start_secs: self.start_secs,
                    duration_secs: Some(remaining),
                },
                true,
            ))
        } else {
            Ok((self, false))
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.duration_secs {
            Some(d) => write!(f, "{}s for {}s", self.start_secs, d),
            None => f.write_str("full video"),
        }
    }
}

/// Everything needed to watermark one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkRequest {
    /// Source video.
    pub video: PathBuf,

    /// Overlay image.
    pub watermark: PathBuf,

    #[serde(default)]
    pub anchor: Anchor,

    #[serde(default)]
    pub window: TimeWindow,

    #[serde(default)]
    pub size: SizeLevel,
}

impl WatermarkRequest {
    pub fn new(video: impl Into<PathBuf>, watermark: impl Into<PathBuf>) -> Self {
        Self {
            video: video.into(),
            watermark: watermark.into(),
            anchor: Anchor::default(),
            window: TimeWindow::full(),
            size: SizeLevel::default(),
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_size(mut self, size: SizeLevel) -> Self {
        self.size = size;
        self
    }

    /// Where the watermarked video is written.
    pub fn output_path(&self) -> PathBuf {
        output_path_for(&self.video)
    }
}

/// `dir/name.ext` → `dir/name_watermark.mp4`.
///
/// Deterministic: the same source always maps to the same output.
pub fn output_path_for(video: &Path) -> PathBuf {
    let mut name = OsString::new();
    if let Some(stem) = video.file_stem() {
        name.push(stem);
    }
    name.push(OUTPUT_SUFFIX);
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    video.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_level_bounds() {
        assert!(SizeLevel::new(0).is_err());
        assert!(SizeLevel::new(6).is_err());
        for level in 1..=5 {
            assert_eq!(SizeLevel::new(level).unwrap().get(), level);
        }
    }

    #[test]
    fn test_size_level_widths_for_1080p() {
        let widths: Vec<u32> = (1..=5)
            .map(|l| SizeLevel::new(l).unwrap().scale(1920))
            .collect();
        assert_eq!(widths, vec![1920, 1600, 1280, 960, 768]);
    }

    #[test]
    fn test_size_level_truncates() {
        // 1001 / 1.2 = 834.17, 1001 / 2.5 = 400.4
        assert_eq!(SizeLevel::new(2).unwrap().scale(1001), 834);
        assert_eq!(SizeLevel::new(5).unwrap().scale(1001), 400);
    }

    #[test]
    fn test_size_level_factor() {
        assert!((SizeLevel::new(3).unwrap().factor() - 1.0 / 1.5).abs() < 1e-12);
        assert!((SizeLevel::SMALLEST.factor() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_size_level_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<SizeLevel>("3").is_ok());
        assert!(serde_json::from_str::<SizeLevel>("9").is_err());
    }

    #[test]
    fn test_zero_duration_means_full_video() {
        assert_eq!(TimeWindow::new(4, Some(0)), TimeWindow::new(4, None));
        assert!(!TimeWindow::new(4, Some(0)).is_limited());
    }

    #[test]
    fn test_window_end() {
        assert_eq!(TimeWindow::new(3, Some(5)).end_secs(), Some(8));
        assert_eq!(TimeWindow::full().end_secs(), None);
    }

    #[test]
    fn test_fit_leaves_short_window() {
        let (w, clamped) = TimeWindow::new(3, Some(5)).fit_to(Some(20.0)).unwrap();
        assert_eq!(w, TimeWindow::new(3, Some(5)));
        assert!(!clamped);
    }

    #[test]
    fn test_fit_clamps_overlong_window() {
        let (w, clamped) = TimeWindow::new(8, Some(10)).fit_to(Some(12.5)).unwrap();
        assert_eq!(w, TimeWindow::new(8, Some(5)));
        assert!(clamped);
    }

    #[test]
    fn test_fit_rejects_start_past_end() {
        let err = TimeWindow::new(30, Some(5)).fit_to(Some(30.0)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_fit_ignores_unknown_duration_and_full_window() {
        let w = TimeWindow::new(30, Some(5));
        assert_eq!(w.fit_to(None).unwrap(), (w, false));
        let full = TimeWindow::new(300, None);
        assert_eq!(full.fit_to(Some(10.0)).unwrap(), (full, false));
    }

    #[test]
    fn test_output_path_replaces_extension() {
        assert_eq!(
            output_path_for(Path::new("/videos/holiday.mov")),
            PathBuf::from("/videos/holiday_watermark.mp4")
        );
        assert_eq!(
            output_path_for(Path::new("clip.mp4")),
            PathBuf::from("clip_watermark.mp4")
        );
    }

    #[test]
    fn test_output_path_only_strips_last_extension() {
        assert_eq!(
            output_path_for(Path::new("a/b.c/movie.final.avi")),
            PathBuf::from("a/b.c/movie.final_watermark.mp4")
        );
        assert_eq!(
            output_path_for(Path::new("noext")),
            PathBuf::from("noext_watermark.mp4")
        );
    }

    #[test]
    fn test_request_defaults() {
        let req = WatermarkRequest::new("in.mp4", "logo.png");
        assert_eq!(req.anchor, Anchor::TopLeft);
        assert_eq!(req.size, SizeLevel::BIGGEST);
        assert_eq!(req.window, TimeWindow::full());
        assert_eq!(req.output_path(), PathBuf::from("in_watermark.mp4"));
    }
}

//! Shared types for the visdiff analysis engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::contour::RegionExtractorKind;

/// Re-export `GrayImage` so downstream crates can reference
/// divergence masks without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can pass decoded
/// reference/test images without depending on `image` directly.
pub use image::RgbImage;

/// A pixel position in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: u32,
    /// Vertical position (pixels from top edge).
    pub y: u32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of an RGB image.
    #[must_use]
    pub fn of(image: &RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    /// Total pixel count (`width * height`).
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if either side is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Selects which comparison method to run.
///
/// This is a closed set: external identifiers are parsed with
/// [`FromStr`], and anything outside `absdiff`, `histogram`, `ssim`
/// fails with [`AnalysisError::UnknownMethod`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    /// Pixel-wise absolute difference with region highlighting.
    AbsDiff,
    /// Global grayscale histogram correlation (no spatial output).
    Histogram,
    /// Structural similarity index with region highlighting.
    Ssim,
}

impl MethodKind {
    /// All methods in canonical order.
    pub const ALL: [Self; 3] = [Self::AbsDiff, Self::Histogram, Self::Ssim];

    /// Stable identifier used on the command line and in serialized output.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::AbsDiff => "absdiff",
            Self::Histogram => "histogram",
            Self::Ssim => "ssim",
        }
    }

    /// Human-readable label for reports.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AbsDiff => "Absolute Pixel Difference (AbsDiff)",
            Self::Histogram => "Histogram Comparison (Correlation)",
            Self::Ssim => "Structural Similarity Index (SSIM)",
        }
    }

    /// Whether this method produces a highlighted result image.
    #[must_use]
    pub const fn produces_image(self) -> bool {
        match self {
            Self::AbsDiff | Self::Ssim => true,
            Self::Histogram => false,
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for MethodKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| AnalysisError::UnknownMethod(s.to_string()))
    }
}

/// Configuration for the analysis methods.
///
/// Defaults reproduce the fixed constants the comparison tool has always
/// used: an AbsDiff sensitivity of 10, an SSIM similarity threshold of
/// 220 (about 0.86 on the 0-1 scale), a 7x7 SSIM window, and a pure red
/// overlay blended at 0.7 opacity.
///
/// Fields are public; call [`validate`](Self::validate) (dispatch does so
/// automatically) to reject out-of-range values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// AbsDiff sensitivity on the 0-255 scale. Difference intensities
    /// strictly above this value are marked as differing.
    pub absdiff_threshold: u8,

    /// SSIM similarity threshold on the 0-255 scale. Rescaled local
    /// similarities at or below this value are marked as differing.
    pub ssim_threshold: u8,

    /// Side length of the square SSIM sliding window. Must be odd and at
    /// least 3.
    pub ssim_window: u32,

    /// Overlay fill colour for highlighted regions.
    pub highlight_color: [u8; 3],

    /// Weight of the overlay in the blend (`0.0..=1.0`).
    pub overlay_opacity: f64,

    /// Which region extraction algorithm to use.
    pub region_extractor: RegionExtractorKind,
}

impl AnalysisConfig {
    /// Default AbsDiff sensitivity.
    pub const DEFAULT_ABSDIFF_THRESHOLD: u8 = 10;
    /// Default SSIM similarity threshold.
    pub const DEFAULT_SSIM_THRESHOLD: u8 = 220;
    /// Default SSIM window side.
    pub const DEFAULT_SSIM_WINDOW: u32 = 7;
    /// Default highlight colour (pure red).
    pub const DEFAULT_HIGHLIGHT_COLOR: [u8; 3] = [255, 0, 0];
    /// Default overlay opacity.
    pub const DEFAULT_OVERLAY_OPACITY: f64 = 0.7;

    /// Check field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] if the overlay opacity is
    /// outside `0.0..=1.0` or the SSIM window is even or smaller than 3.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(AnalysisError::InvalidConfig(format!(
                "overlay_opacity must be within 0.0..=1.0, got {}",
                self.overlay_opacity
            )));
        }
        if self.ssim_window < 3 || self.ssim_window % 2 == 0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "ssim_window must be odd and at least 3, got {}",
                self.ssim_window
            )));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            absdiff_threshold: Self::DEFAULT_ABSDIFF_THRESHOLD,
            ssim_threshold: Self::DEFAULT_SSIM_THRESHOLD,
            ssim_window: Self::DEFAULT_SSIM_WINDOW,
            highlight_color: Self::DEFAULT_HIGHLIGHT_COLOR,
            overlay_opacity: Self::DEFAULT_OVERLAY_OPACITY,
            region_extractor: RegionExtractorKind::default(),
        }
    }
}

/// Errors that can occur during analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The method identifier is not one of `absdiff`, `histogram`, `ssim`.
    #[error("unknown analysis method: {0}")]
    UnknownMethod(String),

    /// Reference and test images have different dimensions.
    #[error("image dimensions differ: reference {reference}, test {test}")]
    ShapeMismatch {
        /// Reference image dimensions.
        reference: Dimensions,
        /// Test image dimensions.
        test: Dimensions,
    },

    /// The images cannot be analyzed (e.g. empty, or too small for the
    /// SSIM window).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Analysis configuration is invalid.
    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),
}

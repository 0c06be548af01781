//! Analysis outputs: per-method metrics, single results, and multi-method runs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::Verdict;
use crate::diagnostics::duration_serde;
use crate::types::{MethodKind, RgbImage};

/// Metrics produced by the AbsDiff method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsDiffMetrics {
    /// Number of external differing regions.
    pub num_differences: usize,
    /// Image area (`width * height`).
    pub total_pixels: u64,
    /// Pixels set in the divergence mask.
    pub differing_pixels: u64,
    /// `differing_pixels / total_pixels * 100`.
    pub difference_percentage: f64,
}

/// Metrics produced by the Histogram method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramMetrics {
    /// Correlation of the normalized grayscale histograms, in `[-1, 1]`.
    pub histogram_correlation: f64,
}

/// Metrics produced by the SSIM method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SsimMetrics {
    /// Global structural similarity, in `[0, 1]`.
    pub ssim_index: f64,
    /// Number of external regions with low local similarity.
    pub num_differences: usize,
}

/// Method-specific metrics.
///
/// Each variant carries exactly the fields its method defines, so
/// consumers pattern-match instead of probing for optional keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Metrics {
    /// AbsDiff metrics.
    AbsDiff(AbsDiffMetrics),
    /// Histogram metrics.
    Histogram(HistogramMetrics),
    /// SSIM metrics.
    Ssim(SsimMetrics),
}

impl Metrics {
    /// The method these metrics belong to.
    #[must_use]
    pub const fn method(&self) -> MethodKind {
        match self {
            Self::AbsDiff(_) => MethodKind::AbsDiff,
            Self::Histogram(_) => MethodKind::Histogram,
            Self::Ssim(_) => MethodKind::Ssim,
        }
    }

    /// Region count, or `None` for methods without a spatial region concept.
    #[must_use]
    pub const fn num_differences(&self) -> Option<usize> {
        match self {
            Self::AbsDiff(m) => Some(m.num_differences),
            Self::Histogram(_) => None,
            Self::Ssim(m) => Some(m.num_differences),
        }
    }

    /// Name and value of the metric the classifier reads.
    #[must_use]
    pub const fn key_metric(&self) -> (&'static str, f64) {
        match self {
            Self::AbsDiff(m) => ("difference_percentage", m.difference_percentage),
            Self::Histogram(m) => ("histogram_correlation", m.histogram_correlation),
            Self::Ssim(m) => ("ssim_index", m.ssim_index),
        }
    }
}

/// What a method produces before dispatch adds timing and a verdict.
#[derive(Debug, Clone)]
pub struct MethodOutput {
    /// Highlighted copy of the test image, for methods that localize.
    pub result_image: Option<RgbImage>,
    /// Method metrics.
    pub metrics: Metrics,
}

/// Outcome of one method invocation.
///
/// `result_image` is not serialized; persisting it is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Which method ran.
    pub method: MethodKind,
    /// Human-readable method label.
    pub description: String,
    /// Highlighted copy of the test image (`None` for Histogram).
    #[serde(skip)]
    pub result_image: Option<RgbImage>,
    /// Method metrics.
    pub metrics: Metrics,
    /// Qualitative classification of the key metric.
    pub verdict: Verdict,
    /// Wall-clock time spent in the method (seconds when serialized).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Ordered results of running several methods on the same image pair.
///
/// Built once by the orchestrator; exposed read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiMethodRun {
    session_id: Option<String>,
    results: Vec<AnalysisResult>,
    #[serde(with = "duration_serde")]
    total_duration: Duration,
}

impl MultiMethodRun {
    pub(crate) const fn new(
        session_id: Option<String>,
        results: Vec<AnalysisResult>,
        total_duration: Duration,
    ) -> Self {
        Self {
            session_id,
            results,
            total_duration,
        }
    }

    /// Session identifier supplied by the caller, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Results in the order the methods were requested.
    #[must_use]
    pub fn results(&self) -> &[AnalysisResult] {
        &self.results
    }

    /// Sum of the per-method durations.
    #[must_use]
    pub const fn total_duration(&self) -> Duration {
        self.total_duration
    }

    /// Result for a given method, if it was part of the run.
    #[must_use]
    pub fn get(&self, method: MethodKind) -> Option<&AnalysisResult> {
        self.results.iter().find(|r| r.method == method)
    }
}

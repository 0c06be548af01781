//! visdiff-core: Pure difference-analysis engine (sans-IO).
//!
//! Compares a reference image against a test image with one or more
//! methods:
//!
//! - **AbsDiff**: pixel-wise absolute difference -> grayscale ->
//!   threshold -> region extraction -> highlight overlay.
//! - **Histogram**: correlation of normalized grayscale histograms.
//! - **SSIM**: structural similarity map -> inverted threshold ->
//!   region extraction -> highlight overlay.
//!
//! Every result is classified into a [`Verdict`] and timed.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! [`RgbImage`] buffers and returns structured data. Decoding, persisting
//! result images, and rendering reports live in the `visdiff` and
//! `visdiff-report` crates.

pub mod classify;
pub mod contour;
pub mod diagnostics;
pub mod grayscale;
pub mod histogram;
pub mod method;
pub mod orchestrator;
pub mod overlay;
pub mod result;
pub mod ssim;
pub mod threshold;
pub mod types;

pub use classify::{Verdict, classify, classify_by_name};
pub use contour::{Region, RegionExtractor, RegionExtractorKind};
pub use diagnostics::{Clock, SystemClock};
pub use method::AnalysisMethod;
pub use orchestrator::Orchestrator;
pub use result::{
    AbsDiffMetrics, AnalysisResult, HistogramMetrics, Metrics, MethodOutput, MultiMethodRun,
    SsimMetrics,
};
pub use types::{AnalysisConfig, AnalysisError, Dimensions, GrayImage, MethodKind, Point, RgbImage};

/// Run one method with the default configuration.
///
/// # Errors
///
/// Returns [`AnalysisError::ShapeMismatch`] if the images differ in size,
/// [`AnalysisError::InvalidInput`] if they are empty or too small for the
/// method.
pub fn analyze(
    reference: &RgbImage,
    test: &RgbImage,
    method: MethodKind,
) -> Result<AnalysisResult, AnalysisError> {
    analyze_with_config(reference, test, method, &AnalysisConfig::default())
}

/// Run one method with an explicit configuration.
///
/// # Errors
///
/// As [`analyze`], plus [`AnalysisError::InvalidConfig`] if `config`
/// fails validation.
pub fn analyze_with_config(
    reference: &RgbImage,
    test: &RgbImage,
    method: MethodKind,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    method::dispatch(reference, test, method, config, &SystemClock)
}

/// Run one method selected by its identifier (`absdiff`, `histogram`,
/// `ssim`).
///
/// # Errors
///
/// Returns [`AnalysisError::UnknownMethod`] for any other identifier,
/// otherwise as [`analyze`].
pub fn analyze_by_name(
    reference: &RgbImage,
    test: &RgbImage,
    method: &str,
) -> Result<AnalysisResult, AnalysisError> {
    analyze(reference, test, method.parse()?)
}

/// Run several methods in order with the default configuration.
///
/// # Errors
///
/// Returns the first [`AnalysisError`] any method produces.
pub fn run_all(
    reference: &RgbImage,
    test: &RgbImage,
    methods: &[MethodKind],
) -> Result<MultiMethodRun, AnalysisError> {
    Orchestrator::default().run(reference, test, methods)
}

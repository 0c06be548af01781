//! Analysis method strategies and single-method dispatch.
//!
//! Each method turns a reference/test pair into a [`MethodOutput`]. The
//! [`AnalysisMethod`] trait is implemented on [`MethodKind`] so callers
//! select a method at runtime and dispatch through one code path.

use image::GrayImage;

use crate::classify::classify;
use crate::contour::RegionExtractor;
use crate::diagnostics::Clock;
use crate::grayscale::{abs_diff, to_grayscale};
use crate::histogram;
use crate::overlay::highlight_regions;
use crate::result::{
    AbsDiffMetrics, AnalysisResult, HistogramMetrics, Metrics, MethodOutput, SsimMetrics,
};
use crate::ssim::structural_similarity;
use crate::threshold;
use crate::types::{AnalysisConfig, AnalysisError, Dimensions, MethodKind, RgbImage};

/// Trait for comparison strategies.
///
/// Inputs must already be validated: equal dimensions, non-empty, and a
/// valid config.
pub trait AnalysisMethod {
    /// Compare `reference` against `test`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if the method cannot process the inputs.
    fn run(
        &self,
        reference: &RgbImage,
        test: &RgbImage,
        config: &AnalysisConfig,
    ) -> Result<MethodOutput, AnalysisError>;
}

impl AnalysisMethod for MethodKind {
    fn run(
        &self,
        reference: &RgbImage,
        test: &RgbImage,
        config: &AnalysisConfig,
    ) -> Result<MethodOutput, AnalysisError> {
        match *self {
            Self::AbsDiff => Ok(analyze_absdiff(reference, test, config)),
            Self::Histogram => Ok(analyze_histogram(reference, test, config)),
            Self::Ssim => analyze_ssim(reference, test, config),
        }
    }
}

/// Pixel-wise absolute difference, thresholded and highlighted.
#[must_use]
pub fn analyze_absdiff(
    reference: &RgbImage,
    test: &RgbImage,
    config: &AnalysisConfig,
) -> MethodOutput {
    let diff = to_grayscale(&abs_diff(reference, test));
    let mask = threshold::binary(&diff, config.absdiff_threshold);

    let total_pixels = Dimensions::of(test).pixel_count();
    let differing_pixels = threshold::count_differing(&mask);
    #[allow(clippy::cast_precision_loss)]
    let difference_percentage = if total_pixels == 0 {
        0.0
    } else {
        differing_pixels as f64 / total_pixels as f64 * 100.0
    };

    let (num_differences, result_image) = localize(test, &mask, config);
    tracing::debug!(
        differing_pixels,
        total_pixels,
        num_differences,
        "absdiff mask evaluated"
    );

    MethodOutput {
        result_image: Some(result_image),
        metrics: Metrics::AbsDiff(AbsDiffMetrics {
            num_differences,
            total_pixels,
            differing_pixels,
            difference_percentage,
        }),
    }
}

/// Global grayscale histogram correlation. Produces no result image.
#[must_use]
pub fn analyze_histogram(
    reference: &RgbImage,
    test: &RgbImage,
    _config: &AnalysisConfig,
) -> MethodOutput {
    let histogram_correlation = histogram::compare(&to_grayscale(reference), &to_grayscale(test));
    tracing::debug!(histogram_correlation, "histograms compared");

    MethodOutput {
        result_image: None,
        metrics: Metrics::Histogram(HistogramMetrics {
            histogram_correlation,
        }),
    }
}

/// Structural similarity, with low-similarity regions highlighted.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidInput`] if the SSIM window does not fit
/// the images, or [`AnalysisError::InvalidConfig`] for a bad window size.
pub fn analyze_ssim(
    reference: &RgbImage,
    test: &RgbImage,
    config: &AnalysisConfig,
) -> Result<MethodOutput, AnalysisError> {
    let similarity = structural_similarity(
        &to_grayscale(reference),
        &to_grayscale(test),
        config.ssim_window,
    )?;
    let mask = threshold::binary_inverted(&similarity.map.to_gray(), config.ssim_threshold);

    let (num_differences, result_image) = localize(test, &mask, config);
    tracing::debug!(
        ssim_index = similarity.score,
        low_similarity_pixels = threshold::count_differing(&mask),
        num_differences,
        "ssim map evaluated"
    );

    Ok(MethodOutput {
        result_image: Some(result_image),
        metrics: Metrics::Ssim(SsimMetrics {
            ssim_index: similarity.score,
            num_differences,
        }),
    })
}

/// Extract regions from `mask` and highlight them on a copy of `test`.
fn localize(test: &RgbImage, mask: &GrayImage, config: &AnalysisConfig) -> (usize, RgbImage) {
    let regions = config.region_extractor.extract(mask);
    for region in &regions {
        tracing::trace!(bounds = ?region.bounds(), "region extracted");
    }
    let image = highlight_regions(
        test,
        &regions,
        config.highlight_color,
        config.overlay_opacity,
    );
    (regions.len(), image)
}

/// Validate inputs, run one method under `clock`, and classify the result.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidConfig`] for an invalid config,
/// [`AnalysisError::ShapeMismatch`] for differing dimensions,
/// [`AnalysisError::InvalidInput`] for empty images, and any error the
/// method itself reports.
pub fn dispatch<C: Clock>(
    reference: &RgbImage,
    test: &RgbImage,
    method: MethodKind,
    config: &AnalysisConfig,
    clock: &C,
) -> Result<AnalysisResult, AnalysisError> {
    config.validate()?;
    let reference_dims = Dimensions::of(reference);
    let test_dims = Dimensions::of(test);
    if reference_dims != test_dims {
        return Err(AnalysisError::ShapeMismatch {
            reference: reference_dims,
            test: test_dims,
        });
    }
    if reference_dims.is_empty() {
        return Err(AnalysisError::InvalidInput(format!(
            "cannot analyze an empty {reference_dims} image"
        )));
    }

    let start = clock.now();
    let output = method.run(reference, test, config)?;
    let duration = clock.elapsed(&start);

    let verdict = classify(method, &output.metrics);
    Ok(AnalysisResult {
        method,
        description: method.description().to_string(),
        result_image: output.result_image,
        metrics: output.metrics,
        verdict,
        duration,
    })
}

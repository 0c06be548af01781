//! Intensity histograms and their correlation.
//!
//! Histograms are extracted with [`imageproc::stats::histogram`], scaled
//! to unit Euclidean norm so images of different sizes are comparable,
//! and compared with the Pearson correlation coefficient.

use image::GrayImage;

/// Number of intensity bins (one per 8-bit value).
pub const BINS: usize = 256;

/// A histogram scaled to unit L2 norm.
pub type NormalizedHistogram = [f64; BINS];

/// Count pixels per intensity value.
#[must_use]
pub fn gray_histogram(image: &GrayImage) -> [u32; BINS] {
    let hist = imageproc::stats::histogram(image);
    hist.channels.first().copied().unwrap_or([0; BINS])
}

/// Scale a histogram so that the sum of squared bins is 1.
///
/// An all-zero histogram (empty image) stays all zero.
#[must_use]
pub fn normalize(hist: &[u32; BINS]) -> NormalizedHistogram {
    let norm = hist
        .iter()
        .map(|&c| f64::from(c) * f64::from(c))
        .sum::<f64>()
        .sqrt();
    if norm == 0.0 {
        return [0.0; BINS];
    }
    std::array::from_fn(|i| f64::from(hist[i]) / norm)
}

/// Pearson correlation between two histograms.
///
/// Returns a value in `[-1, 1]` where 1 means identical shape. When either
/// histogram has zero variance the coefficient is undefined and 1.0 is
/// returned.
#[must_use]
pub fn correlation(a: &NormalizedHistogram, b: &NormalizedHistogram) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let n = BINS as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = var_a * var_b;
    if denom.abs() <= f64::EPSILON * f64::EPSILON {
        return 1.0;
    }
    (cov / denom.sqrt()).clamp(-1.0, 1.0)
}

/// Histogram correlation of two grayscale images.
#[must_use]
pub fn compare(a: &GrayImage, b: &GrayImage) -> f64 {
    correlation(
        &normalize(&gray_histogram(a)),
        &normalize(&gray_histogram(b)),
    )
}

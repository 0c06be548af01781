//! Structural similarity (SSIM) over sliding windows.
//!
//! Local means, variances and covariance are computed with a separable
//! uniform (box) filter of side `window`, with mirror-reflected borders
//! (`d c b a | a b c d | d c b a`) so the similarity map has the same
//! resolution as the input. Variances use the sample normalization
//! `N / (N - 1)` with `N = window * window`.
//!
//! ```text
//! SSIM = (2*mu_x*mu_y + C1) * (2*sigma_xy + C2)
//!        / ((mu_x^2 + mu_y^2 + C1) * (sigma_x^2 + sigma_y^2 + C2))
//! C1 = (0.01 * 255)^2,  C2 = (0.03 * 255)^2
//! ```
//!
//! The global score is the mean of the map with a `(window - 1) / 2`
//! border excluded on every side.

use image::{GrayImage, Luma};

use crate::types::AnalysisError;

/// Dynamic range of 8-bit intensities.
const DATA_RANGE: f64 = 255.0;
const K1: f64 = 0.01;
const K2: f64 = 0.03;

/// Per-pixel similarity values, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMap {
    width: u32,
    height: u32,
    values: Vec<f64>,
}

impl SimilarityMap {
    /// Map width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Map height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Similarity at a pixel, or `None` outside the map.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Rescale to the 0-255 range.
    ///
    /// Values are clamped to `[0, 1]` first (SSIM can dip below zero for
    /// anti-correlated windows), then multiplied by 255 and truncated.
    #[must_use = "returns the rescaled similarity image"]
    pub fn to_gray(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            let v = self.get(x, y).unwrap_or(0.0);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Luma([(v.clamp(0.0, 1.0) * DATA_RANGE) as u8])
        })
    }
}

/// Result of an SSIM computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Similarity {
    /// Global similarity score in `[0, 1]`; 1 means structurally identical.
    pub score: f64,
    /// Full-resolution per-pixel similarity map.
    pub map: SimilarityMap,
}

/// Compute the structural similarity of two equally sized grayscale images.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidInput`] if the images differ in size or
/// `window` exceeds either image side.
/// Returns [`AnalysisError::InvalidConfig`] if `window` is even or below 3.
pub fn structural_similarity(
    a: &GrayImage,
    b: &GrayImage,
    window: u32,
) -> Result<Similarity, AnalysisError> {
    if a.dimensions() != b.dimensions() {
        return Err(AnalysisError::InvalidInput(format!(
            "SSIM inputs differ in size: {:?} vs {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }
    if window < 3 || window % 2 == 0 {
        return Err(AnalysisError::InvalidConfig(format!(
            "ssim_window must be odd and at least 3, got {window}"
        )));
    }
    let (width, height) = a.dimensions();
    if window > width || window > height {
        return Err(AnalysisError::InvalidInput(format!(
            "SSIM window {window} does not fit a {width}x{height} image"
        )));
    }

    let (w, h, win) = (width as usize, height as usize, window as usize);
    let x: Vec<f64> = a.pixels().map(|p| f64::from(p.0[0])).collect();
    let y: Vec<f64> = b.pixels().map(|p| f64::from(p.0[0])).collect();
    let xx: Vec<f64> = x.iter().map(|v| v * v).collect();
    let yy: Vec<f64> = y.iter().map(|v| v * v).collect();
    let xy: Vec<f64> = x.iter().zip(&y).map(|(p, q)| p * q).collect();

    let ux = uniform_filter(&x, w, h, win);
    let uy = uniform_filter(&y, w, h, win);
    let uxx = uniform_filter(&xx, w, h, win);
    let uyy = uniform_filter(&yy, w, h, win);
    let uxy = uniform_filter(&xy, w, h, win);

    #[allow(clippy::cast_precision_loss)]
    let np = (win * win) as f64;
    let cov_norm = np / (np - 1.0);
    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);

    let values: Vec<f64> = (0..w * h)
        .map(|i| {
            let vx = cov_norm * ux[i].mul_add(-ux[i], uxx[i]);
            let vy = cov_norm * uy[i].mul_add(-uy[i], uyy[i]);
            let vxy = cov_norm * ux[i].mul_add(-uy[i], uxy[i]);
            let a1 = 2.0 * ux[i] * uy[i] + c1;
            let a2 = 2.0 * vxy + c2;
            let b1 = ux[i] * ux[i] + uy[i] * uy[i] + c1;
            let b2 = vx + vy + c2;
            (a1 * a2) / (b1 * b2)
        })
        .collect();

    let pad = (win - 1) / 2;
    let mut sum = 0.0;
    let mut count = 0usize;
    for row in pad..h - pad {
        for col in pad..w - pad {
            sum += values[row * w + col];
            count += 1;
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let score = (sum / count as f64).clamp(0.0, 1.0);

    Ok(Similarity {
        score,
        map: SimilarityMap {
            width,
            height,
            values,
        },
    })
}

/// Mirror an out-of-range index back into `0..len` (`d c b a | a b c d`).
///
/// Valid for offsets up to `len` beyond either end.
const fn reflect(index: isize, len: usize) -> usize {
    #[allow(clippy::cast_possible_wrap)]
    let n = len as isize;
    let mirrored = if index < 0 {
        -index - 1
    } else if index >= n {
        2 * n - index - 1
    } else {
        index
    };
    #[allow(clippy::cast_sign_loss)]
    let out = mirrored as usize;
    out
}

/// Separable box-mean filter with mirrored borders.
fn uniform_filter(src: &[f64], w: usize, h: usize, win: usize) -> Vec<f64> {
    #[allow(clippy::cast_possible_wrap)]
    let r = (win / 2) as isize;
    #[allow(clippy::cast_precision_loss)]
    let scale = 1.0 / win as f64;

    let mut horizontal = vec![0.0; w * h];
    for row in 0..h {
        let line = &src[row * w..(row + 1) * w];
        for col in 0..w {
            #[allow(clippy::cast_possible_wrap)]
            let c = col as isize;
            let sum: f64 = (-r..=r).map(|k| line[reflect(c + k, w)]).sum();
            horizontal[row * w + col] = sum * scale;
        }
    }

    let mut out = vec![0.0; w * h];
    for row in 0..h {
        #[allow(clippy::cast_possible_wrap)]
        let rr = row as isize;
        for col in 0..w {
            let sum: f64 = (-r..=r)
                .map(|k| horizontal[reflect(rr + k, h) * w + col])
                .sum();
            out[row * w + col] = sum * scale;
        }
    }
    out
}

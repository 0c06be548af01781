//! Binary thresholding of intensity maps into divergence masks.
//!
//! A divergence mask is a [`GrayImage`] whose pixels are either
//! [`DIFFERING`] (255) or 0. The two rules differ only in polarity:
//!
//! - [`binary`] marks pixels *above* the threshold (difference maps:
//!   high values mean divergence).
//! - [`binary_inverted`] marks pixels *at or below* the threshold
//!   (similarity maps: low values mean divergence).

use image::{GrayImage, Luma};

/// Mask value for a differing pixel.
pub const DIFFERING: u8 = u8::MAX;

/// Mark pixels with intensity strictly greater than `threshold`.
#[must_use = "returns the divergence mask"]
pub fn binary(image: &GrayImage, threshold: u8) -> GrayImage {
    map_mask(image, |v| v > threshold)
}

/// Mark pixels with intensity less than or equal to `threshold`.
///
/// A pixel at full intensity (255) is never marked, whatever the
/// threshold below 255.
#[must_use = "returns the divergence mask"]
pub fn binary_inverted(image: &GrayImage, threshold: u8) -> GrayImage {
    map_mask(image, |v| v <= threshold)
}

/// Number of differing pixels in a mask.
#[must_use]
pub fn count_differing(mask: &GrayImage) -> u64 {
    mask.pixels().map(|p| u64::from(p.0[0] != 0)).sum()
}

fn map_mask(image: &GrayImage, differs: impl Fn(u8) -> bool) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if differs(image.get_pixel(x, y).0[0]) {
            Luma([DIFFERING])
        } else {
            Luma([0])
        }
    })
}

//! Grayscale reduction and per-pixel absolute difference.
//!
//! Every method works on single-channel intensities. The conversion uses
//! the BT.601 luma weights `0.299*R + 0.587*G + 0.114*B` in 14-bit fixed
//! point so results are reproducible bit for bit.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// Fixed-point BT.601 weights scaled by `1 << 14`.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;
const _: () = assert!(R_WEIGHT + G_WEIGHT + B_WEIGHT == 1 << SHIFT);

/// Luma of a single RGB pixel.
#[must_use]
pub const fn luma(pixel: [u8; 3]) -> u8 {
    let [r, g, b] = pixel;
    let weighted = r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT;
    // Weights sum to 1 << SHIFT, so the rounded result fits in u8.
    #[allow(clippy::cast_possible_truncation)]
    let value = ((weighted + (1 << (SHIFT - 1))) >> SHIFT) as u8;
    value
}

/// Convert an RGB image to single-channel grayscale.
#[must_use = "returns the grayscale image"]
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([luma(image.get_pixel(x, y).0)])
    })
}

/// Per-pixel, per-channel absolute difference of two equally sized images.
///
/// The caller guarantees equal dimensions; pixels are paired by position.
#[must_use = "returns the difference image"]
pub fn abs_diff(a: &RgbImage, b: &RgbImage) -> RgbImage {
    RgbImage::from_fn(a.width(), a.height(), |x, y| {
        let pa = a.get_pixel(x, y).0;
        let pb = b.get_pixel(x, y).0;
        Rgb(std::array::from_fn(|c| pa[c].abs_diff(pb[c])))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_are_preserved() {
        assert_eq!(luma([0, 0, 0]), 0);
        assert_eq!(luma([255, 255, 255]), 255);
    }

    #[test]
    fn gray_pixels_map_to_themselves() {
        for v in [1u8, 17, 128, 200, 254] {
            assert_eq!(luma([v, v, v]), v);
        }
    }

    #[test]
    fn weighted_not_averaged() {
        let r = luma([255, 0, 0]);
        let g = luma([0, 255, 0]);
        let b = luma([0, 0, 255]);
        assert_eq!(r, 76);
        assert_eq!(g, 150);
        assert_eq!(b, 29);
        assert!(g > r && r > b);
    }

    #[test]
    fn to_grayscale_preserves_dimensions() {
        let img = RgbImage::from_pixel(17, 31, Rgb([10, 20, 30]));
        let gray = to_grayscale(&img);
        assert_eq!(gray.dimensions(), (17, 31));
        assert!(gray.pixels().all(|p| p.0[0] == luma([10, 20, 30])));
    }

    #[test]
    fn abs_diff_is_symmetric() {
        let a = RgbImage::from_pixel(3, 3, Rgb([200, 10, 90]));
        let b = RgbImage::from_pixel(3, 3, Rgb([50, 60, 90]));
        let ab = abs_diff(&a, &b);
        assert_eq!(ab, abs_diff(&b, &a));
        assert_eq!(ab.get_pixel(1, 1).0, [150, 50, 0]);
    }

    #[test]
    fn abs_diff_of_identical_images_is_black() {
        let a = RgbImage::from_fn(5, 4, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            Rgb([(x * 40) as u8, (y * 50) as u8, 7])
        });
        assert!(abs_diff(&a, &a).pixels().all(|p| p.0 == [0, 0, 0]));
    }
}

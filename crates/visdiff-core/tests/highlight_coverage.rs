//! Every differing pixel ends up inside a highlighted region, wherever it
//! sits in the image.

#![allow(clippy::unwrap_used)]

use image::Rgb;
use proptest::prelude::*;
use visdiff_core::{AnalysisConfig, MethodKind, RgbImage, analyze_with_config};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const RED: [u8; 3] = [255, 0, 0];

fn solid_highlight() -> AnalysisConfig {
    AnalysisConfig {
        highlight_color: RED,
        overlay_opacity: 1.0,
        ..AnalysisConfig::default()
    }
}

/// A white reference and a test image with black pixels where `mask` is set.
fn pair_from_mask(width: u32, height: u32, mask: &[bool]) -> (RgbImage, RgbImage) {
    let reference = RgbImage::from_pixel(width, height, WHITE);
    let test = RgbImage::from_fn(width, height, |x, y| {
        if mask[(y * width + x) as usize] { BLACK } else { WHITE }
    });
    (reference, test)
}

fn assert_mask_highlighted(width: u32, height: u32, mask: &[bool]) -> Result<(), TestCaseError> {
    let (reference, test) = pair_from_mask(width, height, mask);
    let result =
        analyze_with_config(&reference, &test, MethodKind::AbsDiff, &solid_highlight()).unwrap();
    let image = result.result_image.unwrap();
    let any_set = mask.iter().any(|&m| m);

    for (x, y, pixel) in image.enumerate_pixels() {
        if mask[(y * width + x) as usize] {
            prop_assert_eq!(pixel.0, RED, "differing pixel ({}, {}) not highlighted", x, y);
        }
    }
    prop_assert_eq!(result.metrics.num_differences().unwrap() > 0, any_set);
    Ok(())
}

fn arb_mask() -> impl Strategy<Value = (u32, u32, Vec<bool>)> {
    (1u32..=24, 1u32..=24).prop_flat_map(|(w, h)| {
        proptest::collection::vec(any::<bool>(), (w * h) as usize)
            .prop_map(move |mask| (w, h, mask))
    })
}

/// Masks built from rectangles anchored on an image edge.
fn arb_edge_mask() -> impl Strategy<Value = (u32, u32, Vec<bool>)> {
    (2u32..=24, 2u32..=24, 0u8..4, 1u32..=24, 1u32..=24).prop_map(|(w, h, edge, a, b)| {
        let span_x = a.min(w);
        let span_y = b.min(h);
        let (x0, y0) = match edge {
            0 => (0, 0),
            1 => (w - span_x, 0),
            2 => (0, h - span_y),
            _ => (w - span_x, h - span_y),
        };
        let mask = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .map(|(x, y)| x >= x0 && x < x0 + span_x && y >= y0 && y < y0 + span_y)
            .collect();
        (w, h, mask)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn random_masks_are_fully_highlighted((w, h, mask) in arb_mask()) {
        assert_mask_highlighted(w, h, &mask)?;
    }

    #[test]
    fn edge_anchored_masks_are_fully_highlighted((w, h, mask) in arb_edge_mask()) {
        assert_mask_highlighted(w, h, &mask)?;
    }
}

#[test]
fn left_edge_block_is_one_region() {
    let mut mask = vec![false; 30 * 30];
    for y in 5..15 {
        for x in 0..10 {
            mask[y * 30 + x] = true;
        }
    }
    let (reference, test) = pair_from_mask(30, 30, &mask);
    let result =
        analyze_with_config(&reference, &test, MethodKind::AbsDiff, &solid_highlight()).unwrap();
    assert_eq!(result.metrics.num_differences(), Some(1));
    let image = result.result_image.unwrap();
    assert_eq!(image.get_pixel(0, 5).0, RED);
    assert_eq!(image.get_pixel(9, 14).0, RED);
    assert_eq!(image.get_pixel(10, 14).0, WHITE.0);
}

#[test]
fn whole_image_change_is_one_region() {
    let reference = RgbImage::from_pixel(30, 30, WHITE);
    let test = RgbImage::from_pixel(30, 30, BLACK);
    let result =
        analyze_with_config(&reference, &test, MethodKind::AbsDiff, &solid_highlight()).unwrap();
    assert_eq!(result.metrics.num_differences(), Some(1));
    assert!(result.result_image.unwrap().pixels().all(|p| p.0 == RED));
}

#[test]
fn ssim_counts_a_change_on_the_left_edge() {
    let reference = RgbImage::from_pixel(40, 40, WHITE);
    let mut test = reference.clone();
    for y in 10..20 {
        for x in 0..8 {
            test.put_pixel(x, y, BLACK);
        }
    }
    let result =
        analyze_with_config(&reference, &test, MethodKind::Ssim, &AnalysisConfig::default()).unwrap();
    assert_eq!(result.metrics.num_differences(), Some(1));
}

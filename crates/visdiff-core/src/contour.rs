//! Region extraction: find connected differing areas in a divergence mask.
//!
//! This module defines the [`RegionExtractor`] trait for pluggable region
//! extraction algorithms and the [`RegionExtractorKind`] enum for selecting
//! which algorithm to use at runtime.
//!
//! Only external boundaries are reported. A hole inside a differing blob,
//! and any blob nested inside that hole, do not produce extra regions, so
//! concentric divergence patterns count as a single difference.

use image::GrayImage;
use imageproc::contours::{BorderType, Contour};
use serde::{Deserialize, Serialize};

use crate::types::Point;

/// Selects which region extraction algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionExtractorKind {
    /// Suzuki-Abe border following via `imageproc::contours::find_contours`,
    /// keeping outermost outer borders only (8-connected foreground).
    #[default]
    ExternalBorder,
}

/// A connected area of differing pixels, described by its outer boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    boundary: Vec<Point>,
}

impl Region {
    /// Create a region from its boundary path.
    #[must_use]
    pub const fn new(boundary: Vec<Point>) -> Self {
        Self { boundary }
    }

    /// Boundary pixels in tracing order.
    #[must_use]
    pub fn boundary(&self) -> &[Point] {
        &self.boundary
    }

    /// Bounding box as `(min, max)` corners, inclusive.
    ///
    /// Returns `None` for an empty boundary.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = *self.boundary.first()?;
        Some(self.boundary.iter().fold((first, first), |(lo, hi), p| {
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }
}

/// Trait for region extraction strategies.
///
/// Input: a binary divergence mask (non-zero = differing).
/// Output: one [`Region`] per connected external area.
pub trait RegionExtractor {
    /// Extract regions from the given mask.
    fn extract(&self, mask: &GrayImage) -> Vec<Region>;
}

impl RegionExtractor for RegionExtractorKind {
    fn extract(&self, mask: &GrayImage) -> Vec<Region> {
        match *self {
            Self::ExternalBorder => extract_external_borders(mask),
        }
    }
}

fn extract_external_borders(mask: &GrayImage) -> Vec<Region> {
    // `find_contours` only starts an outer border next to an in-bounds
    // background pixel, so blobs touching the left edge would be skipped.
    // Trace a copy framed by a 1 px background border instead.
    let padded = pad_with_background(mask);
    let contours: Vec<Contour<u32>> = imageproc::contours::find_contours(&padded);

    contours
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| {
            let boundary = c
                .points
                .into_iter()
                .map(|p| Point::new(p.x.saturating_sub(1), p.y.saturating_sub(1)))
                .collect();
            Region::new(boundary)
        })
        .collect()
}

fn pad_with_background(mask: &GrayImage) -> GrayImage {
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    for (x, y, pixel) in mask.enumerate_pixels() {
        padded.put_pixel(x + 1, y + 1, *pixel);
    }
    padded
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Luma;

    use super::*;

    fn fill_rect(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
    }

    #[test]
    fn default_is_external_border() {
        assert_eq!(
            RegionExtractorKind::default(),
            RegionExtractorKind::ExternalBorder
        );
    }

    #[test]
    fn empty_mask_has_no_regions() {
        let mask = GrayImage::new(10, 10);
        assert!(RegionExtractorKind::ExternalBorder.extract(&mask).is_empty());
    }

    #[test]
    fn single_pixel_is_a_region() {
        let mut mask = GrayImage::new(10, 10);
        mask.put_pixel(5, 5, Luma([255]));
        let regions = RegionExtractorKind::ExternalBorder.extract(&mask);
        assert_eq!(regions.len(), 1);
        assert_eq!(
            regions[0].bounds(),
            Some((Point::new(5, 5), Point::new(5, 5)))
        );
    }

    #[test]
    fn separate_blobs_are_counted_separately() {
        let mut mask = GrayImage::new(30, 30);
        fill_rect(&mut mask, 2, 2, 8, 8);
        fill_rect(&mut mask, 15, 15, 25, 20);
        fill_rect(&mut mask, 2, 22, 4, 28);
        let regions = RegionExtractorKind::ExternalBorder.extract(&mask);
        assert_eq!(regions.len(), 3);
    }

    #[test]
    fn diagonal_neighbours_join_one_region() {
        let mut mask = GrayImage::new(10, 10);
        mask.put_pixel(3, 3, Luma([255]));
        mask.put_pixel(4, 4, Luma([255]));
        mask.put_pixel(5, 5, Luma([255]));
        assert_eq!(RegionExtractorKind::ExternalBorder.extract(&mask).len(), 1);
    }

    #[test]
    fn nested_blob_inside_hole_is_not_counted() {
        // Ring with a dot in the middle: one external region.
        let mut mask = GrayImage::new(30, 30);
        fill_rect(&mut mask, 5, 5, 25, 25);
        for y in 8..22 {
            for x in 8..22 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        fill_rect(&mut mask, 14, 14, 16, 16);
        let regions = RegionExtractorKind::ExternalBorder.extract(&mask);
        assert_eq!(regions.len(), 1);
        assert_eq!(
            regions[0].bounds(),
            Some((Point::new(5, 5), Point::new(24, 24)))
        );
    }

    #[test]
    fn boundary_touching_image_edge_is_traced() {
        let mut mask = GrayImage::new(10, 10);
        fill_rect(&mut mask, 0, 0, 10, 3);
        let regions = RegionExtractorKind::ExternalBorder.extract(&mask);
        assert_eq!(regions.len(), 1);
        assert_eq!(
            regions[0].bounds(),
            Some((Point::new(0, 0), Point::new(9, 2)))
        );
    }

    #[test]
    fn blob_in_left_column_is_traced() {
        let mut mask = GrayImage::new(30, 30);
        fill_rect(&mut mask, 0, 5, 10, 15);
        let regions = RegionExtractorKind::ExternalBorder.extract(&mask);
        assert_eq!(regions.len(), 1);
        assert_eq!(
            regions[0].bounds(),
            Some((Point::new(0, 5), Point::new(9, 14)))
        );
    }

    #[test]
    fn full_mask_is_one_region_covering_the_image() {
        let mut mask = GrayImage::new(12, 8);
        fill_rect(&mut mask, 0, 0, 12, 8);
        let regions = RegionExtractorKind::ExternalBorder.extract(&mask);
        assert_eq!(regions.len(), 1);
        assert_eq!(
            regions[0].bounds(),
            Some((Point::new(0, 0), Point::new(11, 7)))
        );
    }

    #[test]
    fn blobs_on_every_edge_are_counted() {
        let mut mask = GrayImage::new(20, 20);
        fill_rect(&mut mask, 0, 8, 2, 12);
        fill_rect(&mut mask, 18, 8, 20, 12);
        fill_rect(&mut mask, 8, 0, 12, 2);
        fill_rect(&mut mask, 8, 18, 12, 20);
        assert_eq!(RegionExtractorKind::ExternalBorder.extract(&mask).len(), 4);
    }

    #[test]
    fn empty_region_has_no_bounds() {
        assert!(Region::new(Vec::new()).bounds().is_none());
    }
}

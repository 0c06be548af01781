//! Overlay compositing: highlight regions on a copy of the test image.
//!
//! Regions are filled with a solid colour on an overlay copy of the base
//! image, then the overlay is blended back onto the base:
//!
//! ```text
//! out = opacity * overlay + (1 - opacity) * base
//! ```
//!
//! per pixel and channel, rounded and clamped to 0-255. Pixels outside
//! every region are identical in overlay and base, so they come out
//! unchanged.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as PolygonPoint;

use crate::contour::Region;

/// Fill every region with `color` on a copy of `base` and blend it back at
/// `opacity`.
#[must_use = "returns the highlighted image"]
pub fn highlight_regions(
    base: &RgbImage,
    regions: &[Region],
    color: [u8; 3],
    opacity: f64,
) -> RgbImage {
    let mut overlay = base.clone();
    for region in regions {
        fill_region(&mut overlay, region, Rgb(color));
    }
    blend(&overlay, base, opacity)
}

/// Fill the area enclosed by a region's boundary, boundary included.
pub fn fill_region(canvas: &mut RgbImage, region: &Region, color: Rgb<u8>) {
    let mut polygon: Vec<PolygonPoint<i32>> = region
        .boundary()
        .iter()
        .filter_map(|p| Some(PolygonPoint::new(i32::try_from(p.x).ok()?, i32::try_from(p.y).ok()?)))
        .collect();
    polygon.dedup();
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }

    if polygon.len() >= 3 {
        draw_polygon_mut(canvas, &polygon, color);
    }

    // Polygon rasterization can leave boundary pixels out, and degenerate
    // boundaries (single pixels, 2-point lines) draw nothing at all.
    for p in region.boundary() {
        if p.x < canvas.width() && p.y < canvas.height() {
            canvas.put_pixel(p.x, p.y, color);
        }
    }
}

/// Weighted blend `opacity * top + (1 - opacity) * bottom`.
///
/// Both images must have the same dimensions.
#[must_use = "returns the blended image"]
pub fn blend(top: &RgbImage, bottom: &RgbImage, opacity: f64) -> RgbImage {
    let alpha = opacity.clamp(0.0, 1.0);
    RgbImage::from_fn(bottom.width(), bottom.height(), |x, y| {
        let t = top.get_pixel(x, y).0;
        let b = bottom.get_pixel(x, y).0;
        Rgb(std::array::from_fn(|c| {
            let v = alpha.mul_add(f64::from(t[c]), (1.0 - alpha) * f64::from(b[c]));
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let out = v.round().clamp(0.0, 255.0) as u8;
            out
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn square_region(x0: u32, y0: u32, x1: u32, y1: u32) -> Region {
        // Clockwise boundary of the inclusive square [x0, x1] x [y0, y1].
        let mut pts = Vec::new();
        for x in x0..=x1 {
            pts.push(Point::new(x, y0));
        }
        for y in y0 + 1..=y1 {
            pts.push(Point::new(x1, y));
        }
        for x in (x0..x1).rev() {
            pts.push(Point::new(x, y1));
        }
        for y in (y0 + 1..y1).rev() {
            pts.push(Point::new(x0, y));
        }
        Region::new(pts)
    }

    #[test]
    fn blend_of_identical_images_is_identity() {
        let img = RgbImage::from_fn(8, 8, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            Rgb([(x * 30) as u8, (y * 30) as u8, 77])
        });
        assert_eq!(blend(&img, &img, 0.7), img);
    }

    #[test]
    fn blend_weights_overlay() {
        let top = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        let bottom = RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));
        let out = blend(&top, &bottom, 0.7);
        // 0.7*0 + 0.3*255 = 76.5 -> 77
        assert_eq!(out.get_pixel(0, 0).0, [255, 77, 77]);
    }

    #[test]
    fn no_regions_leaves_base_unchanged() {
        let base = RgbImage::from_pixel(10, 10, Rgb([12, 34, 56]));
        assert_eq!(highlight_regions(&base, &[], [255, 0, 0], 0.7), base);
    }

    #[test]
    fn square_is_filled_including_border() {
        let base = RgbImage::from_pixel(20, 20, Rgb([255, 255, 255]));
        let out = highlight_regions(&base, &[square_region(5, 5, 10, 10)], [255, 0, 0], 1.0);
        for y in 5..=10 {
            for x in 5..=10 {
                assert_eq!(out.get_pixel(x, y).0, [255, 0, 0], "({x}, {y})");
            }
        }
        assert_eq!(out.get_pixel(4, 4).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(11, 10).0, [255, 255, 255]);
    }

    #[test]
    fn single_pixel_region_is_painted() {
        let base = RgbImage::from_pixel(5, 5, Rgb([0, 0, 0]));
        let region = Region::new(vec![Point::new(2, 3)]);
        let out = highlight_regions(&base, &[region], [0, 0, 255], 1.0);
        assert_eq!(out.get_pixel(2, 3).0, [0, 0, 255]);
        assert_eq!(out.get_pixel(3, 3).0, [0, 0, 0]);
    }

    #[test]
    fn zero_opacity_keeps_base() {
        let base = RgbImage::from_pixel(20, 20, Rgb([200, 200, 200]));
        let out = highlight_regions(&base, &[square_region(2, 2, 8, 8)], [255, 0, 0], 0.0);
        assert_eq!(out, base);
    }
}

//! Example image pair for trying the tool out.
//!
//! The reference is a 300x300 white canvas with a blue square spanning
//! (100, 100)-(200, 200). The test image is the same canvas with a green
//! filled circle of radius 20 centred at (150, 150).

use std::path::{Path, PathBuf};

use image::Rgb;
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use visdiff_core::RgbImage;

const SIZE: u32 = 300;
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

/// Build the reference and test images in memory.
#[must_use]
pub fn example_pair() -> (RgbImage, RgbImage) {
    let mut reference = RgbImage::from_pixel(SIZE, SIZE, WHITE);
    draw_filled_rect_mut(&mut reference, Rect::at(100, 100).of_size(101, 101), BLUE);

    let mut test = reference.clone();
    draw_filled_circle_mut(&mut test, (150, 150), 20, GREEN);
    (reference, test)
}

/// Write the example pair to `<dir>/reference/example.png` and
/// `<dir>/test/example.png`, creating directories as needed.
///
/// # Errors
///
/// Returns [`image::ImageError`] if a directory or file cannot be written.
pub fn generate(dir: &Path) -> Result<(PathBuf, PathBuf), image::ImageError> {
    let (reference, test) = example_pair();
    let reference_path = write(dir, "reference", &reference)?;
    let test_path = write(dir, "test", &test)?;
    Ok((reference_path, test_path))
}

fn write(dir: &Path, kind: &str, image: &RgbImage) -> Result<PathBuf, image::ImageError> {
    let sub = dir.join(kind);
    std::fs::create_dir_all(&sub)?;
    let path = sub.join("example.png");
    image.save(&path)?;
    tracing::info!(path = %path.display(), "wrote {kind} image");
    Ok(path)
}

//! Image provider: load the reference/test pair from disk.

use std::path::{Path, PathBuf};

use visdiff_core::{Dimensions, RgbImage};

/// Errors that can occur while loading an image pair.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The file could not be read or decoded.
    #[error("failed to load {}: {source}", path.display())]
    Load {
        /// Path that failed.
        path: PathBuf,
        /// Underlying read/decode error.
        #[source]
        source: image::ImageError,
    },

    /// The two images have different dimensions.
    #[error("image dimensions differ: reference {reference}, test {test}")]
    ShapeMismatch {
        /// Reference image dimensions.
        reference: Dimensions,
        /// Test image dimensions.
        test: Dimensions,
    },
}

/// Decode a single image file (PNG, JPEG, BMP, WebP) into RGB.
///
/// # Errors
///
/// Returns [`ProviderError::Load`] if the file cannot be read or decoded.
pub fn load(path: &Path) -> Result<RgbImage, ProviderError> {
    image::open(path)
        .map(|decoded| decoded.to_rgb8())
        .map_err(|source| ProviderError::Load {
            path: path.to_path_buf(),
            source,
        })
}

/// Load the reference and test images and check that they line up.
///
/// # Errors
///
/// Returns [`ProviderError::Load`] for the first file that fails, or
/// [`ProviderError::ShapeMismatch`] when the dimensions differ.
pub fn load_pair(reference: &Path, test: &Path) -> Result<(RgbImage, RgbImage), ProviderError> {
    let reference_image = load(reference)?;
    let test_image = load(test)?;

    let reference_dims = Dimensions::of(&reference_image);
    let test_dims = Dimensions::of(&test_image);
    if reference_dims != test_dims {
        return Err(ProviderError::ShapeMismatch {
            reference: reference_dims,
            test: test_dims,
        });
    }

    tracing::debug!(
        reference = %reference.display(),
        test = %test.display(),
        dimensions = %reference_dims,
        "loaded image pair"
    );
    Ok((reference_image, test_image))
}

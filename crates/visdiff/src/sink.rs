//! Result sink: persist highlighted images and report documents.
//!
//! Persistence failures degrade: they are logged at warn level and the
//! caller gets `None` instead of a path.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use visdiff_core::{MethodKind, RgbImage};

/// Writes artifacts into a single output directory.
#[derive(Debug, Clone)]
pub struct ResultSink {
    dir: PathBuf,
}

impl ResultSink {
    /// Create a sink rooted at `dir`. Nothing is created until the first
    /// write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store a result image as `result_<method>_<timestamp>.png`.
    #[must_use]
    pub fn store(&self, image: &RgbImage, method: MethodKind, timestamp: &str) -> Option<PathBuf> {
        let path = self.dir.join(format!("result_{method}_{timestamp}.png"));
        let written = self.ensure_dir().and_then(|()| {
            image
                .save_with_format(&path, ImageFormat::Png)
                .map_err(|e| e.to_string())
        });
        finish(path, written)
    }

    /// Store a text document under `name`.
    #[must_use]
    pub fn write_document(&self, name: &str, contents: &str) -> Option<PathBuf> {
        let path = self.dir.join(name);
        let written = self
            .ensure_dir()
            .and_then(|()| std::fs::write(&path, contents).map_err(|e| e.to_string()));
        finish(path, written)
    }

    fn ensure_dir(&self) -> Result<(), String> {
        std::fs::create_dir_all(&self.dir).map_err(|e| e.to_string())
    }
}

fn finish(path: PathBuf, written: Result<(), String>) -> Option<PathBuf> {
    match written {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "artifact written");
            Some(path)
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed to persist artifact");
            None
        }
    }
}

/// Encode an image as PNG bytes for embedding in reports.
///
/// Returns `None` (and logs a warning) if encoding fails.
#[must_use]
pub fn encode_png(image: &RgbImage) -> Option<Vec<u8>> {
    let mut bytes = Vec::new();
    match image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png) {
        Ok(()) => Some(bytes),
        Err(error) => {
            tracing::warn!(%error, "failed to encode PNG");
            None
        }
    }
}

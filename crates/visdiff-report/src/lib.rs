//! visdiff-report: Pure report renderers (sans-IO)
//!
//! Turns a [`MultiMethodRun`] plus references to the compared and
//! highlighted images into report documents. Currently supports plain
//! text and paginated SVG. Writing the documents to disk is the caller's
//! job.

pub mod svg;
pub mod text;

use visdiff_core::{Metrics, MethodKind, MultiMethodRun};

/// A labelled image shown in a report.
///
/// Either field may be absent. Renderers embed `png` when present, fall
/// back to linking `path`, and otherwise show a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportImage {
    /// Caption shown above the image.
    pub label: String,
    /// Filesystem path or URL of the image.
    pub path: Option<String>,
    /// Encoded PNG bytes, embedded directly.
    pub png: Option<Vec<u8>>,
}

impl ReportImage {
    /// An image with a caption and nothing to show yet.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: None,
            png: None,
        }
    }

    /// Attach a path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach encoded PNG bytes.
    #[must_use]
    pub fn with_png(mut self, png: Vec<u8>) -> Self {
        self.png = Some(png);
        self
    }
}

/// Everything a renderer needs to describe one comparison session.
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    /// Report heading.
    pub title: &'a str,
    /// Generation date and time, already formatted.
    pub generated_at: &'a str,
    /// The reference image.
    pub reference: ReportImage,
    /// The test image.
    pub test: ReportImage,
    /// The analysis run being reported.
    pub run: &'a MultiMethodRun,
    /// Highlighted result images, keyed by method.
    pub result_images: Vec<(MethodKind, ReportImage)>,
}

impl ReportInput<'_> {
    /// Result image for a method, if one was supplied.
    #[must_use]
    pub fn result_image(&self, method: MethodKind) -> Option<&ReportImage> {
        self.result_images
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, image)| image)
    }
}

/// Metric names and formatted values, in display order.
///
/// Region counts are `N/A` for methods without a region concept and
/// percentages carry two decimals.
#[must_use]
pub fn metric_rows(metrics: &Metrics) -> Vec<(&'static str, String)> {
    let num_differences = metrics
        .num_differences()
        .map_or_else(|| "N/A".to_string(), |n| n.to_string());
    match metrics {
        Metrics::AbsDiff(m) => vec![
            ("num_differences", num_differences),
            ("total_pixels", m.total_pixels.to_string()),
            ("differing_pixels", m.differing_pixels.to_string()),
            (
                "difference_percentage",
                format!("{:.2}%", m.difference_percentage),
            ),
        ],
        Metrics::Histogram(m) => vec![
            ("num_differences", num_differences),
            (
                "histogram_correlation",
                format!("{:.4}", m.histogram_correlation),
            ),
        ],
        Metrics::Ssim(m) => vec![
            ("num_differences", num_differences),
            ("ssim_index", format!("{:.4}", m.ssim_index)),
        ],
    }
}

/// Format a duration as seconds with millisecond precision.
fn format_seconds(duration: std::time::Duration) -> String {
    format!("{:.3}s", duration.as_secs_f64())
}

//! Paginated SVG report renderer.
//!
//! Lays the report out on A4 pages (595 x 842 pt) using the [`svg`]
//! crate for document construction and XML escaping. Content flows top
//! to bottom inside a 50 pt margin:
//!
//! 1. Header: title, generation time, session, and the compared images.
//! 2. One block per method: a metrics table with a coloured verdict,
//!    followed by the highlighted result image when there is one.
//! 3. Footer line with the total duration.
//!
//! Images are drawn in 200 x 200 pt boxes and keep their aspect ratio.
//! Encoded PNG bytes are embedded as base64 `data:` URIs, images with
//! only a path are linked, and anything else becomes a placeholder box.
//!
//! This is a pure function with no I/O -- it returns one `String` per
//! page.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use svg::Document;
use svg::node::element::{Element, Rectangle};
use svg::node::{Node, Text};

use visdiff_core::Verdict;

use crate::{ReportImage, ReportInput, format_seconds, metric_rows};

/// A4 page width in points.
pub const PAGE_WIDTH: f64 = 595.0;
/// A4 page height in points.
pub const PAGE_HEIGHT: f64 = 842.0;
/// Margin on every side.
pub const MARGIN: f64 = 50.0;
/// Side of the square box each image is fitted into.
pub const IMAGE_SIZE: f64 = 200.0;
/// Once an image block ends within this distance of the page bottom,
/// the next block starts on a new page.
pub const IMAGE_RESERVE: f64 = 200.0;

const LINE_HEIGHT: f64 = 16.0;
const BLOCK_GAP: f64 = 12.0;
const VALUE_COLUMN: f64 = 220.0;
const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

/// Fill colour used for a verdict.
#[must_use]
pub const fn verdict_color(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Ok => "#2e7d32",
        Verdict::Attention => "#f9a825",
        Verdict::Danger => "#c62828",
        Verdict::Unavailable => "#757575",
    }
}

/// Render the report as a sequence of SVG pages.
///
/// Always returns at least one page.
#[must_use]
pub fn render_pages(input: &ReportInput<'_>) -> Vec<String> {
    let mut layout = PageLayout::new();

    layout.line(input.title, 18.0, true, "black");
    layout.line(&format!("Generated: {}", input.generated_at), 11.0, false, "black");
    layout.line(
        &format!("Session: {}", input.run.session_id().unwrap_or("N/A")),
        11.0,
        false,
        "black",
    );
    layout.gap();
    layout.image(&input.reference);
    layout.image(&input.test);

    for (index, result) in input.run.results().iter().enumerate() {
        layout.gap();
        layout.line(
            &format!("{}. {}", index + 1, result.description),
            13.0,
            true,
            "black",
        );
        layout.row("Method", result.method.id(), "black");
        layout.row("Duration", &format_seconds(result.duration), "black");
        layout.row(
            "Verdict",
            result.verdict.label(),
            verdict_color(result.verdict),
        );
        for (name, value) in metric_rows(&result.metrics) {
            layout.row(name, &value, "black");
        }

        match input.result_image(result.method) {
            Some(image) => layout.image(image),
            None if result.method.produces_image() => {
                layout.image(&ReportImage::new(format!("{} result", result.method)));
            }
            None => layout.line("No visual artifact available", 10.0, false, "#555555"),
        }
    }

    layout.gap();
    layout.line(
        &format!(
            "Total duration: {}",
            format_seconds(input.run.total_duration())
        ),
        11.0,
        true,
        "black",
    );

    layout
        .finish()
        .into_iter()
        .map(|doc| format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n"))
        .collect()
}

/// Top-down flow layout across fixed-size pages.
struct PageLayout {
    pages: Vec<Document>,
    current: Document,
    /// Distance from the top of the current page to the next free line.
    y: f64,
    /// Whether anything has been drawn on the current page.
    dirty: bool,
}

impl PageLayout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: blank_page(),
            y: MARGIN,
            dirty: false,
        }
    }

    fn break_page(&mut self) {
        let page = std::mem::replace(&mut self.current, blank_page());
        self.pages.push(page);
        self.y = MARGIN;
        self.dirty = false;
    }

    /// Start a new page unless `height` more points fit above the bottom
    /// margin.
    fn ensure_room(&mut self, height: f64) {
        if self.dirty && self.y + height > PAGE_HEIGHT - MARGIN {
            self.break_page();
        }
    }

    fn gap(&mut self) {
        if self.dirty {
            self.y += BLOCK_GAP;
        }
    }

    fn line(&mut self, content: &str, size: f64, bold: bool, fill: &str) {
        self.ensure_room(LINE_HEIGHT.max(size + 4.0));
        let baseline = self.y + size;
        self.current
            .append(text_element(MARGIN, baseline, content, size, bold, fill));
        self.y += LINE_HEIGHT.max(size + 4.0);
        self.dirty = true;
    }

    fn row(&mut self, name: &str, value: &str, value_fill: &str) {
        self.ensure_room(LINE_HEIGHT);
        let top = self.y;
        self.current.append(
            Rectangle::new()
                .set("x", MARGIN)
                .set("y", top)
                .set("width", PAGE_WIDTH - 2.0 * MARGIN)
                .set("height", LINE_HEIGHT)
                .set("fill", "none")
                .set("stroke", "#cccccc")
                .set("stroke-width", 0.5),
        );
        let baseline = top + LINE_HEIGHT - 4.0;
        self.current
            .append(text_element(MARGIN + 6.0, baseline, name, 10.0, false, "black"));
        self.current.append(text_element(
            MARGIN + VALUE_COLUMN,
            baseline,
            value,
            10.0,
            value_fill != "black",
            value_fill,
        ));
        self.y += LINE_HEIGHT;
        self.dirty = true;
    }

    fn image(&mut self, image: &ReportImage) {
        self.ensure_room(LINE_HEIGHT + IMAGE_SIZE);
        self.line(&image.label, 11.0, true, "black");

        let top = self.y;
        if let Some(href) = image_href(image) {
            let mut el = Element::new("image");
            el.assign("x", MARGIN);
            el.assign("y", top);
            el.assign("width", IMAGE_SIZE);
            el.assign("height", IMAGE_SIZE);
            el.assign("preserveAspectRatio", "xMidYMid meet");
            el.assign("href", href);
            self.current.append(el);
        } else {
            self.current.append(
                Rectangle::new()
                    .set("x", MARGIN)
                    .set("y", top)
                    .set("width", IMAGE_SIZE)
                    .set("height", IMAGE_SIZE)
                    .set("fill", "#eeeeee")
                    .set("stroke", "#999999"),
            );
            self.current.append(text_element(
                MARGIN + 10.0,
                top + IMAGE_SIZE / 2.0,
                "[image unavailable]",
                10.0,
                false,
                "#555555",
            ));
        }
        self.y += IMAGE_SIZE + BLOCK_GAP;
        self.dirty = true;

        if self.y > PAGE_HEIGHT - IMAGE_RESERVE {
            self.break_page();
        }
    }

    fn finish(mut self) -> Vec<Document> {
        if self.dirty || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

fn blank_page() -> Document {
    Document::new()
        .set("width", PAGE_WIDTH)
        .set("height", PAGE_HEIGHT)
        .set("viewBox", (0, 0, 595, 842))
        .add(
            Rectangle::new()
                .set("width", PAGE_WIDTH)
                .set("height", PAGE_HEIGHT)
                .set("fill", "white"),
        )
}

fn text_element(x: f64, y: f64, content: &str, size: f64, bold: bool, fill: &str) -> Element {
    let mut el = Element::new("text");
    el.assign("x", x);
    el.assign("y", y);
    el.assign("font-family", FONT_FAMILY);
    el.assign("font-size", size);
    if bold {
        el.assign("font-weight", "bold");
    }
    el.assign("fill", fill);
    el.append(Text::new(content));
    el
}

/// Embedded `data:` URI for PNG bytes, else the plain path.
fn image_href(image: &ReportImage) -> Option<String> {
    image.png.as_ref().map_or_else(
        || image.path.clone(),
        |png| Some(format!("data:image/png;base64,{}", BASE64.encode(png))),
    )
}

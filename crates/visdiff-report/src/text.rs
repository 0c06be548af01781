//! Plain-text report renderer.

use std::fmt::Write;

use crate::{ReportImage, ReportInput, format_seconds, metric_rows};

/// Render a plain-text report.
///
/// Lists the session header, then one section per method with its
/// description, duration, verdict, metrics, and result image, and ends
/// with the total duration.
#[must_use]
pub fn render(input: &ReportInput<'_>) -> String {
    let mut out = String::new();
    let rule = "=".repeat(input.title.chars().count().max(40));

    let _ = writeln!(out, "{}", input.title);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Generated: {}", input.generated_at);
    let _ = writeln!(
        out,
        "Session: {}",
        input.run.session_id().unwrap_or("N/A")
    );
    let _ = writeln!(out, "Reference image: {}", image_ref(&input.reference));
    let _ = writeln!(out, "Test image: {}", image_ref(&input.test));

    for (index, result) in input.run.results().iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "[{}] {}", index + 1, result.description);
        let _ = writeln!(out, "    Method: {}", result.method);
        let _ = writeln!(out, "    Duration: {}", format_seconds(result.duration));
        let _ = writeln!(out, "    Verdict: {}", result.verdict);
        let _ = writeln!(out, "    Metrics:");
        for (name, value) in metric_rows(&result.metrics) {
            let _ = writeln!(out, "      {name:<24} {value}");
        }
        let artifact = input
            .result_image(result.method)
            .and_then(|image| image.path.as_deref())
            .unwrap_or("no visual artifact available");
        let _ = writeln!(out, "    Result image: {artifact}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "-".repeat(rule.len()));
    let _ = writeln!(
        out,
        "Total duration: {}",
        format_seconds(input.run.total_duration())
    );
    out
}

fn image_ref(image: &ReportImage) -> String {
    image
        .path
        .clone()
        .unwrap_or_else(|| format!("{} (unavailable)", image.label))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use visdiff_core::{MethodKind, MultiMethodRun, Orchestrator, RgbImage, run_all};

    use super::*;

    fn run(methods: &[MethodKind]) -> MultiMethodRun {
        let reference = RgbImage::from_pixel(16, 16, image::Rgb([255, 255, 255]));
        let mut test = reference.clone();
        test.put_pixel(8, 8, image::Rgb([0, 0, 0]));
        run_all(&reference, &test, methods).unwrap()
    }

    fn input(run: &MultiMethodRun) -> ReportInput<'_> {
        ReportInput {
            title: "Visual Regression Report",
            generated_at: "2024-05-01 12:00:00",
            reference: ReportImage::new("Reference").with_path("images/reference/example.png"),
            test: ReportImage::new("Test").with_path("images/test/example.png"),
            run,
            result_images: vec![(
                MethodKind::AbsDiff,
                ReportImage::new("absdiff").with_path("reports/result_absdiff.png"),
            )],
        }
    }

    #[test]
    fn header_lists_paths_and_session() {
        let reference = RgbImage::new(8, 8);
        let run = Orchestrator::default()
            .with_session("01HX")
            .run(&reference, &reference, &[MethodKind::Histogram])
            .unwrap();
        let text = render(&input(&run));
        assert!(text.starts_with("Visual Regression Report\n"));
        assert!(text.contains("Generated: 2024-05-01 12:00:00"));
        assert!(text.contains("Session: 01HX"));
        assert!(text.contains("Reference image: images/reference/example.png"));
        assert!(text.contains("Test image: images/test/example.png"));
    }

    #[test]
    fn sections_follow_run_order() {
        let run = run(&MethodKind::ALL);
        let text = render(&input(&run));
        let absdiff = text.find("[1] Absolute Pixel Difference (AbsDiff)").unwrap();
        let histogram = text.find("[2] Histogram Comparison (Correlation)").unwrap();
        let ssim = text.find("[3] Structural Similarity Index (SSIM)").unwrap();
        assert!(absdiff < histogram && histogram < ssim);
        assert!(text.contains("Session: N/A"));
        assert!(text.contains("Total duration: "));
    }

    #[test]
    fn missing_artifacts_are_reported() {
        let run = run(&[MethodKind::AbsDiff, MethodKind::Histogram]);
        let text = render(&input(&run));
        assert!(text.contains("Result image: reports/result_absdiff.png"));
        assert!(text.contains("Result image: no visual artifact available"));
        assert!(
            text.lines()
                .any(|l| l.trim_start().starts_with("num_differences") && l.ends_with("N/A"))
        );
    }

    #[test]
    fn unsaved_result_image_is_not_listed() {
        let run = run(&[MethodKind::Ssim]);
        let mut input = input(&run);
        input.result_images = vec![(
            MethodKind::Ssim,
            ReportImage::new("ssim").with_png(vec![0x89, b'P', b'N', b'G']),
        )];
        let text = render(&input);
        assert!(text.contains("Result image: no visual artifact available"));
        assert!(!text.contains("embedded"));
    }
}

//! visdiff: compare a test image against a reference and report what changed.
//!
//! Loads an image pair, runs the selected analysis methods, stores the
//! highlighted result images, and writes a text report plus a paginated
//! SVG report into the output directory.
//!
//! # Usage
//!
//! ```text
//! visdiff generate-fixtures images
//! visdiff compare images/reference/example.png images/test/example.png --all
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod fixtures;
mod provider;
mod sink;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ulid::Ulid;
use visdiff_core::{AnalysisConfig, MethodKind, MultiMethodRun, Orchestrator, RgbImage};
use visdiff_report::{ReportImage, ReportInput};

use crate::sink::{ResultSink, encode_png};

/// Timestamp embedded in artifact file names.
const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
/// Timestamp shown inside reports.
const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const REPORT_TITLE: &str = "Visual Regression Report";

/// Visual regression detection between a reference image and a test image.
#[derive(Parser)]
#[command(name = "visdiff", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare a test image against a reference image.
    Compare(CompareArgs),

    /// Write the bundled example image pair.
    GenerateFixtures {
        /// Directory receiving `reference/example.png` and `test/example.png`.
        #[arg(default_value = "images")]
        dir: PathBuf,
    },
}

#[derive(Args)]
struct CompareArgs {
    /// Path to the reference image (PNG, JPEG, BMP, WebP).
    reference: PathBuf,

    /// Path to the test image. Must have the reference's dimensions.
    test: PathBuf,

    /// Analysis method to run. Repeat to run several, in order.
    #[arg(short, long = "method", value_enum, default_values_t = [Method::AbsDiff])]
    methods: Vec<Method>,

    /// Run every method in canonical order (absdiff, histogram, ssim).
    #[arg(long)]
    all: bool,

    /// Directory for result images and reports.
    #[arg(short, long, default_value = "reports")]
    output_dir: PathBuf,

    /// AbsDiff sensitivity on 0-255; differences above it are flagged.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_ABSDIFF_THRESHOLD)]
    absdiff_threshold: u8,

    /// SSIM threshold on 0-255; local similarity at or below it is flagged.
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_SSIM_THRESHOLD)]
    ssim_threshold: u8,

    /// SSIM window side (odd, at least 3).
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_SSIM_WINDOW)]
    ssim_window: u32,

    /// Highlight overlay opacity (0.0-1.0).
    #[arg(long, default_value_t = AnalysisConfig::DEFAULT_OVERLAY_OPACITY)]
    overlay_opacity: f64,

    /// Full analysis config as a JSON string.
    ///
    /// When provided, the individual analysis flags are ignored. Missing
    /// fields take their default values.
    #[arg(long)]
    config_json: Option<String>,

    /// Print the run as JSON instead of a human-readable summary.
    #[arg(long)]
    json: bool,

    /// Skip writing the text and SVG reports.
    #[arg(long)]
    no_report: bool,
}

/// Analysis method selection.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum Method {
    /// Absolute pixel difference.
    #[value(name = "absdiff")]
    AbsDiff,
    /// Grayscale histogram correlation.
    Histogram,
    /// Structural similarity index.
    Ssim,
}

impl From<Method> for MethodKind {
    fn from(method: Method) -> Self {
        match method {
            Method::AbsDiff => Self::AbsDiff,
            Method::Histogram => Self::Histogram,
            Method::Ssim => Self::Ssim,
        }
    }
}

/// Build an [`AnalysisConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual analysis flags are ignored.
fn config_from_args(args: &CompareArgs) -> Result<AnalysisConfig, String> {
    if let Some(ref json) = args.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(AnalysisConfig {
        absdiff_threshold: args.absdiff_threshold,
        ssim_threshold: args.ssim_threshold,
        ssim_window: args.ssim_window,
        overlay_opacity: args.overlay_opacity,
        ..AnalysisConfig::default()
    })
}

/// Methods to run, in order.
fn methods_from_args(args: &CompareArgs) -> Vec<MethodKind> {
    if args.all {
        MethodKind::ALL.to_vec()
    } else {
        args.methods.iter().copied().map(MethodKind::from).collect()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Command::Compare(ref args) => compare(args),
        Command::GenerateFixtures { ref dir } => generate_fixtures(dir),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level follows `-v`.
fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn generate_fixtures(dir: &Path) -> Result<(), String> {
    let (reference, test) = fixtures::generate(dir)
        .map_err(|e| format!("Error writing fixtures to {}: {e}", dir.display()))?;
    println!("Reference: {}", reference.display());
    println!("Test:      {}", test.display());
    Ok(())
}

fn compare(args: &CompareArgs) -> Result<(), String> {
    let config = config_from_args(args)?;
    let methods = methods_from_args(args);

    let (reference, test) =
        provider::load_pair(&args.reference, &args.test).map_err(|e| format!("Error: {e}"))?;

    let session_id = Ulid::new().to_string();
    let now = Local::now();
    let timestamp = now.format(FILE_TIMESTAMP_FORMAT).to_string();
    tracing::info!(session = %session_id, methods = methods.len(), "starting comparison");

    let orchestrator = Orchestrator::new(config).with_session(session_id);
    tracing::debug!(config = ?orchestrator.config(), "analysis config");
    let run = orchestrator
        .run(&reference, &test, &methods)
        .map_err(|e| format!("Analysis error: {e}"))?;

    let sink = ResultSink::new(&args.output_dir);
    tracing::debug!(dir = %sink.dir().display(), "storing artifacts");
    let mut stored = Vec::new();
    let mut result_images = Vec::new();
    for result in run.results() {
        let Some(ref image) = result.result_image else {
            continue;
        };
        let path = sink.store(image, result.method, &timestamp);
        result_images.push((
            result.method,
            report_image(
                &format!("{} result", result.description),
                path.as_deref(),
                image,
            ),
        ));
        stored.push((result.method, path));
    }

    let mut reports = Vec::new();
    if !args.no_report {
        let generated_at = now.format(DISPLAY_TIMESTAMP_FORMAT).to_string();
        let input = ReportInput {
            title: REPORT_TITLE,
            generated_at: &generated_at,
            reference: report_image("Reference image", Some(args.reference.as_path()), &reference),
            test: report_image("Test image", Some(args.test.as_path()), &test),
            run: &run,
            result_images,
        };
        reports = write_reports(&sink, &input, &timestamp);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&run)
            .map_err(|e| format!("Error serializing run: {e}"))?;
        println!("{json}");
    } else {
        print_summary(&run, &stored, &reports);
    }
    Ok(())
}

fn report_image(label: &str, path: Option<&Path>, image: &RgbImage) -> ReportImage {
    let mut report_image = ReportImage::new(label);
    if let Some(path) = path {
        report_image = report_image.with_path(path.display().to_string());
    }
    if let Some(png) = encode_png(image) {
        report_image = report_image.with_png(png);
    }
    report_image
}

/// Write the text report and every SVG page. Returns the paths written.
fn write_reports(sink: &ResultSink, input: &ReportInput<'_>, timestamp: &str) -> Vec<PathBuf> {
    let mut written = Vec::new();

    let text = visdiff_report::text::render(input);
    written.extend(sink.write_document(&format!("report_{timestamp}.txt"), &text));

    for (index, page) in visdiff_report::svg::render_pages(input).iter().enumerate() {
        let name = format!("report_{timestamp}_p{}.svg", index + 1);
        written.extend(sink.write_document(&name, page));
    }
    written
}

fn print_summary(
    run: &MultiMethodRun,
    stored: &[(MethodKind, Option<PathBuf>)],
    reports: &[PathBuf],
) {
    for result in run.results() {
        println!("{}", result.description);
        println!("  Verdict: {}", result.verdict);
        let (name, value) = result.metrics.key_metric();
        println!("  {name}: {value:.4}");
        match result.metrics.num_differences() {
            Some(n) => println!("  Differences detected: {n}"),
            None => println!("  Differences detected: N/A"),
        }
        let image = stored
            .iter()
            .find(|(method, _)| *method == result.method)
            .and_then(|(_, path)| path.as_ref());
        if let Some(path) = image {
            println!("  Result image: {}", path.display());
        }
        println!();
    }

    println!("{}", run.timing_report());

    if !reports.is_empty() {
        println!();
        for path in reports {
            println!("Report written to {}", path.display());
        }
    }
}
